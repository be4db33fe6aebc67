use anyhow::anyhow;
use eframe::egui;

mod app;
mod command;
mod config;
mod error;
mod history;
mod persistence;
mod shortcut;
mod ui;
mod utils;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = config::load_config();
    eframe::run_native(
        "Diagram Editor",
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default().with_inner_size(config.window_size),
            ..Default::default()
        },
        Box::new(|cc| Ok(Box::new(app::DiagramApp::new(cc, config)))),
    )
    .map_err(|e| anyhow!("Failed to run the diagram editor: {}", e))
}
