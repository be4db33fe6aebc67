use egui::Context;
use log::{info, warn};
use std::fs;
use std::path::Path;

const USER_FONT: &str = "user_font";

pub fn setup_fonts(ctx: &Context, font_path: Option<&Path>) {
    let mut fonts = egui::FontDefinitions::default();
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);

    let Some(font_path) = font_path else {
        ctx.set_fonts(fonts);
        return;
    };

    match fs::read(font_path) {
        Ok(font_data) => {
            fonts.font_data.insert(
                USER_FONT.to_owned(),
                egui::FontData::from_owned(font_data).into(),
            );

            // Tried first, egui defaults stay as fallback
            for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
                fonts
                    .families
                    .entry(family)
                    .or_default()
                    .insert(0, USER_FONT.to_owned());
            }
            info!("Loaded font {}", font_path.display());
        }
        Err(e) => {
            warn!("Failed to load font from {}: {}", font_path.display(), e);
        }
    }
    ctx.set_fonts(fonts);
}
