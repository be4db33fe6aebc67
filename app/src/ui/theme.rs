use eframe::egui;
use egui_diagram::DiagramTheme;

use crate::config::AppConfig;

pub fn apply_theme(ctx: &egui::Context, config: &AppConfig) {
    if config.dark_mode {
        ctx.set_visuals(egui::Visuals::dark());
    } else {
        ctx.set_visuals(egui::Visuals::light());
    }
}

/// Canvas theme matching the egui visuals picked by [`apply_theme`].
pub fn diagram_theme(config: &AppConfig) -> DiagramTheme {
    let mut theme = if config.dark_mode {
        DiagramTheme::dark()
    } else {
        DiagramTheme::light()
    };
    if config.grid_spacing > 0.0 {
        theme.grid_spacing = config.grid_spacing;
    }
    theme
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_grid_spacing_keeps_default() {
        let config = AppConfig {
            grid_spacing: 0.0,
            ..AppConfig::default()
        };
        assert_eq!(
            diagram_theme(&config).grid_spacing,
            DiagramTheme::dark().grid_spacing
        );

        let config = AppConfig {
            grid_spacing: 24.0,
            dark_mode: false,
            ..AppConfig::default()
        };
        assert_eq!(diagram_theme(&config).grid_spacing, 24.0);
    }
}
