//! Theming for the diagram canvas.

use egui::Color32;

use crate::color::css_color_or_fallback;

/// Theme configuration for the diagram widget.
pub struct DiagramTheme {
    /// Fill color for a node's CSS color string.
    pub node_color: Box<dyn Fn(&str) -> Color32>,
    /// Background color.
    pub background_color: Color32,
    /// Grid line color.
    pub grid_color: Color32,
    /// Grid spacing in graph units.
    pub grid_spacing: f32,
    /// Corner rounding for nodes.
    pub node_rounding: f32,
    /// Node outline (unselected).
    pub node_stroke_color: Color32,
    /// Selection outline color.
    pub selection_color: Color32,
    /// Port circle radius.
    pub port_radius: f32,
    pub port_color: Color32,
    pub link_color: Color32,
    pub link_selected_color: Color32,
    pub link_width: f32,
    /// Arrowhead length.
    pub arrow_size: f32,
    pub group_fill_color: Color32,
    pub group_stroke_color: Color32,
    pub group_label_color: Color32,
    /// Side of the square resize handle.
    pub resize_handle_size: f32,
    /// Smallest width and height a resize may produce.
    pub min_node_size: f32,
    pub font_size: f32,
}

impl DiagramTheme {
    pub fn dark() -> Self {
        Self::default()
    }

    pub fn light() -> Self {
        Self {
            background_color: Color32::from_rgb(250, 250, 250),
            grid_color: Color32::from_rgb(230, 230, 230),
            node_stroke_color: Color32::from_rgb(90, 90, 90),
            selection_color: Color32::from_rgb(30, 120, 255),
            port_color: Color32::from_rgb(90, 90, 90),
            link_color: Color32::from_rgb(60, 60, 60),
            link_selected_color: Color32::from_rgb(30, 120, 255),
            group_fill_color: Color32::from_rgba_unmultiplied(200, 200, 200, 60),
            group_stroke_color: Color32::from_rgb(150, 150, 150),
            group_label_color: Color32::from_rgb(60, 60, 60),
            ..Self::default()
        }
    }
}

impl Default for DiagramTheme {
    fn default() -> Self {
        Self {
            node_color: Box::new(css_color_or_fallback),
            background_color: Color32::from_rgb(30, 30, 30),
            grid_color: Color32::from_rgb(40, 40, 40),
            grid_spacing: 50.0,
            node_rounding: 4.0,
            node_stroke_color: Color32::from_rgb(20, 20, 20),
            selection_color: Color32::from_rgb(100, 150, 255),
            port_radius: 4.0,
            port_color: Color32::from_rgb(200, 200, 200),
            link_color: Color32::from_rgb(180, 180, 180),
            link_selected_color: Color32::WHITE,
            link_width: 2.0,
            arrow_size: 10.0,
            group_fill_color: Color32::from_rgba_unmultiplied(80, 80, 90, 60),
            group_stroke_color: Color32::from_rgb(110, 110, 120),
            group_label_color: Color32::from_rgb(200, 200, 200),
            resize_handle_size: 8.0,
            min_node_size: 20.0,
            font_size: 13.0,
        }
    }
}
