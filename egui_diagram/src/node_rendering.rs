//! Node and group drawing primitives.

use diagram_library::{Bounds, PortId};
use egui::{self, Color32, Pos2, Rect, Stroke, StrokeKind, Vec2};

use crate::color::contrast_text;
use crate::drawing::Viewport;
use crate::theme::DiagramTheme;
use crate::types::NodeView;
use crate::widget::PortScreen;

/// Height of the title strip drawn at the top of a group.
pub(crate) const GROUP_TITLE_HEIGHT: f32 = 22.0;

/// Draw a group container: translucent body with its title in the header strip.
pub(crate) fn draw_group(
    painter: &egui::Painter,
    rect: Rect,
    node: &NodeView,
    theme: &DiagramTheme,
    is_selected: bool,
    zoom: f32,
) {
    let rounding = theme.node_rounding * zoom;
    painter.rect_filled(rect, rounding, theme.group_fill_color);
    let stroke = if is_selected {
        Stroke::new(2.0 * zoom, theme.selection_color)
    } else {
        Stroke::new(1.0, theme.group_stroke_color)
    };
    painter.rect_stroke(rect, rounding, stroke, StrokeKind::Inside);

    let title_rect = Rect::from_min_size(
        rect.min,
        Vec2::new(rect.width(), (GROUP_TITLE_HEIGHT * zoom).min(rect.height())),
    );
    painter.with_clip_rect(title_rect).text(
        title_rect.left_center() + Vec2::new(6.0 * zoom, 0.0),
        egui::Align2::LEFT_CENTER,
        &node.text,
        egui::FontId::proportional(theme.font_size * 0.9 * zoom),
        theme.group_label_color,
    );
}

/// Draw the node body, its centered text, and the selection outline.
pub(crate) fn draw_node_body(
    painter: &egui::Painter,
    rect: Rect,
    node: &NodeView,
    theme: &DiagramTheme,
    is_selected: bool,
    zoom: f32,
) {
    let fill = (theme.node_color)(&node.color);
    let rounding = theme.node_rounding * zoom;
    painter.rect_filled(rect, rounding, fill);
    painter.rect_stroke(
        rect,
        rounding,
        Stroke::new(1.0, theme.node_stroke_color),
        StrokeKind::Inside,
    );
    if is_selected {
        painter.rect_stroke(
            rect,
            rounding,
            Stroke::new(2.0 * zoom, theme.selection_color),
            StrokeKind::Outside,
        );
    }

    let text_color = contrast_text(fill);
    let galley = painter.layout(
        node.text.clone(),
        egui::FontId::proportional(theme.font_size * zoom),
        text_color,
        (rect.width() - 8.0 * zoom).max(1.0),
    );
    let pos = rect.center() - galley.size() * 0.5;
    painter
        .with_clip_rect(rect)
        .galley(pos, galley, text_color);
}

/// Draw the four port circles on the edges of `bounds`, recording their
/// screen positions for hit-testing.
pub(crate) fn draw_ports(
    painter: &egui::Painter,
    viewport: &Viewport,
    bounds: &Bounds,
    node_key: &str,
    theme: &DiagramTheme,
    highlighted: Option<PortId>,
    port_screens: &mut Vec<PortScreen>,
) {
    let r = theme.port_radius * viewport.zoom;
    for port in PortId::ALL {
        let pos = viewport.to_screen(port.spot(bounds));
        let (fill, radius) = if highlighted == Some(port) {
            (theme.selection_color, r * 1.4)
        } else {
            (theme.port_color, r)
        };
        painter.circle(pos, radius, fill, Stroke::new(1.0, theme.node_stroke_color));
        port_screens.push(PortScreen {
            pos,
            node_key: node_key.to_string(),
            port,
        });
    }
}

/// Square handle at the bottom-right corner.
pub(crate) fn resize_handle_rect(node_rect: Rect, theme: &DiagramTheme, zoom: f32) -> Rect {
    let size = theme.resize_handle_size * zoom;
    Rect::from_center_size(node_rect.right_bottom(), Vec2::splat(size))
}

pub(crate) fn draw_resize_handle(
    painter: &egui::Painter,
    node_rect: Rect,
    theme: &DiagramTheme,
    zoom: f32,
) {
    let handle = resize_handle_rect(node_rect, theme, zoom);
    painter.rect_filled(handle, 1.0, theme.selection_color);
    painter.rect_stroke(
        handle,
        1.0,
        Stroke::new(1.0, Color32::WHITE),
        StrokeKind::Inside,
    );
}

/// Ghost line while dragging out a new link.
pub(crate) fn draw_pending_link(
    painter: &egui::Painter,
    from: Pos2,
    to: Pos2,
    theme: &DiagramTheme,
) {
    let dashes = egui::Shape::dashed_line(
        &[from, to],
        Stroke::new(theme.link_width, theme.selection_color),
        6.0,
        4.0,
    );
    painter.extend(dashes);
}
