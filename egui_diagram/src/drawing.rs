//! Drawing utilities for the diagram canvas.

use diagram_library::Point;
use egui::{Color32, Pos2, Rect, Stroke, Vec2};

/// Maps graph space to screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Screen position of the graph origin.
    pub origin: Pos2,
    pub zoom: f32,
}

impl Viewport {
    pub fn to_screen(&self, p: Point) -> Pos2 {
        self.origin + Vec2::new(p.x as f32, p.y as f32) * self.zoom
    }

    pub fn to_graph(&self, p: Pos2) -> Point {
        let v = (p - self.origin) / self.zoom;
        Point::new(v.x as f64, v.y as f64)
    }

    pub fn rect_to_screen(&self, loc: Point, width: f64, height: f64) -> Rect {
        Rect::from_min_size(
            self.to_screen(loc),
            Vec2::new(width as f32, height as f32) * self.zoom,
        )
    }
}

/// Draw a background grid.
pub fn draw_grid(painter: &egui::Painter, rect: Rect, pan: Vec2, color: Color32, spacing: f32) {
    if spacing < 2.0 {
        return;
    }
    let start_x = rect.min.x + pan.x.rem_euclid(spacing);
    let start_y = rect.min.y + pan.y.rem_euclid(spacing);

    let mut x = start_x;
    while x < rect.max.x {
        painter.line_segment(
            [Pos2::new(x, rect.min.y), Pos2::new(x, rect.max.y)],
            Stroke::new(1.0, color),
        );
        x += spacing;
    }

    let mut y = start_y;
    while y < rect.max.y {
        painter.line_segment(
            [Pos2::new(rect.min.x, y), Pos2::new(rect.max.x, y)],
            Stroke::new(1.0, color),
        );
        y += spacing;
    }
}

/// Draw a polyline ending in a filled arrowhead at its last point.
pub fn draw_arrow_polyline(
    painter: &egui::Painter,
    points: &[Pos2],
    color: Color32,
    width: f32,
    arrow_size: f32,
) {
    if points.len() < 2 {
        return;
    }
    for window in points.windows(2) {
        painter.line_segment([window[0], window[1]], Stroke::new(width, color));
    }

    let tip = points[points.len() - 1];
    let Some(tail) = points.iter().rev().skip(1).find(|p| p.distance(tip) > 0.5) else {
        return;
    };
    let dir = (tip - *tail).normalized();
    let normal = Vec2::new(-dir.y, dir.x);
    let base = tip - dir * arrow_size;
    painter.add(egui::Shape::convex_polygon(
        vec![
            tip,
            base + normal * arrow_size * 0.45,
            base - normal * arrow_size * 0.45,
        ],
        color,
        Stroke::NONE,
    ));
}

/// Distance from `p` to the closest point of segment `a`-`b`.
pub fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Distance from `p` to the closest segment of a polyline.
pub fn distance_to_polyline(p: Pos2, points: &[Pos2]) -> f32 {
    points
        .windows(2)
        .map(|w| distance_to_segment(p, w[0], w[1]))
        .fold(f32::INFINITY, f32::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_round_trips_points() {
        let vp = Viewport {
            origin: Pos2::new(100.0, 50.0),
            zoom: 2.0,
        };
        assert_eq!(vp.to_screen(Point::new(10.0, -5.0)), Pos2::new(120.0, 40.0));
        assert_eq!(vp.to_graph(Pos2::new(120.0, 40.0)), Point::new(10.0, -5.0));
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(10.0, 0.0);
        assert_eq!(distance_to_segment(Pos2::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_segment(Pos2::new(13.0, 4.0), a, b), 5.0);
        assert_eq!(distance_to_segment(Pos2::new(2.0, 2.0), a, a), 8.0_f32.sqrt());
    }

    #[test]
    fn polyline_distance_uses_nearest_segment() {
        let line = [Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0), Pos2::new(10.0, 10.0)];
        assert_eq!(distance_to_polyline(Pos2::new(12.0, 8.0), &line), 2.0);
        assert_eq!(distance_to_polyline(Pos2::ZERO, &[]), f32::INFINITY);
    }
}
