use serde::{Deserialize, Serialize};

use super::point::{Bounds, Point};

/// One of the four connection spots on a node's edge.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortId {
    #[serde(rename = "t")]
    Top,
    #[serde(rename = "l")]
    Left,
    #[serde(rename = "r")]
    Right,
    #[serde(rename = "b")]
    Bottom,
}

impl PortId {
    pub const ALL: [PortId; 4] = [PortId::Top, PortId::Left, PortId::Right, PortId::Bottom];

    /// Outward unit direction of the port.
    pub fn direction(&self) -> (f64, f64) {
        match self {
            PortId::Top => (0.0, -1.0),
            PortId::Left => (-1.0, 0.0),
            PortId::Right => (1.0, 0.0),
            PortId::Bottom => (0.0, 1.0),
        }
    }

    /// Midpoint of the matching edge of `bounds`.
    pub fn spot(&self, bounds: &Bounds) -> Point {
        let c = bounds.center();
        match self {
            PortId::Top => Point::new(c.x, bounds.min_y),
            PortId::Left => Point::new(bounds.min_x, c.y),
            PortId::Right => Point::new(bounds.max_x, c.y),
            PortId::Bottom => Point::new(c.x, bounds.max_y),
        }
    }
}

/// An edge of the diagram. `from`/`to` are node keys; they are not required to exist.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LinkRecord {
    pub key: i64,
    pub from: String,
    pub to: String,
    #[serde(rename = "fromPort", default = "default_from_port")]
    pub from_port: PortId,
    #[serde(rename = "toPort", default = "default_to_port")]
    pub to_port: PortId,
}

fn default_from_port() -> PortId {
    PortId::Right
}

fn default_to_port() -> PortId {
    PortId::Left
}

impl LinkRecord {
    pub fn new(key: i64, from: &str, from_port: PortId, to: &str, to_port: PortId) -> Self {
        Self {
            key,
            from: from.to_string(),
            to: to.to_string(),
            from_port,
            to_port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_use_single_letter_names() {
        let link = LinkRecord::new(-1, "A", PortId::Right, "B", PortId::Left);
        let json = serde_json::to_string(&link).unwrap();
        assert_eq!(
            json,
            r#"{"key":-1,"from":"A","to":"B","fromPort":"r","toPort":"l"}"#
        );
    }

    #[test]
    fn missing_ports_default_to_right_then_left() {
        let link: LinkRecord =
            serde_json::from_str(r#"{"key":-1,"from":"Node3","to":"Node3"}"#).unwrap();
        assert_eq!(link.from_port, PortId::Right);
        assert_eq!(link.to_port, PortId::Left);
    }

    #[test]
    fn spots_sit_on_edge_midpoints() {
        let b = Bounds::from_origin_size(Point::new(0.0, 0.0), 100.0, 60.0);
        assert_eq!(PortId::Top.spot(&b), Point::new(50.0, 0.0));
        assert_eq!(PortId::Left.spot(&b), Point::new(0.0, 30.0));
        assert_eq!(PortId::Right.spot(&b), Point::new(100.0, 30.0));
        assert_eq!(PortId::Bottom.spot(&b), Point::new(50.0, 60.0));
    }
}
