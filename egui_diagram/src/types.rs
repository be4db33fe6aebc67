//! Lightweight view types handed to the widget every frame.

use diagram_library::{Bounds, PortId, Point};

/// How a node should be displayed.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeView {
    pub key: String,
    pub text: String,
    /// CSS color string, resolved through [`crate::color::parse_css_color`].
    pub color: String,
    /// Top-left corner in graph space.
    pub loc: Point,
    pub width: f64,
    pub height: f64,
    pub is_group: bool,
    pub group: Option<String>,
}

impl NodeView {
    pub fn bounds(&self) -> Bounds {
        Bounds::from_origin_size(self.loc, self.width, self.height)
    }
}

/// A link between two node ports (view data).
#[derive(Clone, Debug, PartialEq)]
pub struct LinkView {
    pub key: i64,
    pub from: String,
    pub from_port: PortId,
    pub to: String,
    pub to_port: PortId,
}
