use serde::{Deserialize, Serialize};

use super::point::{Bounds, Point};

pub const DEFAULT_NODE_TEXT: &str = "New Node";
pub const CLICK_CREATED_NODE_TEXT: &str = "new node";
pub const DEFAULT_NODE_COLOR: &str = "lightblue";
pub const DEFAULT_NODE_WIDTH: f64 = 100.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 60.0;

fn default_width() -> f64 {
    DEFAULT_NODE_WIDTH
}

fn default_height() -> f64 {
    DEFAULT_NODE_HEIGHT
}

fn default_color() -> String {
    DEFAULT_NODE_COLOR.to_string()
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A vertex of the diagram. `key` never changes after creation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NodeRecord {
    pub key: String,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub loc: Point,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    /// Group container records hold other nodes via their `group` field.
    #[serde(rename = "isGroup", default, skip_serializing_if = "is_false")]
    pub is_group: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl NodeRecord {
    pub fn new(key: &str, text: &str, color: &str, loc: Point) -> Self {
        Self {
            key: key.to_string(),
            text: text.to_string(),
            color: color.to_string(),
            loc,
            width: DEFAULT_NODE_WIDTH,
            height: DEFAULT_NODE_HEIGHT,
            is_group: false,
            group: None,
        }
    }

    /// The record produced by the "add node" action.
    pub fn with_defaults(key: &str) -> Self {
        Self::new(key, DEFAULT_NODE_TEXT, DEFAULT_NODE_COLOR, Point::ORIGIN)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_origin_size(self.loc, self.width, self.height)
    }
}
