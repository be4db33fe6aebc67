//! Property edits on a single node, one variant per editable field.

use super::node::NodeRecord;
use super::point::Point;

/// Editable fields of a [`NodeRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeField {
    Text,
    Color,
    Width,
    Height,
    Location,
}

impl NodeField {
    /// Order in which the inspector lists the fields.
    pub const EDITABLE: [NodeField; 5] = [
        NodeField::Text,
        NodeField::Color,
        NodeField::Width,
        NodeField::Height,
        NodeField::Location,
    ];

    /// Property name as it appears in snapshots.
    pub fn name(&self) -> &'static str {
        match self {
            NodeField::Text => "text",
            NodeField::Color => "color",
            NodeField::Width => "width",
            NodeField::Height => "height",
            NodeField::Location => "loc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeField::Text => "Text",
            NodeField::Color => "Color",
            NodeField::Width => "Width",
            NodeField::Height => "Height",
            NodeField::Location => "Position",
        }
    }

    /// Current value of this field rendered as inspector text.
    pub fn display_value(&self, node: &NodeRecord) -> String {
        match self {
            NodeField::Text => node.text.clone(),
            NodeField::Color => node.color.clone(),
            NodeField::Width => format_number(node.width),
            NodeField::Height => format_number(node.height),
            NodeField::Location => node.loc.stringify(),
        }
    }
}

fn format_number(v: f64) -> String {
    format!("{}", v)
}

#[derive(Clone, Debug, PartialEq)]
pub enum PropertyCommand {
    Text(String),
    Color(String),
    Width(f64),
    Height(f64),
    Location(Point),
}

impl PropertyCommand {
    pub fn field(&self) -> NodeField {
        match self {
            PropertyCommand::Text(_) => NodeField::Text,
            PropertyCommand::Color(_) => NodeField::Color,
            PropertyCommand::Width(_) => NodeField::Width,
            PropertyCommand::Height(_) => NodeField::Height,
            PropertyCommand::Location(_) => NodeField::Location,
        }
    }

    /// Overwrites the matching field. Returns whether the value changed.
    pub fn apply(&self, node: &mut NodeRecord) -> bool {
        match self {
            PropertyCommand::Text(v) => replace(&mut node.text, v.clone()),
            PropertyCommand::Color(v) => replace(&mut node.color, v.clone()),
            PropertyCommand::Width(v) => replace(&mut node.width, *v),
            PropertyCommand::Height(v) => replace(&mut node.height, *v),
            PropertyCommand::Location(v) => replace(&mut node.loc, *v),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_reports_only_real_changes() {
        let mut node = NodeRecord::with_defaults("Node1");
        assert!(PropertyCommand::Width(120.0).apply(&mut node));
        assert!(!PropertyCommand::Width(120.0).apply(&mut node));
        assert_eq!(node.width, 120.0);
    }

    #[test]
    fn display_values_match_snapshot_text() {
        let node = NodeRecord::with_defaults("Node1");
        assert_eq!(NodeField::Width.display_value(&node), "100");
        assert_eq!(NodeField::Location.display_value(&node), "0 0");
        assert_eq!(NodeField::Location.name(), "loc");
    }
}
