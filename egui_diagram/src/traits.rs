//! Trait definitions for decoupling the diagram widget from the document model.

use diagram_library::{PortId, Point};

use crate::types::{LinkView, NodeView};

/// Read-only data source for the diagram widget.
pub trait DiagramDataSource {
    /// All nodes, groups included, in paint order.
    fn nodes(&self) -> Vec<NodeView>;

    /// All links. Links whose endpoints are missing are skipped when drawing.
    fn links(&self) -> Vec<LinkView>;

    /// Key of the node the rest of the application considers selected.
    fn selected_node(&self) -> Option<String>;
}

/// Mutation interface for the diagram widget.
pub trait DiagramMutator {
    /// Move a node so its top-left corner sits at `loc`.
    fn move_node(&mut self, key: &str, loc: Point) -> Result<(), String>;

    fn resize_node(&mut self, key: &str, width: f64, height: f64) -> Result<(), String>;

    fn set_node_text(&mut self, key: &str, text: &str) -> Result<(), String>;

    /// Create a default node at `loc`, returning its key.
    fn add_node_at(&mut self, loc: Point) -> Result<String, String>;

    fn remove_node(&mut self, key: &str) -> Result<(), String>;

    /// Add a link between two ports, returning the link key.
    fn add_link(
        &mut self,
        from: &str,
        from_port: PortId,
        to: &str,
        to_port: PortId,
    ) -> Result<i64, String>;

    fn remove_link(&mut self, key: i64) -> Result<(), String>;

    /// Wrap the given nodes in a new group, returning the group key.
    fn group_nodes(&mut self, keys: &[String]) -> Result<String, String>;

    /// Change the primary selection.
    fn select_node(&mut self, key: Option<&str>) -> Result<(), String>;
}
