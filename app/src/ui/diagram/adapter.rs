//! Adapter connecting the diagram store to the egui_diagram traits.

use diagram_library::{
    DiagramStore, LibraryError, LinkRecord, NodeRecord, Point, PortId, PropertyCommand,
};
use egui_diagram::{DiagramDataSource, DiagramMutator, LinkView, NodeView};

/// Read-only data source backed by the store.
pub(crate) struct StoreDataSource<'a> {
    pub(crate) store: &'a DiagramStore,
}

fn node_view(node: &NodeRecord) -> NodeView {
    NodeView {
        key: node.key.clone(),
        text: node.text.clone(),
        color: node.color.clone(),
        loc: node.loc,
        width: node.width,
        height: node.height,
        is_group: node.is_group,
        group: node.group.clone(),
    }
}

fn link_view(link: &LinkRecord) -> LinkView {
    LinkView {
        key: link.key,
        from: link.from.clone(),
        from_port: link.from_port,
        to: link.to.clone(),
        to_port: link.to_port,
    }
}

impl DiagramDataSource for StoreDataSource<'_> {
    fn nodes(&self) -> Vec<NodeView> {
        self.store.nodes().iter().map(node_view).collect()
    }

    fn links(&self) -> Vec<LinkView> {
        self.store.links().iter().map(link_view).collect()
    }

    fn selected_node(&self) -> Option<String> {
        self.store.selection().key().map(str::to_string)
    }
}

/// Routes every widget mutation through the store.
pub(crate) struct StoreMutator<'a> {
    pub(crate) store: &'a mut DiagramStore,
}

impl StoreMutator<'_> {
    fn require(&self, key: &str) -> Result<(), String> {
        if self.store.contains_node(key) {
            Ok(())
        } else {
            Err(LibraryError::UnknownNode(key.to_string()).to_string())
        }
    }

    fn set(&mut self, key: &str, command: PropertyCommand) -> Result<(), String> {
        self.require(key)?;
        self.store.set_property(Some(key), command);
        Ok(())
    }
}

impl DiagramMutator for StoreMutator<'_> {
    fn move_node(&mut self, key: &str, loc: Point) -> Result<(), String> {
        self.set(key, PropertyCommand::Location(loc))
    }

    fn resize_node(&mut self, key: &str, width: f64, height: f64) -> Result<(), String> {
        self.set(key, PropertyCommand::Width(width))?;
        self.set(key, PropertyCommand::Height(height))
    }

    fn set_node_text(&mut self, key: &str, text: &str) -> Result<(), String> {
        self.set(key, PropertyCommand::Text(text.to_string()))
    }

    fn add_node_at(&mut self, loc: Point) -> Result<String, String> {
        Ok(self.store.add_node_at(loc))
    }

    fn remove_node(&mut self, key: &str) -> Result<(), String> {
        if self.store.remove_node(key) {
            Ok(())
        } else {
            Err(LibraryError::UnknownNode(key.to_string()).to_string())
        }
    }

    fn add_link(
        &mut self,
        from: &str,
        from_port: PortId,
        to: &str,
        to_port: PortId,
    ) -> Result<i64, String> {
        self.require(from)?;
        self.require(to)?;
        Ok(self.store.add_link(from, from_port, to, to_port))
    }

    fn remove_link(&mut self, key: i64) -> Result<(), String> {
        if self.store.remove_link(key) {
            Ok(())
        } else {
            Err(format!("Unknown link: {}", key))
        }
    }

    fn group_nodes(&mut self, keys: &[String]) -> Result<String, String> {
        self.store
            .group_nodes(keys)
            .ok_or_else(|| format!("Nothing to group in {:?}", keys))
    }

    fn select_node(&mut self, key: Option<&str>) -> Result<(), String> {
        if let Some(key) = key {
            self.require(key)?;
        }
        self.store.select(key);
        Ok(())
    }
}
