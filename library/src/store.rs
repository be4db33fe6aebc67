//! The diagram state store: single owner of the node and link collections.

use crossbeam_channel::Receiver;
use log::debug;

use crate::events::{EventBus, StoreEvent};
use crate::key::{self, GROUP_KEY_BASE};
use crate::model::node::CLICK_CREATED_NODE_TEXT;
use crate::model::{
    Bounds, LinkRecord, NodeField, NodeRecord, PersistedSnapshot, Point, PortId, PropertyCommand,
};
use crate::selection::Selection;

/// Space between a group's outline and its members.
pub const GROUP_PADDING: f64 = 10.0;
/// Extra room above the members for the group title.
pub const GROUP_HEADER: f64 = 22.0;
pub const GROUP_COLOR: &str = "whitesmoke";

/// Owns every node and link record. Views read from it and route all edits
/// back through its methods; subscribers are told about each change.
#[derive(Default)]
pub struct DiagramStore {
    nodes: Vec<NodeRecord>,
    links: Vec<LinkRecord>,
    /// Last numeric suffix handed out by [`DiagramStore::add_node`].
    counter: u64,
    selection: Selection,
    events: EventBus,
}

impl DiagramStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fallback contents used when nothing has been persisted yet.
    pub fn default_snapshot() -> PersistedSnapshot {
        PersistedSnapshot::new(
            vec![
                NodeRecord::new("A", "A", "lightblue", Point::new(0.0, 0.0)),
                NodeRecord::new("B", "B", "orange", Point::new(200.0, -100.0)),
            ],
            vec![LinkRecord::new(-1, "A", PortId::Right, "B", PortId::Left)],
        )
    }

    pub fn with_default_dataset() -> Self {
        Self::from_snapshot(Self::default_snapshot())
    }

    pub fn from_snapshot(snapshot: PersistedSnapshot) -> Self {
        let mut store = Self::new();
        store.restore(snapshot);
        store
    }

    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn links(&self) -> &[LinkRecord] {
        &self.links
    }

    pub fn node(&self, key: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|n| n.key == key)
    }

    pub fn link(&self, key: i64) -> Option<&LinkRecord> {
        self.links.iter().find(|l| l.key == key)
    }

    pub fn contains_node(&self, key: &str) -> bool {
        self.node(key).is_some()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_node(&self) -> Option<&NodeRecord> {
        self.selection.key().and_then(|k| self.node(k))
    }

    pub fn group_members(&self, group_key: &str) -> Vec<&NodeRecord> {
        self.nodes
            .iter()
            .filter(|n| n.group.as_deref() == Some(group_key))
            .collect()
    }

    /// Suffix of the most recently generated key.
    pub fn key_counter(&self) -> u64 {
        self.counter
    }

    // ---------------------------------------------------------------------
    // Node creation / removal
    // ---------------------------------------------------------------------

    fn next_node_key(&mut self) -> String {
        loop {
            self.counter += 1;
            let key = key::node_key(self.counter);
            if !self.contains_node(&key) {
                return key;
            }
        }
    }

    fn push_node(&mut self, node: NodeRecord) -> String {
        let key = node.key.clone();
        debug!("Adding node {}", key);
        self.nodes.push(node);
        self.events.emit(StoreEvent::NodeAdded(key.clone()));
        key
    }

    /// Appends a default node under a freshly generated key.
    pub fn add_node(&mut self) -> String {
        let key = self.next_node_key();
        self.push_node(NodeRecord::with_defaults(&key))
    }

    /// Click-to-create: default node placed at `loc`.
    pub fn add_node_at(&mut self, loc: Point) -> String {
        let key = self.next_node_key();
        let mut node = NodeRecord::with_defaults(&key);
        node.text = CLICK_CREATED_NODE_TEXT.to_string();
        node.loc = loc;
        self.push_node(node)
    }

    /// Removes a node. Links that reference it are left in place.
    pub fn remove_node(&mut self, key: &str) -> bool {
        let Some(index) = self.nodes.iter().position(|n| n.key == key) else {
            return false;
        };
        let removed = self.nodes.remove(index);
        debug!("Removed node {}", key);

        if removed.is_group {
            let mut released = Vec::new();
            for node in self.nodes.iter_mut() {
                if node.group.as_deref() == Some(key) {
                    node.group = None;
                    released.push(node.key.clone());
                }
            }
            for member in released {
                self.events.emit(StoreEvent::NodeChanged {
                    key: member,
                    field: NodeField::Location,
                });
            }
        }

        if self.selection.is_selected(key) {
            self.select(None);
        }
        self.events.emit(StoreEvent::NodeRemoved(key.to_string()));

        if let Some(group) = removed.group {
            self.refresh_group_bounds(&group);
        }
        true
    }

    // ---------------------------------------------------------------------
    // Property updates
    // ---------------------------------------------------------------------

    /// Overwrites one field of the targeted node. No target, or a key that is
    /// not in the store, leaves everything untouched and returns `false`.
    pub fn set_property(&mut self, target: Option<&str>, command: PropertyCommand) -> bool {
        let Some(key) = target else {
            return false;
        };
        let Some(index) = self.nodes.iter().position(|n| n.key == key) else {
            debug!("set_property on unknown node {}", key);
            return false;
        };

        let old_loc = self.nodes[index].loc;
        if !command.apply(&mut self.nodes[index]) {
            return false;
        }
        let field = command.field();
        debug!("Set {} on {}", field.name(), key);
        self.events.emit(StoreEvent::NodeChanged {
            key: key.to_string(),
            field,
        });

        let node = &self.nodes[index];
        let (is_group, parent) = (node.is_group, node.group.clone());
        if is_group && field == NodeField::Location {
            let new_loc = self.nodes[index].loc;
            self.translate_members(key, new_loc.x - old_loc.x, new_loc.y - old_loc.y);
        }
        if matches!(
            field,
            NodeField::Location | NodeField::Width | NodeField::Height
        ) {
            if let Some(group) = parent {
                self.refresh_group_bounds(&group);
            }
        }
        true
    }

    /// [`DiagramStore::set_property`] aimed at the current selection.
    pub fn apply_to_selection(&mut self, command: PropertyCommand) -> bool {
        let target = self.selection.key().map(str::to_string);
        self.set_property(target.as_deref(), command)
    }

    fn translate_members(&mut self, group_key: &str, dx: f64, dy: f64) {
        let mut moved = Vec::new();
        for node in self.nodes.iter_mut() {
            if node.group.as_deref() == Some(group_key) {
                node.loc = node.loc.offset(dx, dy);
                moved.push(node.key.clone());
            }
        }
        for key in moved {
            self.events.emit(StoreEvent::NodeChanged {
                key,
                field: NodeField::Location,
            });
        }
    }

    fn members_bounds(&self, group_key: &str) -> Option<Bounds> {
        self.group_members(group_key)
            .iter()
            .map(|n| n.bounds())
            .reduce(|a, b| a.union(&b))
    }

    /// Resizes a group so it encloses all of its members.
    fn refresh_group_bounds(&mut self, group_key: &str) {
        let Some(inner) = self.members_bounds(group_key) else {
            return;
        };
        let Some(group) = self
            .nodes
            .iter_mut()
            .find(|n| n.key == group_key && n.is_group)
        else {
            return;
        };
        let outer = inner.inflate(GROUP_PADDING);
        group.loc = Point::new(outer.min_x, outer.min_y - GROUP_HEADER);
        group.width = outer.width();
        group.height = outer.height() + GROUP_HEADER;
        self.events.emit(StoreEvent::NodeChanged {
            key: group_key.to_string(),
            field: NodeField::Location,
        });
    }

    // ---------------------------------------------------------------------
    // Grouping
    // ---------------------------------------------------------------------

    fn next_group_key(&self) -> String {
        if !self.contains_node(GROUP_KEY_BASE) {
            return GROUP_KEY_BASE.to_string();
        }
        (2u64..)
            .map(|n| format!("{}{}", GROUP_KEY_BASE, n))
            .find(|k| !self.contains_node(k))
            .unwrap_or_else(|| GROUP_KEY_BASE.to_string())
    }

    /// Wraps the given nodes in a new group container. Groups themselves and
    /// unknown keys are skipped; returns `None` when nothing is left to group.
    pub fn group_nodes(&mut self, keys: &[String]) -> Option<String> {
        let members: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| !n.is_group && keys.contains(&n.key))
            .map(|n| n.key.clone())
            .collect();
        if members.is_empty() {
            return None;
        }

        let group_key = self.next_group_key();
        let mut group = NodeRecord::new(&group_key, &group_key, GROUP_COLOR, Point::ORIGIN);
        group.is_group = true;

        let mut old_groups = Vec::new();
        for node in self.nodes.iter_mut() {
            if members.contains(&node.key) {
                if let Some(old) = node.group.replace(group_key.clone()) {
                    old_groups.push(old);
                }
            }
        }
        debug!("Grouping {:?} into {}", members, group_key);
        self.nodes.push(group);
        self.refresh_group_bounds(&group_key);
        self.events.emit(StoreEvent::GroupCreated(group_key.clone()));
        for old in old_groups {
            self.refresh_group_bounds(&old);
        }
        Some(group_key)
    }

    // ---------------------------------------------------------------------
    // Links
    // ---------------------------------------------------------------------

    /// One below the lowest key in use. When that would underflow, the
    /// negative key closest to zero that is still free.
    fn next_link_key(&self) -> i64 {
        let lowest = self.links.iter().map(|l| l.key).min().unwrap_or(0).min(0);
        lowest.checked_sub(1).unwrap_or_else(|| {
            (1..=i64::MAX)
                .map(|n| -n)
                .find(|k| self.links.iter().all(|l| l.key != *k))
                .unwrap_or(lowest)
        })
    }

    /// Adds a link with the next negative key. Endpoints are not validated.
    pub fn add_link(&mut self, from: &str, from_port: PortId, to: &str, to_port: PortId) -> i64 {
        let key = self.next_link_key();
        debug!("Adding link {} ({} -> {})", key, from, to);
        self.links
            .push(LinkRecord::new(key, from, from_port, to, to_port));
        self.events.emit(StoreEvent::LinkAdded(key));
        key
    }

    pub fn remove_link(&mut self, key: i64) -> bool {
        let Some(index) = self.links.iter().position(|l| l.key == key) else {
            return false;
        };
        self.links.remove(index);
        self.events.emit(StoreEvent::LinkRemoved(key));
        true
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Selects a node, or clears the selection with `None`. Keys that are not
    /// in the store clear the selection. Returns whether the selection changed.
    pub fn select(&mut self, key: Option<&str>) -> bool {
        let key = key.filter(|k| self.contains_node(k)).map(str::to_string);
        match self.selection.select(key) {
            Some(change) => {
                self.events.emit(StoreEvent::SelectionChanged(change.current));
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // Snapshots
    // ---------------------------------------------------------------------

    pub fn serialize(&self) -> PersistedSnapshot {
        PersistedSnapshot::new(self.nodes.clone(), self.links.clone())
    }

    /// Replaces both collections, clears the selection and reseeds the key
    /// counter from the loaded node keys.
    pub fn restore(&mut self, snapshot: PersistedSnapshot) {
        self.nodes = snapshot.nodes;
        self.links = snapshot.links;
        self.counter = key::counter_seed(self.nodes.iter().map(|n| n.key.as_str()));
        debug!(
            "Restored {} nodes, {} links (key counter {})",
            self.nodes.len(),
            self.links.len(),
            self.counter
        );
        if let Some(change) = self.selection.clear() {
            self.events.emit(StoreEvent::SelectionChanged(change.current));
        }
        self.events.emit(StoreEvent::Restored);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &Receiver<StoreEvent>) -> Vec<StoreEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn default_dataset_has_two_nodes_and_one_link() {
        let store = DiagramStore::with_default_dataset();
        assert_eq!(store.nodes().len(), 2);
        assert_eq!(store.links().len(), 1);
        assert_eq!(store.node("B").unwrap().loc, Point::new(200.0, -100.0));
        assert_eq!(store.key_counter(), 0);
    }

    #[test]
    fn add_node_uses_defaults() {
        let mut store = DiagramStore::new();
        let key = store.add_node();
        let node = store.node(&key).unwrap();
        assert_eq!(node.text, "New Node");
        assert_eq!(node.color, "lightblue");
        assert_eq!(node.loc, Point::ORIGIN);
        assert_eq!((node.width, node.height), (100.0, 60.0));
    }

    #[test]
    fn add_node_skips_keys_already_taken() {
        let mut store = DiagramStore::from_snapshot(PersistedSnapshot::new(
            vec![
                NodeRecord::with_defaults("Node0"),
                NodeRecord::with_defaults("Node1x"),
            ],
            vec![],
        ));
        // Seed is 1 from "Node1x"; "Node2" is free.
        assert_eq!(store.add_node(), "Node2");

        let mut store = DiagramStore::from_snapshot(PersistedSnapshot::new(
            vec![NodeRecord::with_defaults("Node1"), NodeRecord::with_defaults("Node2")],
            vec![],
        ));
        store.counter = 0;
        assert_eq!(store.add_node(), "Node3");
    }

    #[test]
    fn click_created_node_sits_at_click_point() {
        let mut store = DiagramStore::new();
        let key = store.add_node_at(Point::new(40.0, 25.0));
        let node = store.node(&key).unwrap();
        assert_eq!(node.text, "new node");
        assert_eq!(node.loc, Point::new(40.0, 25.0));
    }

    #[test]
    fn set_property_notifies_subscribers() {
        let mut store = DiagramStore::with_default_dataset();
        let rx = store.subscribe();
        assert!(store.set_property(Some("A"), PropertyCommand::Color("red".into())));
        assert_eq!(store.node("A").unwrap().color, "red");
        assert_eq!(
            drain(&rx),
            vec![StoreEvent::NodeChanged {
                key: "A".into(),
                field: NodeField::Color
            }]
        );
    }

    #[test]
    fn set_property_with_same_value_is_quiet() {
        let mut store = DiagramStore::with_default_dataset();
        let rx = store.subscribe();
        assert!(!store.set_property(Some("A"), PropertyCommand::Text("A".into())));
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn set_property_on_unknown_key_is_noop() {
        let mut store = DiagramStore::with_default_dataset();
        let before = store.serialize();
        assert!(!store.set_property(Some("Z"), PropertyCommand::Width(5.0)));
        assert_eq!(store.serialize(), before);
    }

    #[test]
    fn selection_change_fires_once() {
        let mut store = DiagramStore::with_default_dataset();
        let rx = store.subscribe();
        assert!(store.select(Some("A")));
        assert!(!store.select(Some("A")));
        assert!(store.select(None));
        assert_eq!(
            drain(&rx),
            vec![
                StoreEvent::SelectionChanged(Some("A".into())),
                StoreEvent::SelectionChanged(None)
            ]
        );
    }

    #[test]
    fn selecting_unknown_key_clears() {
        let mut store = DiagramStore::with_default_dataset();
        store.select(Some("A"));
        assert!(store.select(Some("nope")));
        assert_eq!(store.selection(), &Selection::NoSelection);
    }

    #[test]
    fn removing_selected_node_clears_selection_and_keeps_links() {
        let mut store = DiagramStore::with_default_dataset();
        store.select(Some("B"));
        assert!(store.remove_node("B"));
        assert_eq!(store.selection(), &Selection::NoSelection);
        assert_eq!(store.links().len(), 1, "dangling link is tolerated");
        assert!(!store.remove_node("B"));
    }

    #[test]
    fn link_keys_count_down_from_lowest() {
        let mut store = DiagramStore::with_default_dataset();
        assert_eq!(store.add_link("B", PortId::Bottom, "A", PortId::Top), -2);
        assert_eq!(store.add_link("A", PortId::Bottom, "B", PortId::Top), -3);
        assert!(store.remove_link(-2));
        assert_eq!(store.add_link("A", PortId::Left, "B", PortId::Left), -4);

        let mut empty = DiagramStore::new();
        assert_eq!(empty.add_link("x", PortId::Right, "y", PortId::Left), -1);
    }

    #[test]
    fn grouping_encloses_members() {
        let mut store = DiagramStore::with_default_dataset();
        let group = store
            .group_nodes(&["A".to_string(), "B".to_string()])
            .unwrap();
        assert_eq!(group, "Group");
        let g = store.node(&group).unwrap();
        assert!(g.is_group);
        assert_eq!(g.loc, Point::new(-10.0, -100.0 - 10.0 - GROUP_HEADER));
        assert_eq!(g.width, 300.0 + 2.0 * GROUP_PADDING);
        assert_eq!(store.group_members(&group).len(), 2);

        let second = store.group_nodes(&["A".to_string()]).unwrap();
        assert_eq!(second, "Group2");
        assert_eq!(store.group_members("Group").len(), 1);
    }

    #[test]
    fn grouping_nothing_returns_none() {
        let mut store = DiagramStore::with_default_dataset();
        assert!(store.group_nodes(&[]).is_none());
        assert!(store.group_nodes(&["missing".to_string()]).is_none());
    }

    #[test]
    fn moving_a_group_moves_its_members() {
        let mut store = DiagramStore::with_default_dataset();
        let group = store.group_nodes(&["A".to_string()]).unwrap();
        let loc = store.node(&group).unwrap().loc;
        store.set_property(Some(&group), PropertyCommand::Location(loc.offset(5.0, 7.0)));
        assert_eq!(store.node("A").unwrap().loc, Point::new(5.0, 7.0));
    }

    #[test]
    fn moving_a_member_refits_its_group() {
        let mut store = DiagramStore::with_default_dataset();
        let group = store.group_nodes(&["A".to_string()]).unwrap();
        store.set_property(Some("A"), PropertyCommand::Location(Point::new(50.0, 50.0)));
        let g = store.node(&group).unwrap();
        assert_eq!(g.loc, Point::new(40.0, 40.0 - GROUP_HEADER));
    }

    #[test]
    fn removing_group_releases_members() {
        let mut store = DiagramStore::with_default_dataset();
        let group = store.group_nodes(&["A".to_string(), "B".to_string()]).unwrap();
        store.remove_node(&group);
        assert!(store.nodes().iter().all(|n| n.group.is_none()));
    }

    #[test]
    fn restore_clears_selection_with_one_event() {
        let mut store = DiagramStore::with_default_dataset();
        store.select(Some("A"));
        let rx = store.subscribe();
        store.restore(DiagramStore::default_snapshot());
        assert_eq!(
            drain(&rx),
            vec![StoreEvent::SelectionChanged(None), StoreEvent::Restored]
        );
    }

    #[test]
    fn link_key_after_lowest_possible_key_is_still_unique() {
        let mut store = DiagramStore::from_snapshot(PersistedSnapshot::new(
            vec![],
            vec![
                LinkRecord::new(i64::MIN, "A", PortId::Right, "B", PortId::Left),
                LinkRecord::new(-1, "A", PortId::Right, "B", PortId::Left),
            ],
        ));
        let key = store.add_link("A", PortId::Bottom, "B", PortId::Top);
        assert_eq!(key, -2);
        assert_eq!(store.links().iter().filter(|l| l.key == key).count(), 1);
    }
}
