//! End-to-end behaviour of the diagram store: key generation across reloads,
//! snapshot round-trips and property updates.

use std::collections::HashSet;

use diagram_library::{
    DiagramStore, LinkRecord, NodeRecord, PersistedSnapshot, Point, PortId, PropertyCommand,
    Selection, StoreEvent,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn node(key: &str) -> NodeRecord {
    NodeRecord::new(key, key, "lightblue", Point::new(0.0, 0.0))
}

#[test]
fn two_adds_after_lettered_nodes_yield_node1_node2() {
    let mut store = DiagramStore::from_snapshot(PersistedSnapshot::new(
        vec![node("A"), node("B")],
        vec![],
    ));
    assert_eq!(store.add_node(), "Node1");
    assert_eq!(store.add_node(), "Node2");
}

#[test]
fn reload_after_node3_continues_at_node4() {
    let mut original = DiagramStore::from_snapshot(PersistedSnapshot::new(
        vec![node("Node3")],
        vec![LinkRecord::new(-1, "Node3", PortId::Right, "Node3", PortId::Left)],
    ));
    let json = original.serialize().to_json().unwrap();

    let mut reloaded = DiagramStore::new();
    reloaded.restore(PersistedSnapshot::from_json(&json).unwrap());
    assert_eq!(reloaded.add_node(), "Node4");

    // The original keeps counting from its own seed as well.
    assert_eq!(original.add_node(), "Node4");
}

#[test]
fn counter_after_restore_exceeds_max_suffix() {
    let snapshot = PersistedSnapshot::new(
        vec![node("Node7"), node("Start"), node("Node12"), node("Node2")],
        vec![],
    );
    let mut store = DiagramStore::from_snapshot(snapshot);
    assert_eq!(store.add_node(), "Node13");

    let mut store = DiagramStore::from_snapshot(PersistedSnapshot::new(
        vec![node("X"), node("Y")],
        vec![],
    ));
    assert_eq!(store.add_node(), "Node1");
}

#[test]
fn generated_keys_are_unique_over_many_operations() {
    init_logging();
    let mut store = DiagramStore::with_default_dataset();
    let mut seen: HashSet<String> = store.nodes().iter().map(|n| n.key.clone()).collect();
    for i in 0..200 {
        let key = if i % 3 == 0 {
            store.add_node_at(Point::new(i as f64, 0.0))
        } else {
            store.add_node()
        };
        assert!(seen.insert(key.clone()), "duplicate key {}", key);
        if i % 17 == 0 {
            let snapshot = store.serialize();
            store.restore(snapshot);
        }
    }
}

#[test]
fn serialize_restore_round_trip_preserves_everything() {
    let mut store = DiagramStore::with_default_dataset();
    let n1 = store.add_node();
    store.set_property(Some(&n1), PropertyCommand::Text("hello".into()));
    store.set_property(Some(&n1), PropertyCommand::Location(Point::new(12.5, -3.0)));
    store.set_property(Some("A"), PropertyCommand::Width(140.0));
    store.add_link(&n1, PortId::Bottom, "missing", PortId::Top);
    store.group_nodes(&["A".to_string(), n1.clone()]);

    let snapshot = store.serialize();
    let json = snapshot.to_json().unwrap();
    let mut reloaded = DiagramStore::new();
    reloaded.restore(PersistedSnapshot::from_json(&json).unwrap());

    assert_eq!(reloaded.nodes(), store.nodes());
    assert_eq!(reloaded.links(), store.links());
    assert_eq!(reloaded.serialize(), snapshot);
}

#[test]
fn fractional_sizes_survive_json_exactly() {
    let sizes = [
        109.56350267966239,
        117.66663537237021,
        118.75374018543455,
        115.49702591150455,
        0.1 + 0.2,
        1.0 / 3.0,
    ];
    let mut store = DiagramStore::new();
    for (i, size) in sizes.iter().enumerate() {
        let key = store.add_node();
        store.set_property(Some(&key), PropertyCommand::Width(*size));
        store.set_property(Some(&key), PropertyCommand::Height(size / 7.0));
        store.set_property(
            Some(&key),
            PropertyCommand::Location(Point::new(size * i as f64, -size / 3.0)),
        );
    }

    let json = store.serialize().to_json().unwrap();
    let back = PersistedSnapshot::from_json(&json).unwrap();
    for (node, size) in back.nodes.iter().zip(sizes) {
        assert_eq!(node.width.to_bits(), size.to_bits(), "width of {}", node.key);
        assert_eq!(node.height.to_bits(), (size / 7.0).to_bits());
    }
    assert_eq!(back, store.serialize());
}

#[test]
fn set_property_without_selection_changes_nothing() {
    let mut store = DiagramStore::with_default_dataset();
    let before = store.serialize();
    assert_eq!(store.selection(), &Selection::NoSelection);

    assert!(!store.apply_to_selection(PropertyCommand::Text("changed".into())));
    assert!(!store.set_property(None, PropertyCommand::Width(999.0)));

    assert_eq!(store.serialize(), before);
}

#[test]
fn apply_to_selection_targets_selected_node() {
    let mut store = DiagramStore::with_default_dataset();
    store.select(Some("B"));
    assert!(store.apply_to_selection(PropertyCommand::Height(80.0)));
    assert_eq!(store.node("B").unwrap().height, 80.0);
    assert_eq!(store.node("A").unwrap().height, 60.0);
}

#[test]
fn reload_resets_selection() {
    let mut store = DiagramStore::with_default_dataset();
    store.select(Some("A"));
    let rx = store.subscribe();
    store.restore(store.serialize());
    assert_eq!(store.selection(), &Selection::NoSelection);
    let events: Vec<StoreEvent> = rx.try_iter().collect();
    assert_eq!(
        events,
        vec![StoreEvent::SelectionChanged(None), StoreEvent::Restored]
    );
}

#[test]
fn dangling_links_survive_reload() {
    let snapshot = PersistedSnapshot::new(
        vec![node("A")],
        vec![LinkRecord::new(-1, "A", PortId::Right, "gone", PortId::Left)],
    );
    let store = DiagramStore::from_snapshot(snapshot.clone());
    assert_eq!(store.links(), snapshot.links.as_slice());
}

#[test]
fn legacy_blob_from_browser_storage_loads() {
    init_logging();
    let json = r##"{"nodeDataArray":[
        {"key":"A","text":"A","color":"lightblue","loc":"0 0","width":100,"height":60},
        {"key":"Node5","text":"New Node","color":"#ff0000","loc":"10 20","width":100,"height":60}
    ],"linkDataArray":[{"key":-1,"from":"A","to":"Node5","fromPort":"r","toPort":"l"}]}"##;
    let mut store = DiagramStore::from_snapshot(PersistedSnapshot::from_json(json).unwrap());
    assert_eq!(store.node("Node5").unwrap().loc, Point::new(10.0, 20.0));
    assert_eq!(store.add_node(), "Node6");
}
