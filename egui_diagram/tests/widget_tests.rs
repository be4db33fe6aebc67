//! Drives the widget through egui_kittest with a fixed view so node
//! positions on screen are predictable.

use std::cell::RefCell;
use std::rc::Rc;

use diagram_library::{PortId, Point};
use egui_diagram::{
    DiagramDataSource, DiagramEditorState, DiagramTheme, DiagramWidget, LinkView, NodeView,
    PendingActions,
};
use egui_kittest::Harness;

struct FixedSource {
    nodes: Vec<NodeView>,
    links: Vec<LinkView>,
}

impl FixedSource {
    fn two_nodes() -> Self {
        let node = |key: &str, x: f64| NodeView {
            key: key.to_string(),
            text: key.to_string(),
            color: "lightblue".to_string(),
            loc: Point::new(x, 0.0),
            width: 100.0,
            height: 60.0,
            is_group: false,
            group: None,
        };
        Self {
            nodes: vec![node("A", 0.0), node("B", 200.0)],
            links: vec![LinkView {
                key: -1,
                from: "A".into(),
                from_port: PortId::Right,
                to: "B".into(),
                to_port: PortId::Left,
            }],
        }
    }
}

impl DiagramDataSource for FixedSource {
    fn nodes(&self) -> Vec<NodeView> {
        self.nodes.clone()
    }

    fn links(&self) -> Vec<LinkView> {
        self.links.clone()
    }

    fn selected_node(&self) -> Option<String> {
        None
    }
}

fn harness(collected: Rc<RefCell<Vec<PendingActions>>>) -> Harness<'static> {
    let source = FixedSource::two_nodes();
    let theme = DiagramTheme::default();
    let mut state = DiagramEditorState::with_view(egui::vec2(50.0, 50.0), 1.0);
    Harness::builder()
        .with_size(egui::vec2(500.0, 300.0))
        .build_ui(move |ui| {
            let pending = DiagramWidget::new(&mut state, &theme).show(ui, &source);
            if !pending.is_empty() {
                collected.borrow_mut().push(pending);
            }
        })
}

fn click(harness: &mut Harness<'static>, pos: egui::Pos2) {
    harness.input_mut().events.push(egui::Event::PointerMoved(pos));
    harness.step();
    for pressed in [true, false] {
        harness.input_mut().events.push(egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        });
        harness.step();
    }
}

#[test]
fn renders_without_reporting_anything() {
    let collected = Rc::new(RefCell::new(Vec::new()));
    let mut harness = harness(collected.clone());
    harness.run();
    assert!(collected.borrow().is_empty());
}

#[test]
fn clicking_a_node_reports_primary_selection() {
    let collected = Rc::new(RefCell::new(Vec::new()));
    let mut harness = harness(collected.clone());
    harness.run();

    click(&mut harness, egui::pos2(100.0, 90.0));

    let reported: Vec<Option<String>> = collected
        .borrow()
        .iter()
        .filter_map(|p| p.selected_node.clone())
        .collect();
    assert_eq!(reported.first(), Some(&Some("A".to_string())));
}

#[test]
fn double_clicking_empty_canvas_requests_a_node() {
    let collected = Rc::new(RefCell::new(Vec::new()));
    let mut harness = harness(collected.clone());
    harness.run();

    let pos = egui::pos2(120.0, 250.0);
    click(&mut harness, pos);
    click(&mut harness, pos);

    let added: Vec<Point> = collected
        .borrow()
        .iter()
        .flat_map(|p| p.nodes_to_add.clone())
        .collect();
    assert_eq!(added.len(), 1);
    assert!(added[0].y > 100.0, "created below the existing nodes");
}
