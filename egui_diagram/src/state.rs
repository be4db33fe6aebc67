//! UI state for the diagram canvas.
//!
//! Node positions are never cached here; they come from the data source each
//! frame. Only transient gesture state (drag offset, resize size, rubber band)
//! lives in this struct.

use std::collections::BTreeSet;

use diagram_library::{PortId, Point};

/// UI state for the diagram panel.
#[derive(Default)]
pub struct DiagramEditorState {
    /// Pan offset in screen pixels.
    pub pan: egui::Vec2,
    /// Zoom level (1.0 = 100%).
    pub zoom: f32,
    /// Whether the view has been centered on the content yet.
    pub view_initialized: bool,
    /// Currently selected nodes.
    pub selected_nodes: BTreeSet<String>,
    /// Currently selected links.
    pub selected_links: BTreeSet<i64>,
    /// Node shown in the inspector. Kept in step with the data source.
    pub primary: Option<String>,
    /// Drag state for nodes.
    pub dragging: Option<DragState>,
    /// Link creation state.
    pub connecting: Option<ConnectingState>,
    /// Resize handle drag state.
    pub resizing: Option<ResizeState>,
    /// Box selection state.
    pub box_selecting: Option<BoxSelectState>,
    /// Node-specific context menu (right-click on a node).
    pub node_context_menu: Option<NodeContextMenuState>,
    /// Canvas context menu (right-click on empty space).
    pub canvas_context_menu: Option<CanvasContextMenuState>,
    /// Inline text editor over a node.
    pub editing_text: Option<TextEditState>,
}

impl DiagramEditorState {
    pub fn new() -> Self {
        Self {
            zoom: 1.0,
            ..Self::default()
        }
    }

    /// Fixed view, skipping the initial centering pass.
    pub fn with_view(pan: egui::Vec2, zoom: f32) -> Self {
        Self {
            pan,
            zoom,
            view_initialized: true,
            ..Self::default()
        }
    }

    /// Forget every gesture in progress and the selection.
    pub fn reset_interaction(&mut self) {
        self.selected_nodes.clear();
        self.selected_links.clear();
        self.primary = None;
        self.dragging = None;
        self.connecting = None;
        self.resizing = None;
        self.box_selecting = None;
        self.node_context_menu = None;
        self.canvas_context_menu = None;
        self.editing_text = None;
    }
}

pub struct DragState {
    /// Nodes whose final location is reported when the drag ends, with their
    /// locations at drag start.
    pub nodes: Vec<(String, Point)>,
    /// Members of dragged groups. They move along on screen; the store moves
    /// them when the group's location changes.
    pub followers: Vec<String>,
    /// Accumulated offset in graph units.
    pub offset: egui::Vec2,
}

impl DragState {
    pub fn moves(&self, key: &str) -> bool {
        self.nodes.iter().any(|(k, _)| k == key) || self.followers.iter().any(|k| k == key)
    }
}

pub struct ConnectingState {
    pub from_node: String,
    pub from_port: PortId,
    pub mouse_pos: egui::Pos2,
}

pub struct ResizeState {
    pub node_key: String,
    /// Current size in graph units.
    pub size: egui::Vec2,
}

pub struct BoxSelectState {
    pub start: egui::Pos2,
    pub current: egui::Pos2,
}

#[derive(Clone)]
pub struct NodeContextMenuState {
    pub screen_pos: egui::Pos2,
    pub node_key: String,
}

#[derive(Clone)]
pub struct CanvasContextMenuState {
    pub screen_pos: egui::Pos2,
    pub graph_pos: Point,
}

pub struct TextEditState {
    pub node_key: String,
    pub buffer: String,
    pub focus_requested: bool,
}
