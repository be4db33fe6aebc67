//! Main diagram widget.

use std::collections::HashMap;

use diagram_library::routing::{self, LinkEnd};
use diagram_library::{Bounds, PortId, Point};
use egui::{self, Color32, Pos2, Rect, Stroke, StrokeKind, Vec2};

use crate::drawing::{Viewport, draw_arrow_polyline, draw_grid};
use crate::interactions::{self, InteractionContext};
use crate::node_rendering;
use crate::state::DiagramEditorState;
use crate::theme::DiagramTheme;
use crate::traits::{DiagramDataSource, DiagramMutator};
use crate::types::{LinkView, NodeView};

// ---------------------------------------------------------------------------
// PendingActions
// ---------------------------------------------------------------------------

/// Pending mutations collected during the render phase, applied after.
#[derive(Default, Debug, PartialEq)]
pub struct PendingActions {
    /// (node key, new top-left location)
    pub node_moves: Vec<(String, Point)>,
    /// (node key, width, height)
    pub node_resizes: Vec<(String, f64, f64)>,
    /// (node key, new text)
    pub text_edits: Vec<(String, String)>,
    /// Graph positions where the user asked for a new node.
    pub nodes_to_add: Vec<Point>,
    pub nodes_to_remove: Vec<String>,
    pub links_to_add: Vec<(String, PortId, String, PortId)>,
    pub links_to_remove: Vec<i64>,
    /// Node sets to wrap in a new group.
    pub groups_to_create: Vec<Vec<String>>,
    /// Set only when the primary selection changed this frame.
    pub selected_node: Option<Option<String>>,
}

impl PendingActions {
    /// Applies everything in a fixed order and returns the error messages of
    /// the mutations that failed.
    pub fn apply(self, mutator: &mut dyn DiagramMutator) -> Vec<String> {
        let mut errors = Vec::new();
        let mut check = |result: Result<(), String>| {
            if let Err(e) = result {
                errors.push(e);
            }
        };

        for (key, loc) in self.node_moves {
            check(mutator.move_node(&key, loc));
        }
        for (key, width, height) in self.node_resizes {
            check(mutator.resize_node(&key, width, height));
        }
        for (key, text) in self.text_edits {
            check(mutator.set_node_text(&key, &text));
        }
        for (from, from_port, to, to_port) in self.links_to_add {
            check(mutator.add_link(&from, from_port, &to, to_port).map(|_| ()));
        }
        for keys in self.groups_to_create {
            check(mutator.group_nodes(&keys).map(|_| ()));
        }
        for key in self.links_to_remove {
            check(mutator.remove_link(key));
        }
        for key in self.nodes_to_remove {
            check(mutator.remove_node(&key));
        }
        for loc in self.nodes_to_add {
            check(mutator.add_node_at(loc).map(|_| ()));
        }
        if let Some(selected) = self.selected_node {
            check(mutator.select_node(selected.as_deref()));
        }
        errors
    }

    /// True when there is nothing to apply at all.
    pub fn is_empty(&self) -> bool {
        !self.changes_document() && self.selected_node.is_none()
    }

    /// True when applying would change the document, not just the selection.
    pub fn changes_document(&self) -> bool {
        !(self.node_moves.is_empty()
            && self.node_resizes.is_empty()
            && self.text_edits.is_empty()
            && self.nodes_to_add.is_empty()
            && self.nodes_to_remove.is_empty()
            && self.links_to_add.is_empty()
            && self.links_to_remove.is_empty()
            && self.groups_to_create.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Hit-test records
// ---------------------------------------------------------------------------

/// Screen position of a rendered port.
pub(crate) struct PortScreen {
    pub pos: Pos2,
    pub node_key: String,
    pub port: PortId,
}

pub(crate) struct NodeInteraction {
    pub key: String,
    pub rect: Rect,
    pub is_group: bool,
    pub text: String,
    /// Graph-space location as drawn this frame.
    pub loc: Point,
    pub group: Option<String>,
}

pub(crate) struct LinkScreen {
    pub key: i64,
    pub points: Vec<Pos2>,
}

// ---------------------------------------------------------------------------
// DiagramWidget
// ---------------------------------------------------------------------------

pub struct DiagramWidget<'a> {
    state: &'a mut DiagramEditorState,
    theme: &'a DiagramTheme,
}

impl<'a> DiagramWidget<'a> {
    pub fn new(state: &'a mut DiagramEditorState, theme: &'a DiagramTheme) -> Self {
        Self { state, theme }
    }

    /// Show the diagram. Returns pending actions to apply via a mutator.
    pub fn show(&mut self, ui: &mut egui::Ui, source: &dyn DiagramDataSource) -> PendingActions {
        if self.state.zoom <= 0.0 {
            self.state.zoom = 1.0;
        }

        let nodes = source.nodes();
        let links = source.links();
        let source_selection = source.selected_node();
        self.sync_selection(&nodes, &links, &source_selection);

        let available = ui.available_rect_before_wrap();
        let (canvas_response, painter) =
            ui.allocate_painter(available.size(), egui::Sense::click_and_drag());
        let canvas_rect = canvas_response.rect;
        let painter = painter.with_clip_rect(canvas_rect);

        if !self.state.view_initialized {
            self.center_on_content(&nodes, canvas_rect.size());
        }

        // Zoom via scroll wheel
        if let Some(hover) = ui.input(|i| i.pointer.hover_pos()) {
            if canvas_rect.contains(hover) {
                let scroll = ui.input(|i| i.smooth_scroll_delta.y);
                if scroll != 0.0 {
                    let old_zoom = self.state.zoom;
                    let new_zoom = (old_zoom + scroll * 0.002).clamp(0.2, 3.0);
                    let graph_pos = (hover - canvas_rect.min - self.state.pan) / old_zoom;
                    self.state.pan = hover - canvas_rect.min - graph_pos * new_zoom;
                    self.state.zoom = new_zoom;
                }
            }
        }

        // Panning
        if canvas_response.dragged_by(egui::PointerButton::Middle) {
            self.state.pan += canvas_response.drag_delta();
        }

        let viewport = Viewport {
            origin: canvas_rect.min + self.state.pan,
            zoom: self.state.zoom,
        };

        // Background
        painter.rect_filled(canvas_rect, 0.0, self.theme.background_color);
        draw_grid(
            &painter,
            canvas_rect,
            self.state.pan,
            self.theme.grid_color,
            self.theme.grid_spacing * viewport.zoom,
        );

        // ---- Phase 1: Layout with the in-flight gesture applied ----
        let display: Vec<(NodeView, Bounds)> = nodes
            .iter()
            .map(|n| {
                let shown = self.displayed(n);
                let bounds = shown.bounds();
                (shown, bounds)
            })
            .collect();

        // ---- Phase 2: Draw groups, links, then nodes ----
        let mut node_interactions: Vec<NodeInteraction> = Vec::new();
        for (node, _) in display.iter().filter(|(n, _)| n.is_group) {
            let rect = viewport.rect_to_screen(node.loc, node.width, node.height);
            node_rendering::draw_group(
                &painter,
                rect,
                node,
                self.theme,
                self.state.selected_nodes.contains(&node.key),
                viewport.zoom,
            );
            node_interactions.push(Self::interaction_for(node, rect));
        }

        let link_screens = self.draw_links(&painter, &viewport, &display, &links);

        let mut port_screens: Vec<PortScreen> = Vec::new();
        let hovered_port = self.hovered_port(ui, &viewport, &display);
        for (node, bounds) in display.iter().filter(|(n, _)| !n.is_group) {
            let rect = viewport.rect_to_screen(node.loc, node.width, node.height);
            let is_selected = self.state.selected_nodes.contains(&node.key);
            node_rendering::draw_node_body(
                &painter,
                rect,
                node,
                self.theme,
                is_selected,
                viewport.zoom,
            );
            let highlighted = hovered_port
                .as_ref()
                .filter(|(k, _)| *k == node.key)
                .map(|(_, p)| *p);
            node_rendering::draw_ports(
                &painter,
                &viewport,
                bounds,
                &node.key,
                self.theme,
                highlighted,
                &mut port_screens,
            );
            if is_selected && self.state.selected_nodes.len() == 1 {
                node_rendering::draw_resize_handle(&painter, rect, self.theme, viewport.zoom);
            }
            node_interactions.push(Self::interaction_for(node, rect));
        }

        self.draw_connecting_line(&painter, &port_screens);
        self.draw_box_selection(&painter);

        // ---- Phase 3: Handle interactions ----
        let ctx = InteractionContext {
            ui,
            canvas_response: &canvas_response,
            viewport,
            nodes: &node_interactions,
            ports: &port_screens,
            links: &link_screens,
            theme: self.theme,
            hit_radius: self.theme.port_radius * viewport.zoom * 2.5,
        };
        let mut pending = interactions::handle_interactions(self.state, &ctx);

        if self.state.primary != source_selection {
            pending.selected_node = Some(self.state.primary.clone());
        }
        pending
    }

    /// Adopts selection changes made outside the widget and drops keys that
    /// no longer exist.
    fn sync_selection(
        &mut self,
        nodes: &[NodeView],
        links: &[LinkView],
        source_selection: &Option<String>,
    ) {
        let state = &mut *self.state;
        if state.primary != *source_selection {
            state.primary = source_selection.clone();
            state.selected_nodes.clear();
            state.selected_links.clear();
            if let Some(key) = source_selection {
                state.selected_nodes.insert(key.clone());
            }
        }
        state
            .selected_nodes
            .retain(|k| nodes.iter().any(|n| &n.key == k));
        state
            .selected_links
            .retain(|k| links.iter().any(|l| l.key == *k));
        if let Some(editing) = &state.editing_text {
            if !nodes.iter().any(|n| n.key == editing.node_key) {
                state.editing_text = None;
            }
        }
    }

    fn center_on_content(&mut self, nodes: &[NodeView], canvas_size: Vec2) {
        self.state.view_initialized = true;
        let Some(bounds) = nodes.iter().map(|n| n.bounds()).reduce(|a, b| a.union(&b)) else {
            self.state.pan = canvas_size * 0.5;
            return;
        };
        let center = bounds.center();
        self.state.pan =
            canvas_size * 0.5 - Vec2::new(center.x as f32, center.y as f32) * self.state.zoom;
    }

    /// The node as it should appear this frame, with drag offset or resize applied.
    fn displayed(&self, node: &NodeView) -> NodeView {
        let mut shown = node.clone();
        if let Some(drag) = &self.state.dragging {
            if drag.moves(&node.key) {
                shown.loc = shown
                    .loc
                    .offset(drag.offset.x as f64, drag.offset.y as f64);
            }
        }
        if let Some(resize) = &self.state.resizing {
            if resize.node_key == node.key {
                shown.width = resize.size.x as f64;
                shown.height = resize.size.y as f64;
            }
        }
        shown
    }

    fn interaction_for(node: &NodeView, rect: Rect) -> NodeInteraction {
        NodeInteraction {
            key: node.key.clone(),
            rect,
            is_group: node.is_group,
            text: node.text.clone(),
            loc: node.loc,
            group: node.group.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Drawing helpers
    // -----------------------------------------------------------------------

    fn draw_links(
        &self,
        painter: &egui::Painter,
        viewport: &Viewport,
        display: &[(NodeView, Bounds)],
        links: &[LinkView],
    ) -> Vec<LinkScreen> {
        let bounds_by_key: HashMap<&str, &Bounds> = display
            .iter()
            .map(|(n, b)| (n.key.as_str(), b))
            .collect();

        let mut screens = Vec::with_capacity(links.len());
        for link in links {
            let (Some(from), Some(to)) = (
                bounds_by_key.get(link.from.as_str()),
                bounds_by_key.get(link.to.as_str()),
            ) else {
                continue;
            };
            let obstacles: Vec<Bounds> = display
                .iter()
                .filter(|(n, _)| !n.is_group && n.key != link.from && n.key != link.to)
                .map(|(_, b)| *b)
                .collect();
            let route = routing::route_link(
                LinkEnd {
                    bounds: from,
                    port: link.from_port,
                },
                LinkEnd {
                    bounds: to,
                    port: link.to_port,
                },
                &obstacles,
            );
            let points: Vec<Pos2> = route.iter().map(|p| viewport.to_screen(*p)).collect();
            let color = if self.state.selected_links.contains(&link.key) {
                self.theme.link_selected_color
            } else {
                self.theme.link_color
            };
            draw_arrow_polyline(
                painter,
                &points,
                color,
                self.theme.link_width * viewport.zoom.max(0.5),
                self.theme.arrow_size * viewport.zoom,
            );
            screens.push(LinkScreen {
                key: link.key,
                points,
            });
        }
        screens
    }

    /// Port under the pointer, or the link-drag target while connecting.
    fn hovered_port(
        &self,
        ui: &egui::Ui,
        viewport: &Viewport,
        display: &[(NodeView, Bounds)],
    ) -> Option<(String, PortId)> {
        let pos = ui.input(|i| i.pointer.hover_pos())?;
        let hit_radius = self.theme.port_radius * viewport.zoom * 2.5;
        display
            .iter()
            .filter(|(n, _)| !n.is_group)
            .flat_map(|(n, b)| {
                PortId::ALL
                    .into_iter()
                    .map(move |port| (n, port, viewport.to_screen(port.spot(b))))
            })
            .map(|(n, port, p)| (n, port, p.distance(pos)))
            .filter(|(_, _, d)| *d < hit_radius)
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(n, port, _)| (n.key.clone(), port))
    }

    fn draw_connecting_line(&self, painter: &egui::Painter, ports: &[PortScreen]) {
        let Some(connecting) = &self.state.connecting else {
            return;
        };
        let start = ports
            .iter()
            .find(|p| p.node_key == connecting.from_node && p.port == connecting.from_port);
        if let Some(start) = start {
            node_rendering::draw_pending_link(painter, start.pos, connecting.mouse_pos, self.theme);
        }
    }

    fn draw_box_selection(&self, painter: &egui::Painter) {
        if let Some(ref bs) = self.state.box_selecting {
            let sel_rect = Rect::from_two_pos(bs.start, bs.current);
            painter.rect_filled(
                sel_rect,
                0.0,
                Color32::from_rgba_unmultiplied(100, 150, 255, 30),
            );
            painter.rect_stroke(
                sel_rect,
                0.0,
                Stroke::new(1.0, self.theme.selection_color),
                StrokeKind::Outside,
            );
        }
    }
}
