//! Pointer and keyboard handling for the diagram canvas.

use diagram_library::PortId;
use egui::{self, Pos2, Rect, Vec2};

use crate::drawing::{Viewport, distance_to_polyline};
use crate::node_rendering::resize_handle_rect;
use crate::state::{
    BoxSelectState, CanvasContextMenuState, ConnectingState, DiagramEditorState, DragState,
    NodeContextMenuState, ResizeState, TextEditState,
};
use crate::theme::DiagramTheme;
use crate::widget::{LinkScreen, NodeInteraction, PendingActions, PortScreen};

/// Context passed to interaction handlers.
pub(crate) struct InteractionContext<'a> {
    pub ui: &'a egui::Ui,
    pub canvas_response: &'a egui::Response,
    pub viewport: Viewport,
    /// Groups first, then plain nodes; iterate in reverse for topmost-first.
    pub nodes: &'a [NodeInteraction],
    pub ports: &'a [PortScreen],
    pub links: &'a [LinkScreen],
    pub theme: &'a DiagramTheme,
    pub hit_radius: f32,
}

pub(crate) fn handle_interactions(
    state: &mut DiagramEditorState,
    ctx: &InteractionContext,
) -> PendingActions {
    let mut pending = PendingActions::default();
    let pointer_pos = ctx.ui.input(|i| i.pointer.hover_pos());

    handle_active_drag(state, ctx);
    handle_drag_stop(state, ctx, pointer_pos, &mut pending);
    handle_drag_start(state, ctx, pointer_pos);
    handle_connecting_update(state, pointer_pos);
    handle_single_click(state, ctx, pointer_pos);
    handle_double_click(state, ctx, pointer_pos, &mut pending);
    handle_right_click(state, ctx, pointer_pos);
    render_node_context_menu(state, ctx, &mut pending);
    render_canvas_context_menu(state, ctx, &mut pending);
    render_text_editor(state, ctx, &mut pending);
    handle_delete_key(state, ctx, &mut pending);

    pending
}

// ---------------------------------------------------------------------------
// Hit-testing helpers
// ---------------------------------------------------------------------------

/// Find the closest port within hit_radius of pos.
pub(crate) fn find_nearest_port<'a>(
    ports: &'a [PortScreen],
    pos: Pos2,
    hit_radius: f32,
    exclude_node: Option<&str>,
) -> Option<&'a PortScreen> {
    ports
        .iter()
        .filter(|p| exclude_node != Some(p.node_key.as_str()))
        .map(|p| (p.pos.distance(pos), p))
        .filter(|(d, _)| *d < hit_radius)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, p)| p)
}

/// Topmost node under `pos`. Plain nodes win over the groups behind them.
pub(crate) fn node_at(nodes: &[NodeInteraction], pos: Pos2) -> Option<&NodeInteraction> {
    nodes.iter().rev().find(|n| n.rect.contains(pos))
}

fn link_at(links: &[LinkScreen], pos: Pos2, tolerance: f32) -> Option<i64> {
    links
        .iter()
        .map(|l| (distance_to_polyline(pos, &l.points), l.key))
        .filter(|(d, _)| *d <= tolerance)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key)
}

/// Click selection: replace the selection, or toggle membership with Shift.
fn click_select(state: &mut DiagramEditorState, key: &str, extend: bool) {
    if extend {
        if !state.selected_nodes.remove(key) {
            state.selected_nodes.insert(key.to_string());
            state.primary = Some(key.to_string());
        } else if state.primary.as_deref() == Some(key) {
            state.primary = state.selected_nodes.iter().next().cloned();
        }
    } else {
        state.selected_nodes.clear();
        state.selected_links.clear();
        state.selected_nodes.insert(key.to_string());
        state.primary = Some(key.to_string());
    }
}

// ---------------------------------------------------------------------------
// Individual interaction handlers
// ---------------------------------------------------------------------------

fn handle_active_drag(state: &mut DiagramEditorState, ctx: &InteractionContext) {
    if !ctx.canvas_response.dragged_by(egui::PointerButton::Primary) {
        return;
    }
    let delta = ctx.canvas_response.drag_delta() / ctx.viewport.zoom;

    if let Some(drag) = state.dragging.as_mut() {
        drag.offset += delta;
    } else if let Some(rs) = state.resizing.as_mut() {
        rs.size += delta;
    } else if let Some(bs) = state.box_selecting.as_mut() {
        if let Some(pos) = ctx.ui.input(|i| i.pointer.hover_pos()) {
            bs.current = pos;
        }
    }
}

fn handle_drag_stop(
    state: &mut DiagramEditorState,
    ctx: &InteractionContext,
    pointer_pos: Option<Pos2>,
    pending: &mut PendingActions,
) {
    if !ctx
        .canvas_response
        .drag_stopped_by(egui::PointerButton::Primary)
    {
        return;
    }

    // Finish link
    if let Some(connecting) = state.connecting.take() {
        if let Some(pos) = pointer_pos {
            let target = find_nearest_port(
                ctx.ports,
                pos,
                ctx.hit_radius,
                Some(&connecting.from_node),
            );
            if let Some(target) = target {
                pending.links_to_add.push((
                    connecting.from_node,
                    connecting.from_port,
                    target.node_key.clone(),
                    target.port,
                ));
            }
        }
    }

    // Finish box selection
    if let Some(bs) = state.box_selecting.take() {
        let sel_rect = Rect::from_two_pos(bs.start, bs.current);
        if !ctx.ui.input(|i| i.modifiers.shift) {
            state.selected_nodes.clear();
            state.selected_links.clear();
            state.primary = None;
        }
        for node in ctx.nodes.iter().filter(|n| !n.is_group) {
            if sel_rect.intersects(node.rect) {
                state.selected_nodes.insert(node.key.clone());
                if state.primary.is_none() {
                    state.primary = Some(node.key.clone());
                }
            }
        }
    }

    // Finish node drag
    if let Some(drag) = state.dragging.take() {
        if drag.offset != Vec2::ZERO {
            let (dx, dy) = (drag.offset.x as f64, drag.offset.y as f64);
            for (key, start) in drag.nodes {
                pending.node_moves.push((key, start.offset(dx, dy)));
            }
        }
    }

    // Finish resize
    if let Some(rs) = state.resizing.take() {
        let min = ctx.theme.min_node_size;
        pending.node_resizes.push((
            rs.node_key,
            rs.size.x.max(min) as f64,
            rs.size.y.max(min) as f64,
        ));
    }
}

fn handle_drag_start(
    state: &mut DiagramEditorState,
    ctx: &InteractionContext,
    pointer_pos: Option<Pos2>,
) {
    if !ctx
        .canvas_response
        .drag_started_by(egui::PointerButton::Primary)
    {
        return;
    }
    // The drag starts where the button went down, not where the threshold was crossed.
    let Some(pos) = ctx
        .ui
        .input(|i| i.pointer.press_origin())
        .or(pointer_pos)
    else {
        return;
    };
    state.node_context_menu = None;
    state.canvas_context_menu = None;
    let moved_so_far = (pointer_pos.unwrap_or(pos) - pos) / ctx.viewport.zoom;

    // 1. Port hit starts a new link
    if let Some(port) = find_nearest_port(ctx.ports, pos, ctx.hit_radius, None) {
        state.connecting = Some(ConnectingState {
            from_node: port.node_key.clone(),
            from_port: port.port,
            mouse_pos: pos,
        });
        return;
    }

    // 2. Resize handle of the single selected node
    if state.selected_nodes.len() == 1 {
        let selected = ctx
            .nodes
            .iter()
            .find(|n| !n.is_group && state.selected_nodes.contains(&n.key));
        if let Some(node) = selected {
            if resize_handle_rect(node.rect, ctx.theme, ctx.viewport.zoom).contains(pos) {
                state.resizing = Some(ResizeState {
                    node_key: node.key.clone(),
                    size: node.rect.size() / ctx.viewport.zoom + moved_so_far,
                });
                return;
            }
        }
    }

    // 3. Node body drags the selection
    if let Some(node) = node_at(ctx.nodes, pos) {
        if !state.selected_nodes.contains(&node.key) {
            click_select(state, &node.key, ctx.ui.input(|i| i.modifiers.shift));
        }
        let mut drag = build_drag(state, ctx.nodes);
        drag.offset = moved_so_far;
        state.dragging = Some(drag);
        return;
    }

    // 4. Empty space → box selection
    state.box_selecting = Some(BoxSelectState {
        start: pos,
        current: pos,
    });
}

/// Splits the selection into nodes whose moves are reported and members that
/// only follow their dragged group.
fn build_drag(state: &DiagramEditorState, nodes: &[NodeInteraction]) -> DragState {
    let dragged_groups: Vec<&str> = nodes
        .iter()
        .filter(|n| n.is_group && state.selected_nodes.contains(&n.key))
        .map(|n| n.key.as_str())
        .collect();

    let mut drag = DragState {
        nodes: Vec::new(),
        followers: Vec::new(),
        offset: Vec2::ZERO,
    };
    for node in nodes {
        let follows_group = node
            .group
            .as_deref()
            .is_some_and(|g| dragged_groups.contains(&g));
        if follows_group {
            drag.followers.push(node.key.clone());
        } else if state.selected_nodes.contains(&node.key) {
            drag.nodes.push((node.key.clone(), node.loc));
        }
    }
    drag
}

fn handle_connecting_update(state: &mut DiagramEditorState, pointer_pos: Option<Pos2>) {
    if let Some(ref mut connecting) = state.connecting {
        if let Some(pos) = pointer_pos {
            connecting.mouse_pos = pos;
        }
    }
}

fn handle_single_click(
    state: &mut DiagramEditorState,
    ctx: &InteractionContext,
    pointer_pos: Option<Pos2>,
) {
    if !ctx.canvas_response.clicked() {
        return;
    }
    let Some(pos) = pointer_pos else { return };
    state.node_context_menu = None;
    state.canvas_context_menu = None;
    let shift = ctx.ui.input(|i| i.modifiers.shift);

    if let Some(node) = node_at(ctx.nodes, pos) {
        click_select(state, &node.key, shift);
        return;
    }

    if let Some(link) = link_at(ctx.links, pos, 4.0 * ctx.viewport.zoom.max(1.0)) {
        if !shift {
            state.selected_nodes.clear();
            state.selected_links.clear();
            state.primary = None;
        }
        state.selected_links.insert(link);
        return;
    }

    state.selected_nodes.clear();
    state.selected_links.clear();
    state.primary = None;
}

fn handle_double_click(
    state: &mut DiagramEditorState,
    ctx: &InteractionContext,
    pointer_pos: Option<Pos2>,
    pending: &mut PendingActions,
) {
    if !ctx.canvas_response.double_clicked() {
        return;
    }
    let Some(pos) = pointer_pos else { return };

    match node_at(ctx.nodes, pos) {
        Some(node) => {
            state.editing_text = Some(TextEditState {
                node_key: node.key.clone(),
                buffer: node.text.clone(),
                focus_requested: false,
            });
        }
        None => {
            if link_at(ctx.links, pos, 4.0 * ctx.viewport.zoom.max(1.0)).is_none() {
                pending.nodes_to_add.push(ctx.viewport.to_graph(pos));
            }
        }
    }
}

fn handle_right_click(
    state: &mut DiagramEditorState,
    ctx: &InteractionContext,
    pointer_pos: Option<Pos2>,
) {
    if !ctx.canvas_response.secondary_clicked() {
        return;
    }
    let Some(pos) = pointer_pos else { return };

    if let Some(node) = node_at(ctx.nodes, pos) {
        if !state.selected_nodes.contains(&node.key) {
            click_select(state, &node.key, false);
        }
        state.node_context_menu = Some(NodeContextMenuState {
            screen_pos: pos,
            node_key: node.key.clone(),
        });
        state.canvas_context_menu = None;
        return;
    }

    state.canvas_context_menu = Some(CanvasContextMenuState {
        screen_pos: pos,
        graph_pos: ctx.viewport.to_graph(pos),
    });
    state.node_context_menu = None;
}

fn render_node_context_menu(
    state: &mut DiagramEditorState,
    ctx: &InteractionContext,
    pending: &mut PendingActions,
) {
    let Some(menu) = state.node_context_menu.clone() else {
        return;
    };

    let mut close = false;
    let sel_count = state.selected_nodes.len();
    let popup_id = ctx.ui.make_persistent_id("diagram_node_context_menu");
    egui::Area::new(popup_id)
        .order(egui::Order::Foreground)
        .fixed_pos(menu.screen_pos)
        .show(ctx.ui.ctx(), |ui| {
            egui::Frame::menu(ui.style()).show(ui, |ui| {
                ui.set_max_width(180.0);
                if ui.button("Group").clicked() {
                    let keys: Vec<String> = state.selected_nodes.iter().cloned().collect();
                    pending.groups_to_create.push(keys);
                    close = true;
                }
                if ui.button("Edit Text").clicked() {
                    let text = ctx
                        .nodes
                        .iter()
                        .find(|n| n.key == menu.node_key)
                        .map(|n| n.text.clone())
                        .unwrap_or_default();
                    state.editing_text = Some(TextEditState {
                        node_key: menu.node_key.clone(),
                        buffer: text,
                        focus_requested: false,
                    });
                    close = true;
                }
                ui.separator();
                if ui.button("Delete").clicked() {
                    pending.nodes_to_remove.push(menu.node_key.clone());
                    state.selected_nodes.remove(&menu.node_key);
                    if state.primary.as_deref() == Some(menu.node_key.as_str()) {
                        state.primary = None;
                    }
                    close = true;
                }
                if sel_count > 1 {
                    let label = format!("Delete Selected ({})", sel_count);
                    if ui.button(&label).clicked() {
                        pending
                            .nodes_to_remove
                            .extend(state.selected_nodes.iter().cloned());
                        state.selected_nodes.clear();
                        state.primary = None;
                        close = true;
                    }
                }
            });
        });
    if close || ctx.ui.input(|i| i.key_pressed(egui::Key::Escape)) {
        state.node_context_menu = None;
    }
}

fn render_canvas_context_menu(
    state: &mut DiagramEditorState,
    ctx: &InteractionContext,
    pending: &mut PendingActions,
) {
    let Some(menu) = state.canvas_context_menu.clone() else {
        return;
    };

    let mut close = false;
    let popup_id = ctx.ui.make_persistent_id("diagram_canvas_context_menu");
    egui::Area::new(popup_id)
        .order(egui::Order::Foreground)
        .fixed_pos(menu.screen_pos)
        .show(ctx.ui.ctx(), |ui| {
            egui::Frame::menu(ui.style()).show(ui, |ui| {
                ui.set_max_width(180.0);
                if ui.button("Add Node Here").clicked() {
                    pending.nodes_to_add.push(menu.graph_pos);
                    close = true;
                }
                if !state.selected_links.is_empty() {
                    let label = format!("Delete Links ({})", state.selected_links.len());
                    if ui.button(&label).clicked() {
                        pending
                            .links_to_remove
                            .extend(state.selected_links.iter().copied());
                        state.selected_links.clear();
                        close = true;
                    }
                }
            });
        });
    if close || ctx.ui.input(|i| i.key_pressed(egui::Key::Escape)) {
        state.canvas_context_menu = None;
    }
}

/// Inline editor laid over the node being renamed. Enter or losing focus
/// commits; Escape cancels.
fn render_text_editor(
    state: &mut DiagramEditorState,
    ctx: &InteractionContext,
    pending: &mut PendingActions,
) {
    let Some(editing) = state.editing_text.as_mut() else {
        return;
    };
    let Some(node) = ctx.nodes.iter().find(|n| n.key == editing.node_key) else {
        state.editing_text = None;
        return;
    };

    let mut commit = false;
    let mut cancel = false;
    let popup_id = ctx.ui.make_persistent_id(("diagram_text_edit", &editing.node_key));
    egui::Area::new(popup_id)
        .order(egui::Order::Foreground)
        .fixed_pos(Pos2::new(node.rect.min.x, node.rect.center().y - 12.0))
        .show(ctx.ui.ctx(), |ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut editing.buffer)
                    .desired_width(node.rect.width().max(60.0))
                    .hint_text("Node text"),
            );
            if !editing.focus_requested {
                response.request_focus();
                editing.focus_requested = true;
            }
            if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                cancel = true;
            } else if response.lost_focus() {
                commit = true;
            }
        });

    if cancel {
        state.editing_text = None;
    } else if commit {
        if let Some(editing) = state.editing_text.take() {
            pending.text_edits.push((editing.node_key, editing.buffer));
        }
    }
}

fn handle_delete_key(
    state: &mut DiagramEditorState,
    ctx: &InteractionContext,
    pending: &mut PendingActions,
) {
    // Keys typed into a text field belong to that field.
    if state.editing_text.is_some() || ctx.ui.ctx().wants_keyboard_input() {
        return;
    }
    if ctx
        .ui
        .input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace))
    {
        pending
            .nodes_to_remove
            .extend(state.selected_nodes.iter().cloned());
        state.selected_nodes.clear();
        pending
            .links_to_remove
            .extend(state.selected_links.iter().copied());
        state.selected_links.clear();
        state.primary = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagram_library::Point;

    fn node(key: &str, rect: Rect, is_group: bool, group: Option<&str>) -> NodeInteraction {
        NodeInteraction {
            key: key.to_string(),
            rect,
            is_group,
            text: key.to_string(),
            loc: Point::new(rect.min.x as f64, rect.min.y as f64),
            group: group.map(str::to_string),
        }
    }

    #[test]
    fn nearest_port_respects_radius_and_exclusion() {
        let ports = vec![
            PortScreen {
                pos: Pos2::new(0.0, 0.0),
                node_key: "A".into(),
                port: PortId::Right,
            },
            PortScreen {
                pos: Pos2::new(5.0, 0.0),
                node_key: "B".into(),
                port: PortId::Left,
            },
        ];
        let hit = find_nearest_port(&ports, Pos2::new(1.0, 0.0), 10.0, None).unwrap();
        assert_eq!(hit.node_key, "A");
        let hit = find_nearest_port(&ports, Pos2::new(1.0, 0.0), 10.0, Some("A")).unwrap();
        assert_eq!(hit.node_key, "B");
        assert!(find_nearest_port(&ports, Pos2::new(50.0, 0.0), 10.0, None).is_none());
    }

    #[test]
    fn plain_node_wins_over_group_behind_it() {
        let nodes = vec![
            node(
                "Group",
                Rect::from_min_size(Pos2::ZERO, Vec2::splat(200.0)),
                true,
                None,
            ),
            node(
                "A",
                Rect::from_min_size(Pos2::new(20.0, 40.0), Vec2::new(100.0, 60.0)),
                false,
                Some("Group"),
            ),
        ];
        assert_eq!(node_at(&nodes, Pos2::new(50.0, 50.0)).unwrap().key, "A");
        assert_eq!(node_at(&nodes, Pos2::new(5.0, 5.0)).unwrap().key, "Group");
        assert!(node_at(&nodes, Pos2::new(300.0, 5.0)).is_none());
    }

    #[test]
    fn shift_click_toggles_membership() {
        let mut state = DiagramEditorState::new();
        click_select(&mut state, "A", false);
        click_select(&mut state, "B", true);
        assert_eq!(state.selected_nodes.len(), 2);
        assert_eq!(state.primary.as_deref(), Some("B"));

        click_select(&mut state, "B", true);
        assert_eq!(state.selected_nodes.len(), 1);
        assert_eq!(state.primary.as_deref(), Some("A"));

        click_select(&mut state, "C", false);
        assert_eq!(state.selected_nodes.iter().collect::<Vec<_>>(), vec!["C"]);
    }

    #[test]
    fn dragging_a_group_carries_members_without_reporting_them() {
        let mut state = DiagramEditorState::new();
        state.selected_nodes.insert("Group".into());
        state.selected_nodes.insert("A".into());
        let nodes = vec![
            node(
                "Group",
                Rect::from_min_size(Pos2::ZERO, Vec2::splat(200.0)),
                true,
                None,
            ),
            node(
                "A",
                Rect::from_min_size(Pos2::new(20.0, 40.0), Vec2::splat(50.0)),
                false,
                Some("Group"),
            ),
            node(
                "B",
                Rect::from_min_size(Pos2::new(400.0, 40.0), Vec2::splat(50.0)),
                false,
                None,
            ),
        ];
        let drag = build_drag(&state, &nodes);
        assert_eq!(drag.nodes, vec![("Group".to_string(), Point::new(0.0, 0.0))]);
        assert_eq!(drag.followers, vec!["A".to_string()]);
        assert!(drag.moves("A"));
        assert!(!drag.moves("B"));
    }

    #[test]
    fn link_hit_uses_tolerance() {
        let links = vec![LinkScreen {
            key: -1,
            points: vec![Pos2::new(0.0, 0.0), Pos2::new(100.0, 0.0)],
        }];
        assert_eq!(link_at(&links, Pos2::new(50.0, 3.0), 4.0), Some(-1));
        assert_eq!(link_at(&links, Pos2::new(50.0, 9.0), 4.0), None);
    }
}
