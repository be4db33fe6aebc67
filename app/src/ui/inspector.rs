//! Property inspector for the selected node.
//!
//! Rows read straight from the store every frame. While a row is being edited
//! its text lives in egui temp memory; nothing is written back until the edit
//! is committed, and then only as a [`PropertyCommand`].

use diagram_library::{DiagramStore, NodeField, NodeRecord, Point, PropertyCommand};
use egui::{Id, Ui};
use egui_diagram::color::{parse_css_color, to_hex};

/// Turns the raw text of an inspector row into a command. Returns `None` when
/// the input does not make sense for the field.
pub fn parse_row_input(field: NodeField, raw: &str) -> Option<PropertyCommand> {
    match field {
        NodeField::Text => Some(PropertyCommand::Text(raw.to_string())),
        NodeField::Color => Some(PropertyCommand::Color(raw.to_string())),
        NodeField::Width => parse_float_prefix(raw).map(PropertyCommand::Width),
        NodeField::Height => parse_float_prefix(raw).map(PropertyCommand::Height),
        NodeField::Location => raw.parse::<Point>().ok().map(PropertyCommand::Location),
    }
}

/// Leading decimal number of `raw`, ignoring whatever follows it
/// (`"12px"` is 12). Non-finite results are rejected.
pub fn parse_float_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn buffer_id(key: &str, field: NodeField) -> Id {
    Id::new(("inspector_buffer", key, field.name()))
}

/// Single-line editor backed by a temp-memory buffer. Returns the committed
/// text on Enter or focus loss.
fn buffered_text_row(ui: &mut Ui, node: &NodeRecord, field: NodeField) -> Option<String> {
    let id = buffer_id(&node.key, field);
    let mut buffer = ui
        .data(|d| d.get_temp::<String>(id))
        .unwrap_or_else(|| field.display_value(node));

    let response = ui.add(
        egui::TextEdit::singleline(&mut buffer)
            .id(id.with("edit"))
            .desired_width(f32::INFINITY),
    );

    if response.lost_focus() {
        ui.data_mut(|d| d.remove_temp::<String>(id));
        return Some(buffer);
    }
    if response.has_focus() {
        ui.data_mut(|d| d.insert_temp(id, buffer));
    }
    None
}

/// Shows the selected node's properties. Returns the commands committed this
/// frame, to be applied to the selection.
pub fn inspector_panel(ui: &mut Ui, store: &DiagramStore) -> Vec<PropertyCommand> {
    let mut commands = Vec::new();

    let Some(node) = store.selected_node() else {
        ui.weak("Nothing selected");
        return commands;
    };

    ui.heading(if node.is_group { "Group" } else { "Node" });
    ui.separator();

    egui::Grid::new("node_properties")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            ui.label("Key");
            ui.label(egui::RichText::new(&node.key).monospace());
            ui.end_row();

            for field in NodeField::EDITABLE {
                ui.label(field.label());
                ui.horizontal(|ui| {
                    if field == NodeField::Color {
                        if let Some(mut color) = parse_css_color(&node.color) {
                            if egui::color_picker::color_edit_button_srgba(
                                ui,
                                &mut color,
                                egui::color_picker::Alpha::Opaque,
                            )
                            .changed()
                            {
                                commands.push(PropertyCommand::Color(to_hex(color)));
                            }
                        }
                    }
                    if let Some(raw) = buffered_text_row(ui, node, field) {
                        commands.extend(parse_row_input(field, &raw));
                    }
                });
                ui.end_row();
            }

            if let Some(group) = &node.group {
                ui.label("Group");
                ui.label(group);
                ui.end_row();
            }
        });

    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui_kittest::Harness;
    use egui_kittest::kittest::Queryable;

    #[test]
    fn non_numeric_width_is_discarded() {
        assert_eq!(parse_row_input(NodeField::Width, "abc"), None);
        assert_eq!(parse_row_input(NodeField::Height, ""), None);
        assert_eq!(parse_row_input(NodeField::Height, "-"), None);
    }

    #[test]
    fn numeric_prefix_is_accepted() {
        assert_eq!(
            parse_row_input(NodeField::Width, "12px"),
            Some(PropertyCommand::Width(12.0))
        );
        assert_eq!(parse_float_prefix("  3.5e2 wide"), Some(350.0));
        assert_eq!(parse_float_prefix("7e"), Some(7.0));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("-40"), Some(-40.0));
        assert_eq!(parse_float_prefix("1e999"), None);
    }

    #[test]
    fn location_needs_two_numbers() {
        assert_eq!(
            parse_row_input(NodeField::Location, "10 -20"),
            Some(PropertyCommand::Location(Point::new(10.0, -20.0)))
        );
        assert_eq!(parse_row_input(NodeField::Location, "10"), None);
    }

    #[test]
    fn text_and_color_pass_through() {
        assert_eq!(
            parse_row_input(NodeField::Text, ""),
            Some(PropertyCommand::Text(String::new()))
        );
        assert_eq!(
            parse_row_input(NodeField::Color, "not a color"),
            Some(PropertyCommand::Color("not a color".to_string()))
        );
    }

    #[test]
    fn discarded_input_leaves_store_untouched() {
        let mut store = DiagramStore::with_default_dataset();
        store.select(Some("A"));
        let before = store.serialize();
        if let Some(command) = parse_row_input(NodeField::Width, "abc") {
            store.apply_to_selection(command);
        }
        assert_eq!(store.serialize(), before);
    }

    #[test]
    fn shows_hint_without_selection() {
        let store = DiagramStore::with_default_dataset();
        let harness = Harness::builder()
            .with_size(egui::vec2(300.0, 300.0))
            .build_ui(move |ui| {
                inspector_panel(ui, &store);
            });
        assert!(harness.query_by_label("Nothing selected").is_some());
        assert!(harness.query_by_label("Width").is_none());
    }

    #[test]
    fn shows_rows_for_selected_node() {
        let mut store = DiagramStore::with_default_dataset();
        store.select(Some("B"));
        let harness = Harness::builder()
            .with_size(egui::vec2(300.0, 300.0))
            .build_ui(move |ui| {
                let commands = inspector_panel(ui, &store);
                assert!(commands.is_empty());
            });
        assert!(harness.query_by_label("Nothing selected").is_none());
        for label in ["Key", "Text", "Color", "Width", "Height", "Position"] {
            assert!(harness.query_by_label(label).is_some(), "missing {}", label);
        }
    }
}
