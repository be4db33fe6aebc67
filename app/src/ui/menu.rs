use eframe::egui::{self, Button};
use egui_phosphor::regular as icons;

use crate::command::{CommandId, CommandRegistry};

pub fn menu_bar(
    ui: &mut egui::Ui,
    command_registry: &CommandRegistry,
    triggered_action: &mut Option<CommandId>,
) {
    egui::MenuBar::new().ui(ui, |ui| {
        file_menu(ui, command_registry, triggered_action);
        edit_menu(ui, command_registry, triggered_action);
    });
}

fn command_icon(cmd_id: CommandId) -> &'static str {
    match cmd_id {
        CommandId::Save => icons::FLOPPY_DISK,
        CommandId::Reload => icons::ARROW_CLOCKWISE,
        CommandId::ResetDiagram => icons::ERASER,
        CommandId::Quit => icons::SIGN_OUT,
        CommandId::AddNode => icons::PLUS_SQUARE,
        CommandId::Undo => icons::ARROW_U_UP_LEFT,
        CommandId::Redo => icons::ARROW_U_UP_RIGHT,
        CommandId::Group => icons::SELECTION_PLUS,
        CommandId::Delete => icons::TRASH,
    }
}

fn command_buttons(
    ui: &mut egui::Ui,
    cmd_ids: &[CommandId],
    command_registry: &CommandRegistry,
    triggered_action: &mut Option<CommandId>,
) {
    for &cmd_id in cmd_ids {
        if let Some(cmd) = command_registry.find(cmd_id) {
            let button = Button::new(format!("{} {}", command_icon(cmd_id), cmd.text))
                .shortcut_text(cmd.shortcut_text);
            if ui.add(button).clicked() {
                *triggered_action = Some(cmd.id);
                ui.close();
            }
        }
    }
}

fn file_menu(
    ui: &mut egui::Ui,
    command_registry: &CommandRegistry,
    triggered_action: &mut Option<CommandId>,
) {
    ui.menu_button("File", |ui| {
        command_buttons(
            ui,
            &[CommandId::Save, CommandId::Reload, CommandId::ResetDiagram],
            command_registry,
            triggered_action,
        );
        ui.separator();
        command_buttons(ui, &[CommandId::Quit], command_registry, triggered_action);
    });
}

fn edit_menu(
    ui: &mut egui::Ui,
    command_registry: &CommandRegistry,
    triggered_action: &mut Option<CommandId>,
) {
    ui.menu_button("Edit", |ui| {
        command_buttons(
            ui,
            &[CommandId::Undo, CommandId::Redo],
            command_registry,
            triggered_action,
        );
        ui.separator();
        command_buttons(
            ui,
            &[CommandId::AddNode, CommandId::Group, CommandId::Delete],
            command_registry,
            triggered_action,
        );
    });
}

/// Row of quick-access buttons under the menu bar.
pub fn toolbar(
    ui: &mut egui::Ui,
    command_registry: &CommandRegistry,
    can_undo: bool,
    can_redo: bool,
    triggered_action: &mut Option<CommandId>,
) {
    ui.horizontal(|ui| {
        if let Some(cmd) = command_registry.find(CommandId::AddNode) {
            let text = format!("{} {}", command_icon(cmd.id), cmd.text);
            if ui
                .button(text)
                .on_hover_text(cmd.shortcut_text)
                .clicked()
            {
                *triggered_action = Some(cmd.id);
            }
        }
        ui.separator();
        for (cmd_id, enabled) in [(CommandId::Undo, can_undo), (CommandId::Redo, can_redo)] {
            if let Some(cmd) = command_registry.find(cmd_id) {
                let response = ui
                    .add_enabled(enabled, Button::new(command_icon(cmd_id)))
                    .on_hover_text(format!("{} ({})", cmd.text, cmd.shortcut_text));
                if response.clicked() {
                    *triggered_action = Some(cmd_id);
                }
            }
        }
    });
}
