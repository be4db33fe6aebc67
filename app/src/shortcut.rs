use eframe::egui::Context;
use log::debug;

use crate::command::{CommandId, CommandRegistry};

pub struct ShortcutManager;

impl ShortcutManager {
    pub fn new() -> Self {
        Self
    }

    /// First registered command whose shortcut was pressed this frame. While a
    /// text field has focus, undo/redo belong to the field.
    pub fn handle_shortcuts(&self, ctx: &Context, registry: &CommandRegistry) -> Option<CommandId> {
        let typing = ctx.wants_keyboard_input();
        for cmd in &registry.commands {
            if typing && matches!(cmd.id, CommandId::Undo | CommandId::Redo) {
                continue;
            }
            if let Some((modifiers, key)) = cmd.shortcut {
                if ctx.input(|i| i.key_pressed(key) && i.modifiers.matches_exact(modifiers)) {
                    debug!("Shortcut {} -> {:?}", cmd.shortcut_text, cmd.id);
                    return Some(cmd.id);
                }
            }
        }
        None
    }
}
