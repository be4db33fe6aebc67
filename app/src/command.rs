use eframe::egui::{Key, Modifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    // File Menu
    Save,
    Reload,
    ResetDiagram,
    Quit,

    // Edit Menu
    AddNode,
    Undo,
    Redo,
    Group,
    Delete,
}

pub struct Command {
    pub id: CommandId,
    pub text: &'static str,
    pub shortcut: Option<(Modifiers, Key)>,
    pub shortcut_text: &'static str,
}

pub struct CommandRegistry {
    pub commands: Vec<Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let commands = vec![
            // File Menu
            Command {
                id: CommandId::Save,
                text: "Save",
                shortcut: Some((Modifiers::COMMAND, Key::S)),
                shortcut_text: "Ctrl+S",
            },
            Command {
                id: CommandId::Reload,
                text: "Reload",
                shortcut: Some((Modifiers::COMMAND, Key::R)),
                shortcut_text: "Ctrl+R",
            },
            Command {
                id: CommandId::ResetDiagram,
                text: "Reset Diagram",
                shortcut: None,
                shortcut_text: "",
            },
            Command {
                id: CommandId::Quit,
                text: "Quit",
                shortcut: Some((Modifiers::COMMAND, Key::Q)),
                shortcut_text: "Ctrl+Q",
            },
            // Edit Menu
            Command {
                id: CommandId::AddNode,
                text: "Add Node",
                shortcut: Some((Modifiers::COMMAND, Key::N)),
                shortcut_text: "Ctrl+N",
            },
            Command {
                id: CommandId::Undo,
                text: "Undo",
                shortcut: Some((Modifiers::COMMAND, Key::Z)),
                shortcut_text: "Ctrl+Z",
            },
            Command {
                id: CommandId::Redo,
                text: "Redo",
                shortcut: Some((Modifiers::COMMAND | Modifiers::SHIFT, Key::Z)),
                shortcut_text: "Ctrl+Shift+Z",
            },
            Command {
                id: CommandId::Group,
                text: "Group Selected",
                shortcut: Some((Modifiers::COMMAND, Key::G)),
                shortcut_text: "Ctrl+G",
            },
            // The canvas handles Del/Backspace itself; this entry is for the menu.
            Command {
                id: CommandId::Delete,
                text: "Delete",
                shortcut: None,
                shortcut_text: "Del",
            },
        ];
        Self { commands }
    }

    pub fn find(&self, id: CommandId) -> Option<&Command> {
        self.commands.iter().find(|&cmd| cmd.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn shortcuts_are_unique() {
        let registry = CommandRegistry::new();
        let mut seen = HashSet::new();
        for cmd in &registry.commands {
            if let Some(shortcut) = cmd.shortcut {
                assert!(seen.insert(shortcut), "{:?} reuses a shortcut", cmd.id);
            }
        }
    }

    #[test]
    fn add_node_is_ctrl_n() {
        let registry = CommandRegistry::new();
        let cmd = registry.find(CommandId::AddNode).unwrap();
        assert_eq!(cmd.shortcut, Some((Modifiers::COMMAND, Key::N)));
    }
}
