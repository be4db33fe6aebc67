use crossbeam_channel::Receiver;
use diagram_library::{DiagramStore, StoreEvent};
use eframe::egui;
use egui_diagram::{DiagramEditorState, DiagramTheme};
use log::{debug, error, info, warn};

use crate::command::{CommandId, CommandRegistry};
use crate::config::{AppConfig, save_config};
use crate::error::AppError;
use crate::history::HistoryManager;
use crate::persistence::{
    FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, load_diagram, load_snapshot,
    save_diagram,
};
use crate::shortcut::ShortcutManager;
use crate::ui::diagram::diagram_panel;
use crate::ui::inspector::inspector_panel;
use crate::ui::menu::{menu_bar, toolbar};
use crate::ui::theme::{apply_theme, diagram_theme};
use crate::utils;

pub struct DiagramApp {
    store: DiagramStore,
    events: Receiver<StoreEvent>,
    kv: Box<dyn KeyValueStore>,
    history: HistoryManager,
    editor_state: DiagramEditorState,
    theme: DiagramTheme,
    config: AppConfig,
    shortcut_manager: ShortcutManager,
    command_registry: CommandRegistry,
    status: String,
    /// Changes since the last save or load.
    dirty: bool,
}

fn open_key_value_store(config: &AppConfig) -> Result<Box<dyn KeyValueStore>, AppError> {
    let kv = match &config.data_dir {
        Some(dir) => FileKeyValueStore::new(dir),
        None => FileKeyValueStore::in_data_dir()?,
    };
    Ok(Box::new(kv))
}

impl DiagramApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        apply_theme(&cc.egui_ctx, &config);
        utils::setup_fonts(&cc.egui_ctx, config.font_path.as_deref());

        let kv = match open_key_value_store(&config) {
            Ok(kv) => kv,
            Err(e) => {
                warn!("No storage directory ({}), diagram will not be persisted", e);
                Box::new(MemoryKeyValueStore::new())
            }
        };
        let app = Self::with_storage(config, kv);
        cc.egui_ctx.request_repaint();
        app
    }

    /// Builds the app around `kv`, loading whatever diagram it holds. A corrupt
    /// saved diagram is reported and replaced by the default dataset.
    pub fn with_storage(config: AppConfig, kv: Box<dyn KeyValueStore>) -> Self {
        let (mut store, status) = match load_diagram(kv.as_ref()) {
            Ok(store) => (store, "Ready".to_string()),
            Err(e) => {
                error!("Failed to load saved diagram: {}", e);
                (
                    DiagramStore::with_default_dataset(),
                    format!("Could not load saved diagram: {}", e),
                )
            }
        };
        let events = store.subscribe();
        let mut history = HistoryManager::new();
        history.reset(store.serialize());

        Self {
            store,
            events,
            kv,
            history,
            editor_state: DiagramEditorState::new(),
            theme: diagram_theme(&config),
            config,
            shortcut_manager: ShortcutManager::new(),
            command_registry: CommandRegistry::new(),
            status,
            dirty: false,
        }
    }

    pub fn store(&self) -> &DiagramStore {
        &self.store
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Records the current store contents as one undoable step.
    fn commit(&mut self) {
        self.history.push_state(self.store.serialize());
    }

    fn save(&mut self) {
        match save_diagram(&self.store, self.kv.as_mut()) {
            Ok(()) => {
                self.dirty = false;
                self.status = "Saved".to_string();
            }
            Err(e) => {
                error!("Failed to save diagram: {}", e);
                self.status = format!("Save failed: {}", e);
            }
        }
    }

    /// Replaces the store contents with the saved diagram. The store instance
    /// and its subscribers are kept.
    fn reload(&mut self) {
        match load_snapshot(self.kv.as_ref()) {
            Ok(Some(snapshot)) => {
                self.store.restore(snapshot);
                self.history.reset(self.store.serialize());
                self.dirty = false;
                info!("Reloaded diagram from storage");
                self.status = "Reloaded".to_string();
            }
            Ok(None) => {
                self.status = "Nothing saved yet".to_string();
            }
            Err(e) => {
                error!("Failed to reload diagram: {}", e);
                self.status = format!("Reload failed: {}", e);
            }
        }
    }

    /// Nodes targeted by Group/Delete: the canvas multi-selection, or the
    /// store selection when the canvas has none.
    fn selected_keys(&self) -> Vec<String> {
        if self.editor_state.selected_nodes.is_empty() {
            self.store
                .selection()
                .key()
                .map(|k| vec![k.to_string()])
                .unwrap_or_default()
        } else {
            self.editor_state.selected_nodes.iter().cloned().collect()
        }
    }

    pub fn execute(&mut self, ctx: &egui::Context, action: CommandId) {
        debug!("Executing {:?}", action);
        match action {
            CommandId::Save => self.save(),
            CommandId::Reload => self.reload(),
            CommandId::ResetDiagram => {
                self.store.restore(DiagramStore::default_snapshot());
                self.commit();
                self.dirty = true;
                info!("Diagram reset to the default dataset");
                self.status = "Diagram reset".to_string();
            }
            CommandId::Quit => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            CommandId::AddNode => {
                let key = self.store.add_node();
                self.store.select(Some(&key));
                self.commit();
                self.status = format!("Added {}", key);
            }
            CommandId::Undo => match self.history.undo() {
                Some(snapshot) => {
                    self.store.restore(snapshot);
                    self.dirty = true;
                    self.status = "Undo".to_string();
                }
                None => self.status = "Nothing to undo".to_string(),
            },
            CommandId::Redo => match self.history.redo() {
                Some(snapshot) => {
                    self.store.restore(snapshot);
                    self.dirty = true;
                    self.status = "Redo".to_string();
                }
                None => self.status = "Nothing to redo".to_string(),
            },
            CommandId::Group => {
                let keys = self.selected_keys();
                match self.store.group_nodes(&keys) {
                    Some(group) => {
                        self.commit();
                        self.status = format!("Created {}", group);
                    }
                    None => self.status = "Select nodes to group".to_string(),
                }
            }
            CommandId::Delete => {
                let links: Vec<i64> = self.editor_state.selected_links.iter().copied().collect();
                let keys = self.selected_keys();
                let mut removed = 0;
                for key in links {
                    if self.store.remove_link(key) {
                        removed += 1;
                    }
                }
                for key in &keys {
                    if self.store.remove_node(key) {
                        removed += 1;
                    }
                }
                if removed > 0 {
                    self.commit();
                    self.status = format!("Deleted {} item(s)", removed);
                }
            }
        }
    }

    /// Applies what the store reported since the last frame to the UI state.
    fn drain_events(&mut self) {
        for event in self.events.try_iter() {
            match event {
                StoreEvent::Restored => self.editor_state.reset_interaction(),
                StoreEvent::NodeRemoved(key) => {
                    self.editor_state.selected_nodes.remove(&key);
                    self.dirty = true;
                }
                StoreEvent::LinkRemoved(key) => {
                    self.editor_state.selected_links.remove(&key);
                    self.dirty = true;
                }
                StoreEvent::SelectionChanged(_) => {}
                _ => self.dirty = true,
            }
        }
    }

    /// Saves the diagram when configured to, and the window size if it changed.
    fn on_close_requested(&mut self, ctx: &egui::Context) {
        if self.config.save_on_exit && self.dirty {
            info!("Saving diagram on exit");
            self.save();
        }
        let size = ctx.input(|i| i.viewport().inner_rect.map(|r| [r.width(), r.height()]));
        if let Some(size) = size {
            if self.config.remember_window_size(size) {
                save_config(&self.config);
            }
        }
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(format!("Nodes: {}", self.store.nodes().len()));
            ui.separator();
            ui.label(format!("Links: {}", self.store.links().len()));
            ui.separator();
            ui.label(&self.status);
            if self.dirty {
                ui.separator();
                ui.weak("Unsaved changes");
            }
        });
    }
}

impl eframe::App for DiagramApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // --- Collect Inputs ---
        let mut triggered_action: Option<CommandId> =
            self.shortcut_manager.handle_shortcuts(ctx, &self.command_registry);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            menu_bar(ui, &self.command_registry, &mut triggered_action);
            ui.separator();
            toolbar(
                ui,
                &self.command_registry,
                self.history.can_undo(),
                self.history.can_redo(),
                &mut triggered_action,
            );
        });

        // --- Deferred Action Execution ---
        if let Some(action) = triggered_action {
            self.execute(ctx, action);
            ctx.request_repaint();
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.status_bar(ui);
        });

        egui::SidePanel::right("inspector")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                let commands = inspector_panel(ui, &self.store);
                let mut changed = false;
                for command in commands {
                    changed |= self.store.apply_to_selection(command);
                }
                if changed {
                    self.commit();
                }
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if diagram_panel(ui, &mut self.store, &mut self.editor_state, &self.theme) {
                    self.commit();
                }
            });

        self.drain_events();

        if ctx.input(|i| i.viewport().close_requested()) {
            self.on_close_requested(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::STORAGE_KEY;

    fn app_with(kv: MemoryKeyValueStore) -> DiagramApp {
        DiagramApp::with_storage(AppConfig::default(), Box::new(kv))
    }

    #[test]
    fn corrupt_storage_falls_back_to_default_dataset() {
        let mut kv = MemoryKeyValueStore::new();
        kv.set(STORAGE_KEY, "[1, 2").unwrap();
        let app = app_with(kv);
        assert_eq!(app.store().serialize(), DiagramStore::default_snapshot());
        assert!(app.status().starts_with("Could not load"));
    }

    #[test]
    fn add_then_undo_then_redo() {
        let ctx = egui::Context::default();
        let mut app = app_with(MemoryKeyValueStore::new());

        app.execute(&ctx, CommandId::AddNode);
        assert!(app.store().contains_node("Node1"));
        assert_eq!(app.store().selection().key(), Some("Node1"));

        app.execute(&ctx, CommandId::Undo);
        assert!(!app.store().contains_node("Node1"));
        assert_eq!(app.store().selection().key(), None);

        app.execute(&ctx, CommandId::Redo);
        assert!(app.store().contains_node("Node1"));
    }

    #[test]
    fn save_then_reload_restores_saved_state() {
        let ctx = egui::Context::default();
        let mut app = app_with(MemoryKeyValueStore::new());

        app.execute(&ctx, CommandId::AddNode);
        app.execute(&ctx, CommandId::Save);
        app.execute(&ctx, CommandId::AddNode);
        assert_eq!(app.store().nodes().len(), 4);

        app.execute(&ctx, CommandId::Reload);
        assert_eq!(app.store().nodes().len(), 3);
        assert!(!app.history.can_undo());
        assert_eq!(app.store().key_counter(), 1);
    }

    #[test]
    fn reload_keeps_subscriptions_alive() {
        let ctx = egui::Context::default();
        let mut app = app_with(MemoryKeyValueStore::new());
        app.execute(&ctx, CommandId::Save);
        app.execute(&ctx, CommandId::Reload);
        assert!(app.events.try_iter().any(|e| e == StoreEvent::Restored));
    }

    #[test]
    fn delete_removes_selected_node_and_keeps_links() {
        let ctx = egui::Context::default();
        let mut app = app_with(MemoryKeyValueStore::new());
        app.store.select(Some("A"));
        app.execute(&ctx, CommandId::Delete);
        assert!(!app.store().contains_node("A"));
        assert_eq!(app.store().links().len(), 1);

        app.drain_events();
        assert!(app.dirty);
    }

    #[test]
    fn group_uses_canvas_multi_selection() {
        let ctx = egui::Context::default();
        let mut app = app_with(MemoryKeyValueStore::new());
        app.editor_state.selected_nodes.insert("A".to_string());
        app.editor_state.selected_nodes.insert("B".to_string());
        app.execute(&ctx, CommandId::Group);

        let groups: Vec<_> = app.store().nodes().iter().filter(|n| n.is_group).collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(app.store().group_members(&groups[0].key).len(), 2);
    }

    fn saved_app() -> (egui::Context, DiagramApp) {
        let ctx = egui::Context::default();
        let mut app = app_with(MemoryKeyValueStore::new());
        app.execute(&ctx, CommandId::AddNode);
        app.drain_events();
        app.execute(&ctx, CommandId::Save);
        app.drain_events();
        assert!(!app.dirty);
        (ctx, app)
    }

    #[test]
    fn reset_marks_document_unsaved() {
        let (ctx, mut app) = saved_app();
        app.execute(&ctx, CommandId::ResetDiagram);
        app.drain_events();
        assert_eq!(app.store().nodes().len(), 2);
        assert!(app.dirty);
    }

    #[test]
    fn undo_marks_document_unsaved() {
        let (ctx, mut app) = saved_app();
        app.execute(&ctx, CommandId::Undo);
        app.drain_events();
        assert_eq!(app.store().nodes().len(), 2);
        assert!(app.dirty);
    }

    #[test]
    fn redo_marks_document_unsaved() {
        let (ctx, mut app) = saved_app();
        app.execute(&ctx, CommandId::Undo);
        app.execute(&ctx, CommandId::Save);
        app.drain_events();
        assert!(!app.dirty);

        app.execute(&ctx, CommandId::Redo);
        app.drain_events();
        assert_eq!(app.store().nodes().len(), 3);
        assert!(app.dirty);
    }

    #[test]
    fn reload_leaves_document_clean() {
        let (ctx, mut app) = saved_app();
        app.execute(&ctx, CommandId::ResetDiagram);
        app.execute(&ctx, CommandId::Reload);
        app.drain_events();
        assert_eq!(app.store().nodes().len(), 3);
        assert!(!app.dirty);
    }
}
