pub mod adapter;

use diagram_library::DiagramStore;
use egui_diagram::{DiagramEditorState, DiagramTheme, DiagramWidget};
use log::warn;

use adapter::{StoreDataSource, StoreMutator};

/// Main diagram canvas. Returns whether the document changed this frame.
pub fn diagram_panel(
    ui: &mut egui::Ui,
    store: &mut DiagramStore,
    state: &mut DiagramEditorState,
    theme: &DiagramTheme,
) -> bool {
    let source = StoreDataSource { store: &*store };
    let mut widget = DiagramWidget::new(state, theme);
    let pending = widget.show(ui, &source);

    if pending.is_empty() {
        return false;
    }
    let changed = pending.changes_document();
    let mut mutator = StoreMutator { store };
    for error in pending.apply(&mut mutator) {
        warn!("Diagram edit rejected: {}", error);
    }
    changed
}
