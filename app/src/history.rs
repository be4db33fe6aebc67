use diagram_library::PersistedSnapshot;

/// Snapshot-based undo/redo. The top of the undo stack is always the current
/// document state.
#[derive(Default)]
pub struct HistoryManager {
    undo_stack: Vec<PersistedSnapshot>,
    redo_stack: Vec<PersistedSnapshot>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts over with `initial` as the only state.
    pub fn reset(&mut self, initial: PersistedSnapshot) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undo_stack.push(initial);
    }

    /// Records a committed change. Clears the redo stack. Pushing a state equal
    /// to the current one is ignored.
    pub fn push_state(&mut self, snapshot: PersistedSnapshot) {
        if self.undo_stack.last() == Some(&snapshot) {
            return;
        }
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();
    }

    /// Pops the current state onto the redo stack and returns the state before
    /// it. The initial state cannot be undone.
    pub fn undo(&mut self) -> Option<PersistedSnapshot> {
        if self.undo_stack.len() <= 1 {
            return None;
        }
        let current = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        self.undo_stack.last().cloned()
    }

    /// Pops from the redo stack, makes it current and returns it.
    pub fn redo(&mut self) -> Option<PersistedSnapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(next.clone());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagram_library::DiagramStore;

    fn snapshot_with(n: usize) -> PersistedSnapshot {
        let mut store = DiagramStore::new();
        for _ in 0..n {
            store.add_node();
        }
        store.serialize()
    }

    #[test]
    fn undo_then_redo_walks_the_stack() {
        let mut history = HistoryManager::new();
        history.reset(snapshot_with(0));
        history.push_state(snapshot_with(1));
        history.push_state(snapshot_with(2));

        assert_eq!(history.undo(), Some(snapshot_with(1)));
        assert_eq!(history.undo(), Some(snapshot_with(0)));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(snapshot_with(1)));
        assert!(history.can_redo());
    }

    #[test]
    fn new_change_discards_redo() {
        let mut history = HistoryManager::new();
        history.reset(snapshot_with(0));
        history.push_state(snapshot_with(1));
        history.undo();
        history.push_state(snapshot_with(3));
        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn unchanged_state_is_not_recorded() {
        let mut history = HistoryManager::new();
        history.reset(snapshot_with(1));
        history.push_state(snapshot_with(1));
        assert!(!history.can_undo());
    }
}
