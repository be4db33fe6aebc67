//! Single-node selection state.

/// At most one node is selected at a time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    NoSelection,
    NodeSelected(String),
}

/// Raised when the selected node actually changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionChanged {
    pub previous: Option<String>,
    pub current: Option<String>,
}

impl Selection {
    pub fn key(&self) -> Option<&str> {
        match self {
            Selection::NoSelection => None,
            Selection::NodeSelected(key) => Some(key),
        }
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.key() == Some(key)
    }

    /// Moves to `NodeSelected(key)` or `NoSelection`. Returns a change only
    /// when the state differs from before.
    pub fn select(&mut self, key: Option<String>) -> Option<SelectionChanged> {
        let next = match key {
            Some(k) => Selection::NodeSelected(k),
            None => Selection::NoSelection,
        };
        if *self == next {
            return None;
        }
        let previous = self.key().map(str::to_string);
        *self = next;
        Some(SelectionChanged {
            previous,
            current: self.key().map(str::to_string),
        })
    }

    pub fn clear(&mut self) -> Option<SelectionChanged> {
        self.select(None)
    }
}
