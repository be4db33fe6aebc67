//! Change notifications broadcast by the store.

use crossbeam_channel::{Receiver, Sender};

use crate::model::NodeField;

#[derive(Clone, Debug, PartialEq)]
pub enum StoreEvent {
    NodeAdded(String),
    NodeRemoved(String),
    NodeChanged { key: String, field: NodeField },
    LinkAdded(i64),
    LinkRemoved(i64),
    GroupCreated(String),
    SelectionChanged(Option<String>),
    /// Both collections were replaced wholesale.
    Restored,
}

/// Fan-out of store events to any number of subscribers.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Sender<StoreEvent>>,
}

impl EventBus {
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Sends to every live subscriber and drops the disconnected ones.
    pub fn emit(&mut self, event: StoreEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
