//! Core model for the diagram editor.
//!
//! [`DiagramStore`] is the single source of truth for node and link records.
//! The rendering surface and the inspector both read from it and send their
//! edits back through it; [`StoreEvent`]s tell subscribers what changed.

pub mod error;
pub mod events;
pub mod key;
pub mod model;
pub mod routing;
pub mod selection;
pub mod store;

pub use error::LibraryError;
pub use events::StoreEvent;
pub use model::{
    Bounds, LinkRecord, NodeField, NodeRecord, PersistedSnapshot, Point, PortId, PropertyCommand,
};
pub use selection::Selection;
pub use store::DiagramStore;
