pub mod command;
pub mod link;
pub mod node;
pub mod point;
pub mod snapshot;

pub use command::{NodeField, PropertyCommand};
pub use link::{LinkRecord, PortId};
pub use node::NodeRecord;
pub use point::{Bounds, Point};
pub use snapshot::PersistedSnapshot;
