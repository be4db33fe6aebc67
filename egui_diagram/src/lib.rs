//! egui canvas for box-and-arrow diagrams.
//!
//! The widget owns no diagram data. Implement [`DiagramDataSource`] to feed it
//! nodes and links each frame and [`DiagramMutator`] to receive the edits it
//! collects in [`PendingActions`].

pub mod color;
pub mod drawing;
mod interactions;
mod node_rendering;
pub mod state;
pub mod theme;
pub mod traits;
pub mod types;
pub mod widget;

pub use state::DiagramEditorState;
pub use theme::DiagramTheme;
pub use traits::{DiagramDataSource, DiagramMutator};
pub use types::*;
pub use widget::{DiagramWidget, PendingActions};
