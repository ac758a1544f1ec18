//! Pipeline board controller: the kanban view of deals grouped by stage.
//!
//! The controller owns the in-memory board state, the drag session, and the
//! stage transition workflow. All server interaction goes through the
//! injected [`platform_records::RecordStore`]; the UI update model is
//! pessimistic: the board changes only after the server round-trip
//! succeeds.

pub mod controller;
pub mod drag;
pub mod notify;
pub mod state;

pub use controller::{ContactDetail, LoadError, PipelineController, StageMoveError};
pub use drag::DragSession;
pub use notify::{BufferedNotifier, Notice, Notifier};
pub use state::BoardState;
