//! Plain state types shared by the controller and the renderer.

pub mod navigation;
pub mod pipeline;
pub mod status;

pub use navigation::{NavigationError, NavigationState, ViewMode};
pub use pipeline::{PipelinePhase, PipelineStatus, RunId};
pub use status::{StatusBarState, StatusTone};
