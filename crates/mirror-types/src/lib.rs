pub mod types;

pub use types::{
    AppEvent, DetectionResult, Mood, ParseMoodError, Route, ServiceHealth, TransitionState,
    WorkflowSnapshot, WorkflowStatus, MANUAL_SOURCE,
};
