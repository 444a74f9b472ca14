pub mod error;
mod guard;
pub mod navigation;
pub mod workflow;

pub use error::WorkflowError;
pub use workflow::{DetectOutcome, DetectionWorkflow};
