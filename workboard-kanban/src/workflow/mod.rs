//! Workflow configuration and transition rules

mod graph;
mod registry;
mod validator;

pub use graph::{TransitionEdge, WorkflowGraph};
pub use registry::WorkflowRegistry;
pub use validator::StatusTransitionValidator;
