// Workflow definitions - stages, assignments and project creation

pub mod definition;

pub use definition::{MemberAssignment, ProjectDraft, WorkflowDefinition};
