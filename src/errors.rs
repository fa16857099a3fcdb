use thiserror::Error;

use crate::store::StoreError;
use crate::tasks::TaskStatus;

/// Errors returned synchronously by engine operations.
///
/// Every variant is raised before any state is written, so a caller that
/// receives one of these can assume the project is exactly as it was.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    #[error("Hand-off out of order: member {member_id} is not active (active stage is {current_stage})")]
    OutOfOrder {
        member_id: String,
        current_stage: usize,
    },

    #[error("Project {project_id} is completed; no further hand-offs are accepted")]
    TerminalState { project_id: String },

    #[error("Invalid task transition: {from} -> {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    #[error("Permission denied: {actor} may not {action}")]
    PermissionDenied { actor: String, action: &'static str },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Persistence error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn validation(reason: impl Into<String>) -> Self {
        EngineError::Validation {
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Short machine-friendly label, used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Validation { .. } => "validation",
            EngineError::OutOfOrder { .. } => "out_of_order",
            EngineError::TerminalState { .. } => "terminal_state",
            EngineError::InvalidTransition { .. } => "invalid_transition",
            EngineError::PermissionDenied { .. } => "permission_denied",
            EngineError::NotFound { .. } => "not_found",
            EngineError::Store(_) => "store",
        }
    }
}
