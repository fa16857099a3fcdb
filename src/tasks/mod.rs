// Task subsystem - auxiliary work items attached to members
//
// Tasks are informational. Nothing in here reads or writes the project's
// current stage, and no task state ever gates a hand-off.

pub mod lifecycle;
pub mod policy;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

pub use lifecycle::{attach_proof_link, create_task, update_task_status};
pub use policy::{
    can_create_task, can_edit_handoff, can_edit_task, ensure_allowed, Actor, ActorRole,
};

/// Status of a task.
///
/// Transitions only move forward:
/// - `Pending` → `InProgress`
/// - `InProgress` → `Completed`
/// - `Completed` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in-progress"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" | "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(format!("unknown task status '{other}'")),
        }
    }
}

impl TaskStatus {
    /// Check if moving from this status to `new_status` is allowed.
    ///
    /// Unlike stage statuses, re-applying the same status is not a no-op here:
    /// it would re-stamp `completed_at`, so it is rejected.
    pub fn can_transition_to(&self, new_status: TaskStatus) -> bool {
        matches!(
            (self, new_status),
            (TaskStatus::Pending, TaskStatus::InProgress)
                | (TaskStatus::InProgress, TaskStatus::Completed)
        )
    }

    pub fn try_transition(&self, new_status: TaskStatus) -> Result<TaskStatus, EngineError> {
        if self.can_transition_to(new_status) {
            Ok(new_status)
        } else {
            Err(EngineError::InvalidTransition {
                from: *self,
                to: new_status,
            })
        }
    }

    pub fn valid_transitions(&self) -> Vec<TaskStatus> {
        match self {
            TaskStatus::Pending => vec![TaskStatus::InProgress],
            TaskStatus::InProgress => vec![TaskStatus::Completed],
            TaskStatus::Completed => vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Member id
    pub assigned_to: String,
    /// Name of whoever created the task
    pub assigned_by: String,
    pub created_at: DateTime<Utc>,
    pub status: TaskStatus,
    /// Proof-of-work link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub assigned_to: String,
    pub assigned_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_only() {
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::InProgress));
        assert!(TaskStatus::InProgress.can_transition_to(TaskStatus::Completed));

        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
        assert!(!TaskStatus::InProgress.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::InProgress));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Completed));
    }

    #[test]
    fn test_try_transition_reports_both_ends() {
        match TaskStatus::Completed.try_transition(TaskStatus::Pending) {
            Err(EngineError::InvalidTransition { from, to }) => {
                assert_eq!(from, TaskStatus::Completed);
                assert_eq!(to, TaskStatus::Pending);
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_transitions_match_predicate() {
        for status in [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed] {
            for next in status.valid_transitions() {
                assert!(status.can_transition_to(next));
            }
        }
        assert!(TaskStatus::Completed.valid_transitions().is_empty());
    }

    #[test]
    fn test_status_parses_kebab_case() {
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert!("done".parse::<TaskStatus>().is_err());
    }
}
