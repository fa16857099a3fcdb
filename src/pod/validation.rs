use std::collections::HashSet;

use thiserror::Error;

use super::types::{Project, ProjectStatus};

/// A broken data-model invariant found on a project snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("current stage {current_stage} exceeds member count {member_count}")]
    StageOutOfBounds {
        current_stage: usize,
        member_count: usize,
    },

    #[error("current stage points past the last member but status is {status}")]
    ExhaustedButNotCompleted { status: ProjectStatus },

    #[error("project is completed but current stage is {current_stage} of {member_count}")]
    CompletedButNotExhausted {
        current_stage: usize,
        member_count: usize,
    },

    #[error("member {member_id} at index {index} precedes the active stage but is not completed")]
    IncompleteBeforeActive { member_id: String, index: usize },

    #[error("member {member_id} at index {index} is after the active stage but has started work")]
    StartedAfterActive { member_id: String, index: usize },

    #[error("member {member_id}: completed flag and completion timestamp disagree")]
    CompletionMismatch { member_id: String },

    #[error("member {member_id} is completed without a hand-off link")]
    CompletedWithoutLink { member_id: String },

    #[error("member {member_id} has a hand-off link but is not completed")]
    LinkWithoutCompletion { member_id: String },

    #[error("duplicate member id {member_id}")]
    DuplicateMemberId { member_id: String },

    #[error("task {task_id} is assigned to unknown member {member_id}")]
    TaskAssigneeMissing { task_id: String, member_id: String },
}

impl Project {
    /// Check every data-model invariant, collecting all violations.
    pub fn validate(&self) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();
        let member_count = self.members.len();

        if self.current_stage > member_count {
            violations.push(InvariantViolation::StageOutOfBounds {
                current_stage: self.current_stage,
                member_count,
            });
        }

        if self.current_stage == member_count && self.status != ProjectStatus::Completed {
            violations.push(InvariantViolation::ExhaustedButNotCompleted {
                status: self.status,
            });
        }

        if self.status == ProjectStatus::Completed && self.current_stage != member_count {
            violations.push(InvariantViolation::CompletedButNotExhausted {
                current_stage: self.current_stage,
                member_count,
            });
        }

        let mut seen = HashSet::new();
        for (index, member) in self.members.iter().enumerate() {
            if !seen.insert(member.id.as_str()) {
                violations.push(InvariantViolation::DuplicateMemberId {
                    member_id: member.id.clone(),
                });
            }

            if member.completed != member.work_completed_at.is_some() {
                violations.push(InvariantViolation::CompletionMismatch {
                    member_id: member.id.clone(),
                });
            }

            if member.completed && !member.has_handed_off() {
                violations.push(InvariantViolation::CompletedWithoutLink {
                    member_id: member.id.clone(),
                });
            }

            if !member.completed && member.has_handed_off() {
                violations.push(InvariantViolation::LinkWithoutCompletion {
                    member_id: member.id.clone(),
                });
            }

            if index < self.current_stage && !member.completed {
                violations.push(InvariantViolation::IncompleteBeforeActive {
                    member_id: member.id.clone(),
                    index,
                });
            }

            if index > self.current_stage && member.work_started_at.is_some() {
                violations.push(InvariantViolation::StartedAfterActive {
                    member_id: member.id.clone(),
                    index,
                });
            }
        }

        for task in &self.tasks {
            if !seen.contains(task.assigned_to.as_str()) {
                violations.push(InvariantViolation::TaskAssigneeMissing {
                    task_id: task.id.clone(),
                    member_id: task.assigned_to.clone(),
                });
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pod::test_support::three_member_project;
    use chrono::Utc;

    #[test]
    fn test_fresh_project_is_valid() {
        let project = three_member_project(Utc::now());
        assert_eq!(project.validate(), Ok(()));
    }

    #[test]
    fn test_incomplete_member_behind_pointer_is_reported() {
        let mut project = three_member_project(Utc::now());
        project.current_stage = 1;

        let violations = project.validate().unwrap_err();
        assert!(violations.contains(&InvariantViolation::IncompleteBeforeActive {
            member_id: "m1".to_string(),
            index: 0,
        }));
    }

    #[test]
    fn test_started_member_after_pointer_is_reported() {
        let mut project = three_member_project(Utc::now());
        project.members[2].work_started_at = Some(Utc::now());

        let violations = project.validate().unwrap_err();
        assert_eq!(
            violations,
            vec![InvariantViolation::StartedAfterActive {
                member_id: "m3".to_string(),
                index: 2,
            }]
        );
    }

    #[test]
    fn test_exhausted_pointer_requires_completed_status() {
        let mut project = three_member_project(Utc::now());
        project.current_stage = 3;
        for member in &mut project.members {
            member.completed = true;
            member.work_completed_at = Some(Utc::now());
            member.handoff_link = "https://example.com".to_string();
        }

        let violations = project.validate().unwrap_err();
        assert_eq!(
            violations,
            vec![InvariantViolation::ExhaustedButNotCompleted {
                status: ProjectStatus::InProgress
            }]
        );

        project.status = ProjectStatus::Completed;
        assert_eq!(project.validate(), Ok(()));
    }

    #[test]
    fn test_completion_flag_and_timestamp_must_agree() {
        let mut project = three_member_project(Utc::now());
        project.members[0].work_completed_at = Some(Utc::now());

        let violations = project.validate().unwrap_err();
        assert!(violations.contains(&InvariantViolation::CompletionMismatch {
            member_id: "m1".to_string()
        }));
    }

    #[test]
    fn test_link_requires_completion() {
        let mut project = three_member_project(Utc::now());
        project.members[0].handoff_link = "https://docs.test/prd".to_string();

        assert_eq!(
            project.validate(),
            Err(vec![InvariantViolation::LinkWithoutCompletion {
                member_id: "m1".to_string()
            }])
        );
    }
}
