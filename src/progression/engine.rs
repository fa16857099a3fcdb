use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::elapsed_days;
use crate::errors::EngineError;
use crate::pod::{Member, Project, ProjectStatus};

/// What a successful hand-off did to the project.
#[derive(Debug, Clone, PartialEq)]
pub enum HandoffOutcome {
    /// The baton moved to the next member in line.
    Advanced {
        completed_member: Member,
        next_member: Member,
        /// Index of the newly active member
        stage: usize,
    },
    /// The last member handed off and the project is now completed.
    Finished { completed_member: Member },
    /// An already completed member replaced their link; nothing else changed.
    LinkUpdated { member: Member },
}

impl HandoffOutcome {
    /// Member who should hear about this hand-off, if anyone.
    pub fn recipient(&self) -> Option<&Member> {
        match self {
            HandoffOutcome::Advanced { next_member, .. } => Some(next_member),
            _ => None,
        }
    }
}

/// Apply a hand-off submission to `project`.
///
/// All checks run before the first write, so on error `project` is untouched.
pub fn submit_handoff(
    project: &mut Project,
    member_id: &str,
    link: &str,
    now: DateTime<Utc>,
) -> Result<HandoffOutcome, EngineError> {
    let link = link.trim();
    if link.is_empty() {
        return Err(EngineError::validation("hand-off link must not be empty"));
    }

    match project.status {
        ProjectStatus::Completed => {
            return Err(EngineError::TerminalState {
                project_id: project.id.clone(),
            })
        }
        ProjectStatus::Planning => {
            return Err(EngineError::validation(format!(
                "project {} has not been launched",
                project.id
            )))
        }
        ProjectStatus::InProgress => {}
    }

    let index = project
        .member_index(member_id)
        .ok_or_else(|| EngineError::not_found("member", member_id))?;

    let member = &project.members[index];
    if member.has_handed_off() {
        // a link is only ever recorded together with completion
        if !member.completed || index >= project.current_stage {
            return Err(EngineError::validation(format!(
                "member {member_id} has a hand-off link but has not completed; project state is inconsistent"
            )));
        }
    }

    let is_edit = index < project.current_stage && member.has_handed_off();
    let is_active = index == project.current_stage && !member.has_handed_off();

    if is_edit {
        let member = &mut project.members[index];
        member.handoff_link = link.to_string();
        debug!(
            project_id = %project.id,
            member_id = %member_id,
            "Hand-off link updated in place"
        );
        return Ok(HandoffOutcome::LinkUpdated {
            member: member.clone(),
        });
    }

    if !is_active {
        return Err(EngineError::OutOfOrder {
            member_id: member_id.to_string(),
            current_stage: project.current_stage,
        });
    }

    let completed_member = {
        let member = &mut project.members[index];
        member.handoff_link = link.to_string();
        member.completed = true;
        member.work_completed_at = Some(now);
        if let Some(started) = member.work_started_at {
            member.actual_time_spent = member.actual_time_spent.max(elapsed_days(started, now));
        }
        member.clone()
    };

    let next_index = index + 1;
    project.current_stage = next_index;

    match project.members.get_mut(next_index) {
        Some(next) => {
            next.work_started_at = Some(now);
            let next_member = next.clone();

            info!(
                project_id = %project.id,
                from_member = %completed_member.id,
                to_member = %next_member.id,
                stage = next_index,
                "Hand-off advanced project"
            );

            Ok(HandoffOutcome::Advanced {
                completed_member,
                next_member,
                stage: next_index,
            })
        }
        None => {
            project.status = ProjectStatus::Completed;

            info!(
                project_id = %project.id,
                member_id = %completed_member.id,
                "Final hand-off completed project"
            );

            Ok(HandoffOutcome::Finished { completed_member })
        }
    }
}
