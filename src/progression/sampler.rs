use chrono::{DateTime, Utc};

use super::elapsed_days;
use crate::pod::Project;

/// A change to the active member's recorded working time.
#[derive(Debug, Clone, PartialEq)]
pub struct ElapsedUpdate {
    pub member_id: String,
    pub previous: f64,
    pub current: f64,
}

/// Recompute elapsed time of the active member.
///
/// Returns `None` when nothing changed: no active member, the member has not
/// started, or the value is already current. The recorded value never goes
/// down, so a clock stepping backwards leaves it alone.
pub fn sample_active_member(project: &mut Project, now: DateTime<Utc>) -> Option<ElapsedUpdate> {
    let index = project.current_active_member().map(|_| project.current_stage)?;
    let member = &mut project.members[index];
    let started = member.work_started_at?;

    let computed = elapsed_days(started, now);
    if computed <= member.actual_time_spent {
        return None;
    }

    let previous = member.actual_time_spent;
    member.actual_time_spent = computed;

    Some(ElapsedUpdate {
        member_id: member.id.clone(),
        previous,
        current: computed,
    })
}
