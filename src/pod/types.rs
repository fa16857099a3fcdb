// Core types for POD project state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tasks::Task;

/// Overall lifecycle of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    /// Draft; the workflow definition may still be edited
    Planning,
    InProgress,
    /// Terminal; every member has handed off
    Completed,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Planning => write!(f, "planning"),
            ProjectStatus::InProgress => write!(f, "in-progress"),
            ProjectStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectTag {
    Feature,
    #[serde(rename = "Go-Live")]
    GoLive,
}

impl std::str::FromStr for ProjectTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "feature" => Ok(ProjectTag::Feature),
            "go-live" | "golive" => Ok(ProjectTag::GoLive),
            other => Err(format!("unknown tag '{other}' (expected Feature or Go-Live)")),
        }
    }
}

/// Lifecycle of a single member, derived from its timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberPhase {
    NotStarted,
    Active,
    Completed,
}

/// One stage assignment in the ordered member sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    /// Stage label this member is assigned to
    pub role: String,
    #[serde(default)]
    pub task_description: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    /// Artifact URL; empty until the first hand-off
    #[serde(default)]
    pub handoff_link: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub work_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub work_completed_at: Option<DateTime<Utc>>,
    /// Elapsed working time in fractional days
    #[serde(default)]
    pub actual_time_spent: f64,
}

impl Member {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
            task_description: None,
            start_date: None,
            end_date: None,
            handoff_link: String::new(),
            completed: false,
            work_started_at: None,
            work_completed_at: None,
            actual_time_spent: 0.0,
        }
    }

    pub fn phase(&self) -> MemberPhase {
        if self.completed {
            MemberPhase::Completed
        } else if self.work_started_at.is_some() {
            MemberPhase::Active
        } else {
            MemberPhase::NotStarted
        }
    }

    pub fn has_handed_off(&self) -> bool {
        !self.handoff_link.trim().is_empty()
    }

    /// Time spent rounded to one decimal day, as shown to people.
    pub fn rounded_time_spent(&self) -> f64 {
        crate::progression::round_days(self.actual_time_spent)
    }
}

/// The mutable aggregate for one hand-off workflow instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub tag: Option<ProjectTag>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    /// Ordered stage labels the members were arranged by
    #[serde(default)]
    pub workflow_order: Vec<String>,
    pub current_stage: usize,
    pub members: Vec<Member>,
    pub status: ProjectStatus,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Project {
    pub fn is_completed(&self) -> bool {
        self.status == ProjectStatus::Completed
    }

    pub fn member_index(&self, member_id: &str) -> Option<usize> {
        self.members.iter().position(|m| m.id == member_id)
    }

    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    /// The member currently holding the baton.
    ///
    /// Only the member exactly at `current_stage` can be active, even when
    /// several members share the same stage label.
    pub fn current_active_member(&self) -> Option<&Member> {
        if self.status != ProjectStatus::InProgress {
            return None;
        }
        self.members
            .get(self.current_stage)
            .filter(|member| !member.completed)
    }

    pub fn next_member(&self) -> Option<&Member> {
        if self.is_completed() {
            return None;
        }
        self.members.get(self.current_stage + 1)
    }

    pub fn completed_member_count(&self) -> usize {
        self.members.iter().filter(|m| m.completed).count()
    }

    /// Percentage of members that have handed off, rounded to a whole number.
    pub fn progress_percent(&self) -> u8 {
        if self.members.is_empty() {
            return 0;
        }
        let ratio = self.completed_member_count() as f64 / self.members.len() as f64;
        (ratio * 100.0).round() as u8
    }

    pub fn member_phase(&self, index: usize) -> Option<MemberPhase> {
        self.members.get(index).map(Member::phase)
    }

    /// Sum of recorded working time across members, in days.
    pub fn total_time_spent(&self) -> f64 {
        self.members.iter().map(|m| m.actual_time_spent).sum()
    }

    pub fn stage_label(&self) -> Option<&str> {
        self.members.get(self.current_stage).map(|m| m.role.as_str())
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn tasks_for_member<'a>(&'a self, member_id: &'a str) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks.iter().filter(move |t| t.assigned_to == member_id)
    }
}

/// Working time of a member in days, measured up to completion or `now`.
///
/// Unlike `actual_time_spent` this never depends on the sampler having run.
pub fn working_days(member: &Member, now: DateTime<Utc>) -> f64 {
    match member.work_started_at {
        Some(start) => {
            let end = member.work_completed_at.unwrap_or(now);
            crate::progression::elapsed_days(start, end)
        }
        None => 0.0,
    }
}
