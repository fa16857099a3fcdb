use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::EngineError;
use crate::pod::{Member, Project, ProjectStatus, ProjectTag};

/// A person assigned to a stage, before ordering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberAssignment {
    /// Generated when absent
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    /// Must be one of the definition's stages
    pub role: String,
    #[serde(default)]
    pub task_description: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

impl MemberAssignment {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Ordered stage names plus who works on each.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    pub stages: Vec<String>,
    pub assignments: Vec<MemberAssignment>,
}

impl WorkflowDefinition {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.stages.is_empty() {
            return Err(EngineError::validation("at least one workflow stage is required"));
        }

        let mut stage_names = HashSet::new();
        for stage in &self.stages {
            if stage.trim().is_empty() {
                return Err(EngineError::validation("stage names must not be blank"));
            }
            if !stage_names.insert(stage.as_str()) {
                return Err(EngineError::validation(format!("duplicate stage '{stage}'")));
            }
        }

        if self.assignments.is_empty() {
            return Err(EngineError::validation("at least one team member is required"));
        }

        let mut ids = HashSet::new();
        for assignment in &self.assignments {
            if assignment.name.trim().is_empty() {
                return Err(EngineError::validation("member name must not be blank"));
            }
            if !stage_names.contains(assignment.role.as_str()) {
                return Err(EngineError::validation(format!(
                    "member {} has role '{}' which is not a workflow stage",
                    assignment.name, assignment.role
                )));
            }
            if let Some(id) = &assignment.id {
                if !ids.insert(id.as_str()) {
                    return Err(EngineError::validation(format!("duplicate member id '{id}'")));
                }
            }
            check_dates(assignment.start_date, assignment.end_date)?;
        }

        let missing: Vec<&str> = self
            .stages
            .iter()
            .filter(|stage| !self.assignments.iter().any(|a| &a.role == *stage))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::validation(format!(
                "missing team members for: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }

    /// Lay members out stage by stage, keeping submission order within a stage.
    pub fn ordered_members(&self) -> Vec<Member> {
        let mut taken: HashSet<String> = self
            .assignments
            .iter()
            .filter_map(|a| a.id.clone())
            .collect();
        let mut counter = 0usize;

        let mut members = Vec::with_capacity(self.assignments.len());
        for stage in &self.stages {
            for assignment in self.assignments.iter().filter(|a| &a.role == stage) {
                let id = match &assignment.id {
                    Some(id) => id.clone(),
                    None => loop {
                        counter += 1;
                        let candidate = format!("m{counter}");
                        if taken.insert(candidate.clone()) {
                            break candidate;
                        }
                    },
                };

                let mut member = Member::new(id, assignment.name.trim(), stage.clone());
                member.task_description = assignment.task_description.clone();
                member.start_date = assignment.start_date;
                member.end_date = assignment.end_date;
                members.push(member);
            }
        }
        members
    }
}

/// Everything needed to create a project.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub tag: Option<ProjectTag>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    pub definition: WorkflowDefinition,
}

impl ProjectDraft {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.name.trim().is_empty() {
            return Err(EngineError::validation("project name is required"));
        }
        check_dates(self.start_date, self.end_date)?;
        self.definition.validate()
    }
}

fn check_dates(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<(), EngineError> {
    match (start, end) {
        (Some(start), Some(end)) if start >= end => {
            Err(EngineError::validation("end date must be after start date"))
        }
        _ => Ok(()),
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Project {
    /// Build a project from a draft, either as a planning draft or launched.
    pub fn from_draft(
        draft: ProjectDraft,
        id: impl Into<String>,
        now: DateTime<Utc>,
        launch: bool,
    ) -> Result<Project, EngineError> {
        draft.validate()?;

        let mut project = Project {
            id: id.into(),
            name: draft.name.trim().to_string(),
            description: trimmed(&draft.description),
            owner: trimmed(&draft.owner),
            tag: draft.tag,
            created_at: now,
            start_date: draft.start_date,
            end_date: draft.end_date,
            workflow_order: draft.definition.stages.clone(),
            current_stage: 0,
            members: draft.definition.ordered_members(),
            status: ProjectStatus::Planning,
            tasks: Vec::new(),
        };

        if launch {
            project.launch(now)?;
        }
        Ok(project)
    }

    /// Start the workflow: the first member becomes active.
    pub fn launch(&mut self, now: DateTime<Utc>) -> Result<(), EngineError> {
        match self.status {
            ProjectStatus::Planning => {}
            ProjectStatus::InProgress => {
                return Err(EngineError::validation(format!(
                    "project {} is already in progress",
                    self.id
                )))
            }
            ProjectStatus::Completed => {
                return Err(EngineError::TerminalState {
                    project_id: self.id.clone(),
                })
            }
        }

        let first = self
            .members
            .first_mut()
            .ok_or_else(|| EngineError::validation("cannot launch a project without members"))?;
        first.work_started_at = Some(now);
        self.current_stage = 0;
        self.status = ProjectStatus::InProgress;

        info!(project_id = %self.id, first_member = %first.id, "Project launched");
        Ok(())
    }

    /// Administrative edit of a project that has not been launched yet.
    ///
    /// Tasks assigned to members that no longer exist are dropped.
    pub fn replace_definition(&mut self, draft: ProjectDraft) -> Result<(), EngineError> {
        if self.status != ProjectStatus::Planning {
            return Err(EngineError::validation(format!(
                "project {} can no longer be edited (status {})",
                self.id, self.status
            )));
        }
        draft.validate()?;

        self.name = draft.name.trim().to_string();
        self.description = trimmed(&draft.description);
        self.owner = trimmed(&draft.owner);
        self.tag = draft.tag;
        self.start_date = draft.start_date;
        self.end_date = draft.end_date;
        self.workflow_order = draft.definition.stages.clone();
        self.members = draft.definition.ordered_members();

        let member_ids: HashSet<&str> = self.members.iter().map(|m| m.id.as_str()).collect();
        self.tasks.retain(|t| member_ids.contains(t.assigned_to.as_str()));
        Ok(())
    }
}
