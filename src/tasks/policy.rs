// Authorization policy as pure predicates.
//
// The coordinator checks them while it holds the project, and only when the
// caller names an actor.

use serde::{Deserialize, Serialize};

use super::Task;
use crate::errors::EngineError;
use crate::pod::{Member, Project};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Admin,
    Employee,
}

/// Whoever is asking to perform an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn admin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: ActorRole::Admin,
        }
    }

    pub fn employee(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: ActorRole::Employee,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }
}

fn is_owner(actor: &Actor, project: &Project) -> bool {
    project.owner.as_deref() == Some(actor.name.as_str())
}

/// Admins and the project owner may create tasks.
pub fn can_create_task(actor: &Actor, project: &Project) -> bool {
    actor.is_admin() || is_owner(actor, project)
}

/// Admins, the project owner, the assignee and the task's creator may edit it.
pub fn can_edit_task(actor: &Actor, task: &Task, project: &Project) -> bool {
    if actor.is_admin() || is_owner(actor, project) {
        return true;
    }
    let is_assignee = project
        .member(&task.assigned_to)
        .is_some_and(|member| member.name == actor.name);
    is_assignee || task.assigned_by == actor.name
}

/// Admins and the member themself may submit or edit a hand-off link.
pub fn can_edit_handoff(actor: &Actor, member: &Member) -> bool {
    actor.is_admin() || member.name == actor.name
}

pub fn ensure_allowed(allowed: bool, actor: &Actor, action: &'static str) -> Result<(), EngineError> {
    if allowed {
        Ok(())
    } else {
        Err(EngineError::PermissionDenied {
            actor: actor.name.clone(),
            action,
        })
    }
}
