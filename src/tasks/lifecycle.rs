use chrono::{DateTime, Utc};
use tracing::info;

use super::{NewTask, Task, TaskStatus};
use crate::errors::EngineError;
use crate::pod::Project;

/// Attach a new pending task to a project member.
pub fn create_task(
    project: &mut Project,
    new_task: NewTask,
    now: DateTime<Utc>,
) -> Result<Task, EngineError> {
    let title = new_task.title.trim();
    let description = new_task.description.trim();

    if title.is_empty() {
        return Err(EngineError::validation("task title is required"));
    }
    if description.is_empty() {
        return Err(EngineError::validation("task description is required"));
    }
    if project.member(&new_task.assigned_to).is_none() {
        return Err(EngineError::validation(format!(
            "task must be assigned to a project member, got '{}'",
            new_task.assigned_to
        )));
    }

    let task = Task {
        id: next_task_id(project),
        title: title.to_string(),
        description: description.to_string(),
        assigned_to: new_task.assigned_to,
        assigned_by: new_task.assigned_by,
        created_at: now,
        status: TaskStatus::Pending,
        link: None,
        completed_at: None,
    };

    info!(
        project_id = %project.id,
        task_id = %task.id,
        assigned_to = %task.assigned_to,
        "Task created"
    );

    project.tasks.push(task.clone());
    Ok(task)
}

/// Move a task forward in its lifecycle. Completion stamps `completed_at`.
pub fn update_task_status(
    project: &mut Project,
    task_id: &str,
    new_status: TaskStatus,
    now: DateTime<Utc>,
) -> Result<Task, EngineError> {
    let project_id = project.id.clone();
    let task = task_mut(project, task_id)?;

    let previous = task.status;
    task.status = previous.try_transition(new_status)?;
    if task.status == TaskStatus::Completed {
        task.completed_at = Some(now);
    }

    info!(
        project_id = %project_id,
        task_id = %task_id,
        from = %previous,
        to = %task.status,
        "Task status updated"
    );

    Ok(task.clone())
}

/// Set or replace the proof-of-work link of a task, whatever its status.
pub fn attach_proof_link(
    project: &mut Project,
    task_id: &str,
    link: &str,
) -> Result<Task, EngineError> {
    let link = link.trim();
    if link.is_empty() {
        return Err(EngineError::validation("proof-of-work link must not be empty"));
    }

    let task = task_mut(project, task_id)?;
    task.link = Some(link.to_string());
    Ok(task.clone())
}

fn task_mut<'a>(project: &'a mut Project, task_id: &str) -> Result<&'a mut Task, EngineError> {
    project
        .tasks
        .iter_mut()
        .find(|t| t.id == task_id)
        .ok_or_else(|| EngineError::not_found("task", task_id))
}

// Tasks are never removed, but ids stay unique even if an older store holds gaps.
fn next_task_id(project: &Project) -> String {
    let mut n = project.tasks.len() + 1;
    loop {
        let candidate = format!("task-{n}");
        if project.task(&candidate).is_none() {
            return candidate;
        }
        n += 1;
    }
}
