use anyhow::Result;

use super::actor_from;
use crate::cli::TaskCommands;
use crate::coordinator::PodCoordinator;
use crate::tasks::{NewTask, Task, TaskStatus};

pub async fn execute(coordinator: &PodCoordinator, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::Create {
            project_id,
            title,
            description,
            assign_to,
            by,
            actor,
        } => {
            let task = coordinator
                .create_task_as(
                    actor_from(&actor).as_ref(),
                    &project_id,
                    NewTask {
                        title,
                        description,
                        assigned_to: assign_to,
                        assigned_by: by,
                    },
                )
                .await?;
            println!("📝 Created {}: {}", task.id, task.title);
        }
        TaskCommands::Start {
            project_id,
            task_id,
            actor,
        } => {
            let task = coordinator
                .update_task_status_as(
                    actor_from(&actor).as_ref(),
                    &project_id,
                    &task_id,
                    TaskStatus::InProgress,
                )
                .await?;
            print_task(&task);
        }
        TaskCommands::Complete {
            project_id,
            task_id,
            actor,
        } => {
            let task = coordinator
                .update_task_status_as(
                    actor_from(&actor).as_ref(),
                    &project_id,
                    &task_id,
                    TaskStatus::Completed,
                )
                .await?;
            print_task(&task);
        }
        TaskCommands::Link {
            project_id,
            task_id,
            link,
            actor,
        } => {
            let task = coordinator
                .attach_proof_link_as(actor_from(&actor).as_ref(), &project_id, &task_id, &link)
                .await?;
            print_task(&task);
        }
        TaskCommands::List { project_id, member } => {
            let project = coordinator.load_project(&project_id).await?;
            let tasks: Vec<&Task> = match &member {
                Some(member_id) => project.tasks_for_member(member_id).collect(),
                None => project.tasks.iter().collect(),
            };
            if tasks.is_empty() {
                println!("📋 No tasks");
            }
            for task in tasks {
                print_task(task);
            }
        }
    }
    Ok(())
}

fn print_task(task: &Task) {
    println!(
        "{:<8} [{}] {} -> {}",
        task.id, task.status, task.title, task.assigned_to
    );
    if let Some(link) = &task.link {
        println!("         🔗 {}", link);
    }
}
