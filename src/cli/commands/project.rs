use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;

use super::role_badge;
use crate::coordinator::PodCoordinator;
use crate::pod::{working_days, MemberPhase, Project, ProjectStatus, ProjectTag};
use crate::progression::round_days;
use crate::workflows::{MemberAssignment, ProjectDraft, WorkflowDefinition};

/// Parse `NAME:ROLE`.
pub fn parse_member(arg: &str) -> Result<MemberAssignment> {
    let (name, role) = arg
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("member '{}' must look like NAME:ROLE", arg))?;
    Ok(MemberAssignment::new(name.trim(), role.trim()))
}

pub fn draft_from_args(
    name: String,
    description: Option<String>,
    owner: Option<String>,
    tag: Option<String>,
    stages: Vec<String>,
    members: Vec<String>,
) -> Result<ProjectDraft> {
    let tag = tag
        .map(|t| t.parse::<ProjectTag>().map_err(|e| anyhow!(e)))
        .transpose()?;
    let assignments = members
        .iter()
        .map(|m| parse_member(m))
        .collect::<Result<Vec<_>>>()?;

    Ok(ProjectDraft {
        name,
        description,
        owner,
        tag,
        start_date: None,
        end_date: None,
        definition: WorkflowDefinition {
            stages,
            assignments,
        },
    })
}

pub fn read_draft(path: &Path) -> Result<ProjectDraft> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid project draft", path.display()))
}

pub async fn create(coordinator: &PodCoordinator, draft: ProjectDraft, launch: bool) -> Result<()> {
    let project = coordinator.create_project(draft, launch).await?;

    println!("✅ Created project {} ({})", project.name, project.id);
    println!("   Status: {}", project.status);
    for (index, member) in project.members.iter().enumerate() {
        println!(
            "   {}. {} {} [{}] ({})",
            index + 1,
            role_badge(&member.role),
            member.name,
            member.role,
            member.id
        );
    }
    if project.status == ProjectStatus::Planning {
        println!();
        println!("💡 Start it with: baton launch {}", project.id);
    }
    Ok(())
}

pub async fn launch(coordinator: &PodCoordinator, project_id: &str) -> Result<()> {
    let project = coordinator.launch_project(project_id).await?;
    let first = project
        .current_active_member()
        .map(|m| m.name.as_str())
        .unwrap_or("-");
    println!("🚀 Launched {}; {} is up first", project.name, first);
    Ok(())
}

pub async fn edit(coordinator: &PodCoordinator, project_id: &str, path: &Path) -> Result<()> {
    let draft = read_draft(path)?;
    let project = coordinator.update_definition(project_id, draft).await?;
    println!(
        "✏️  Updated {} ({} members, {} stages)",
        project.id,
        project.members.len(),
        project.workflow_order.len()
    );
    Ok(())
}

pub async fn list(coordinator: &PodCoordinator, json: bool) -> Result<()> {
    let projects = coordinator.list_projects().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("📋 No projects yet");
        println!("   💡 Create one with: baton create --name NAME --stage STAGE --member NAME:STAGE");
        return Ok(());
    }

    for project in &projects {
        let holder = project
            .current_active_member()
            .map(|m| format!("{} ({})", m.name, m.role))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<28} {:<12} {:>3}%  {}",
            project.id,
            project.name,
            project.status.to_string(),
            project.progress_percent(),
            holder
        );
    }
    Ok(())
}

pub async fn show(coordinator: &PodCoordinator, project_id: &str, json: bool) -> Result<()> {
    let project = coordinator.load_project(project_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&project)?);
        return Ok(());
    }

    print_project(&project);
    Ok(())
}

fn print_project(project: &Project) {
    let now = Utc::now();

    println!("📁 {} ({})", project.name, project.id);
    if let Some(description) = &project.description {
        println!("   {}", description);
    }
    if let Some(owner) = &project.owner {
        println!("   Owner: {}", owner);
    }
    if let Some(tag) = project.tag {
        println!("   Tag: {:?}", tag);
    }
    println!(
        "   Status: {}  Progress: {}%  Time spent: {} days",
        project.status,
        project.progress_percent(),
        round_days(project.total_time_spent())
    );
    println!();

    for (index, member) in project.members.iter().enumerate() {
        // the recorded value is frozen once a member completes
        let days = if member.completed {
            member.rounded_time_spent()
        } else {
            round_days(working_days(member, now))
        };
        let marker = match member.phase() {
            MemberPhase::Completed => "✅",
            MemberPhase::Active => "▶️ ",
            MemberPhase::NotStarted => "⏳",
        };
        println!(
            "{} {}. {} {} [{}] ({}) {} days",
            marker,
            index + 1,
            role_badge(&member.role),
            member.name,
            member.role,
            member.id,
            days
        );
        if member.has_handed_off() {
            println!("      🔗 {}", member.handoff_link);
        }
        for task in project.tasks_for_member(&member.id) {
            println!("      - [{}] {} ({})", task.status, task.title, task.id);
        }
    }
}

pub async fn delete(coordinator: &PodCoordinator, project_id: &str) -> Result<()> {
    coordinator.delete_project(project_id).await?;
    println!("🗑️  Deleted project {}", project_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_member() {
        let member = parse_member("Dhruv Patel:Product").unwrap();
        assert_eq!(member.name, "Dhruv Patel");
        assert_eq!(member.role, "Product");
        assert!(parse_member("Dhruv Patel").is_err());
    }

    #[test]
    fn test_draft_from_args_parses_tag() {
        let draft = draft_from_args(
            "Launch".to_string(),
            None,
            Some("John Doe".to_string()),
            Some("go-live".to_string()),
            vec!["Product".to_string()],
            vec!["Dhruv Patel:Product".to_string()],
        )
        .unwrap();
        assert_eq!(draft.tag, Some(ProjectTag::GoLive));
        assert!(draft.validate().is_ok());

        assert!(draft_from_args(
            "Launch".to_string(),
            None,
            None,
            Some("hotfix".to_string()),
            vec![],
            vec![]
        )
        .is_err());
    }
}
