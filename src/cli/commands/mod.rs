use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{ActorArgs, Commands};
use crate::config::BatonConfig;
use crate::coordinator::PodCoordinator;
use crate::notify::build_notifier;
use crate::store::open_store;
use crate::tasks::Actor;

pub mod config;
pub mod handoff;
pub mod project;
pub mod sampler;
pub mod task;

/// Build the coordinator the configuration asks for.
pub async fn open_coordinator(config: &BatonConfig) -> Result<Arc<PodCoordinator>> {
    let store = open_store(&config.store)
        .await
        .context("Failed to open project store")?;
    let notifier = build_notifier(&config.notifications)
        .context("Failed to set up hand-off notifications")?;

    Ok(Arc::new(
        PodCoordinator::new(Arc::from(store)).with_notifier(notifier),
    ))
}

/// Dispatch a parsed command.
pub async fn execute(command: Commands, config: &BatonConfig) -> Result<()> {
    if let Commands::Config { save } = &command {
        return config::show_config(config, save.as_deref());
    }

    let coordinator = open_coordinator(config).await?;

    match command {
        Commands::Create {
            name,
            description,
            owner,
            tag,
            stages,
            members,
            from_file,
            draft,
        } => {
            let project_draft = match from_file {
                Some(path) => project::read_draft(&path)?,
                None => project::draft_from_args(
                    name.unwrap_or_default(),
                    description,
                    owner,
                    tag,
                    stages,
                    members,
                )?,
            };
            project::create(&coordinator, project_draft, !draft).await
        }
        Commands::Launch { project_id } => project::launch(&coordinator, &project_id).await,
        Commands::Edit {
            project_id,
            from_file,
        } => project::edit(&coordinator, &project_id, &from_file).await,
        Commands::List { json } => project::list(&coordinator, json).await,
        Commands::Show { project_id, json } => project::show(&coordinator, &project_id, json).await,
        Commands::Delete { project_id } => project::delete(&coordinator, &project_id).await,
        Commands::Handoff {
            project_id,
            member_id,
            link,
            actor,
        } => handoff::submit(&coordinator, &project_id, &member_id, &link, actor_from(&actor)).await,
        Commands::Task(task_command) => task::execute(&coordinator, task_command).await,
        Commands::Tick => sampler::tick(&coordinator).await,
        Commands::Run { interval } => sampler::run(coordinator, config, interval).await,
        Commands::Config { .. } => Ok(()),
    }
}

pub(crate) fn actor_from(args: &ActorArgs) -> Option<Actor> {
    args.actor.as_ref().map(|name| {
        if args.admin {
            Actor::admin(name.clone())
        } else {
            Actor::employee(name.clone())
        }
    })
}

/// Short label shown next to a stage name.
pub fn role_badge(role: &str) -> &'static str {
    match role {
        "Product" => "📦",
        "Design" => "🎨",
        "Frontend" => "🖥️",
        "Backend" | "Dev" => "🛠️",
        "QA" => "🧪",
        "Marketing" => "📣",
        "Operations" => "⚙️",
        _ => "👤",
    }
}
