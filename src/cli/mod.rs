use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "baton")]
#[command(about = "Sequential cross-team hand-off workflow engine")]
#[command(long_about = "Baton tracks POD projects: ordered stages, each owned by a team member, \
                       where work only moves on once the current owner hands off a link. \
                       Get started with 'baton create'.")]
pub struct Cli {
    /// Read configuration from this file instead of baton.toml/.baton-rc
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Who is running the command, for permission checks.
#[derive(Args, Debug, Clone, Default)]
pub struct ActorArgs {
    /// Act as this person; permissions are checked when set
    #[arg(long = "as", value_name = "NAME")]
    pub actor: Option<String>,

    /// Act with administrator rights
    #[arg(long, requires = "actor")]
    pub admin: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a project from stages and member assignments
    Create {
        /// Project name
        #[arg(long, required_unless_present = "from_file")]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        /// Feature or Go-Live
        #[arg(long)]
        tag: Option<String>,
        /// Stage names in workflow order (repeatable)
        #[arg(long = "stage", value_name = "STAGE")]
        stages: Vec<String>,
        /// Member as NAME:ROLE (repeatable)
        #[arg(long = "member", value_name = "NAME:ROLE")]
        members: Vec<String>,
        /// Read the whole project draft from a JSON file
        #[arg(long, conflicts_with_all = ["name", "stages", "members"])]
        from_file: Option<PathBuf>,
        /// Keep the project in planning; start it later with 'baton launch'
        #[arg(long)]
        draft: bool,
    },
    /// Start a project that is still in planning
    Launch { project_id: String },
    /// Replace the workflow definition of a project still in planning
    Edit {
        project_id: String,
        /// JSON project draft
        #[arg(long)]
        from_file: PathBuf,
    },
    /// List all projects
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show a project with its members and tasks
    Show {
        project_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete a project
    Delete { project_id: String },
    /// Hand off the active stage (or update an earlier hand-off link)
    Handoff {
        project_id: String,
        member_id: String,
        link: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Manage tasks attached to members
    #[command(subcommand)]
    Task(TaskCommands),
    /// Run one clock-sampler pass
    Tick,
    /// Run the clock sampler until interrupted
    Run {
        /// Seconds between ticks (overrides configuration)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Show the effective configuration
    Config {
        /// Also write it to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Create a task for a member
    Create {
        project_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Member id of the assignee
        #[arg(long)]
        assign_to: String,
        /// Name of the person creating the task
        #[arg(long)]
        by: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Mark a pending task as in progress
    Start {
        project_id: String,
        task_id: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Mark an in-progress task as completed
    Complete {
        project_id: String,
        task_id: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// Attach a proof-of-work link to a task
    Link {
        project_id: String,
        task_id: String,
        link: String,
        #[command(flatten)]
        actor: ActorArgs,
    },
    /// List tasks of a project
    List {
        project_id: String,
        /// Only tasks of this member
        #[arg(long)]
        member: Option<String>,
    },
}
