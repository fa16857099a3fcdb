// Baton - sequential cross-team hand-off workflow engine
// This exposes the engine, its stores and notifiers for the CLI and for tests

pub mod cli;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod notify;
pub mod observability;
pub mod pod;
pub mod progression;
pub mod scheduler;
pub mod shutdown;
pub mod store;
pub mod tasks;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::BatonConfig;
pub use coordinator::{HandoffReceipt, PodCoordinator, TickReport};
pub use errors::EngineError;
pub use notify::{build_notifier, HandoffNotice, Notifier, NotificationError};
pub use observability::{engine_metrics, EngineMetrics, OperationTimer};
pub use pod::{Member, MemberPhase, Project, ProjectStatus, ProjectTag};
pub use progression::{sample_active_member, submit_handoff, ElapsedUpdate, HandoffOutcome};
pub use scheduler::ClockSampler;
pub use shutdown::ShutdownCoordinator;
pub use store::{open_store, FileProjectStore, InMemoryProjectStore, ProjectStore, StoreError};
pub use tasks::{Actor, ActorRole, NewTask, Task, TaskStatus};
pub use telemetry::{generate_correlation_id, init_telemetry};
pub use workflows::{MemberAssignment, ProjectDraft, WorkflowDefinition};
