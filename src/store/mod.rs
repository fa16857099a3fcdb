// Persistence gateway - load/save of project state

pub mod file;
pub mod lease;
pub mod memory;

#[cfg(feature = "database")]
pub mod database;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};
use crate::pod::Project;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

pub use file::FileProjectStore;
pub use lease::{LeaseDirectory, ProjectLease};
pub use memory::InMemoryProjectStore;

#[cfg(feature = "database")]
pub use database::SqliteProjectStore;

/// Errors that can occur while loading or saving projects
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Project not found: {project_id}")]
    NotFound { project_id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid project id '{project_id}'")]
    InvalidId { project_id: String },

    #[error("Database error: {reason}")]
    Database { reason: String },

    #[error("Lock acquisition failed: {reason}")]
    Lock { reason: String },
}

/// Load/save contract for project aggregates.
///
/// Saves are whole-snapshot and last-write-wins, so callers hold the
/// project's lease from load until save.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn load(&self, project_id: &str) -> Result<Project, StoreError>;

    async fn save(&self, project: &Project) -> Result<(), StoreError>;

    /// Ids of every stored project, sorted.
    async fn list_ids(&self) -> Result<Vec<String>, StoreError>;

    async fn delete(&self, project_id: &str) -> Result<(), StoreError>;

    /// Wait for exclusive use of a project, across processes sharing the store.
    async fn lock(&self, project_id: &str) -> Result<ProjectLease, StoreError>;

    /// Like `lock`, but fails with `StoreError::Lock` instead of waiting.
    async fn try_lock(&self, project_id: &str) -> Result<ProjectLease, StoreError>;
}

/// Ids end up in file names and SQL keys; keep them boring.
pub(crate) fn check_project_id(project_id: &str) -> Result<(), StoreError> {
    let valid = !project_id.is_empty()
        && project_id.len() <= 64
        && project_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidId {
            project_id: project_id.to_string(),
        })
    }
}

/// Build the store selected in configuration.
pub async fn open_store(config: &StoreConfig) -> Result<Box<dyn ProjectStore>, StoreError> {
    match config.backend {
        StoreBackend::File => Ok(Box::new(FileProjectStore::new(&config.directory))),
        StoreBackend::Memory => Ok(Box::new(InMemoryProjectStore::new())),
        #[cfg(feature = "database")]
        StoreBackend::Sqlite => {
            let store = SqliteProjectStore::connect(&config.database_url).await?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "database"))]
        StoreBackend::Sqlite => Err(StoreError::Database {
            reason: "sqlite backend requires the 'database' feature".to_string(),
        }),
    }
}
