use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{check_project_id, ProjectLease, ProjectStore, StoreError};
use crate::pod::Project;

/// Process-local store, mostly for tests and dry runs.
///
/// Nothing outside the process can see it, so its leases are no-ops and the
/// coordinator's in-process locks do the serializing.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    projects: RwLock<BTreeMap<String, Project>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn load(&self, project_id: &str) -> Result<Project, StoreError> {
        self.projects
            .read()
            .await
            .get(project_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                project_id: project_id.to_string(),
            })
    }

    async fn save(&self, project: &Project) -> Result<(), StoreError> {
        check_project_id(&project.id)?;
        self.projects
            .write()
            .await
            .insert(project.id.clone(), project.clone());
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.projects.read().await.keys().cloned().collect())
    }

    async fn delete(&self, project_id: &str) -> Result<(), StoreError> {
        self.projects
            .write()
            .await
            .remove(project_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                project_id: project_id.to_string(),
            })
    }

    async fn lock(&self, _project_id: &str) -> Result<ProjectLease, StoreError> {
        Ok(ProjectLease::local())
    }

    async fn try_lock(&self, _project_id: &str) -> Result<ProjectLease, StoreError> {
        Ok(ProjectLease::local())
    }
}
