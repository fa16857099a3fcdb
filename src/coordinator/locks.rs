use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per project id; different projects never contend.
#[derive(Debug, Default)]
pub struct ProjectLocks {
    table: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, project_id: &str) -> Arc<AsyncMutex<()>> {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table
            .entry(project_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Wait for exclusive access to a project.
    pub async fn acquire(&self, project_id: &str) -> OwnedMutexGuard<()> {
        self.entry(project_id).lock_owned().await
    }

    /// Exclusive access if nobody else holds the project right now.
    pub fn try_acquire(&self, project_id: &str) -> Option<OwnedMutexGuard<()>> {
        self.entry(project_id).try_lock_owned().ok()
    }

    /// Drop the table entry of a deleted project.
    pub fn forget(&self, project_id: &str) {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.remove(project_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_project_is_exclusive() {
        let locks = ProjectLocks::new();
        let guard = locks.acquire("p1").await;

        assert!(locks.try_acquire("p1").is_none());
        assert!(locks.try_acquire("p2").is_some());

        drop(guard);
        assert!(locks.try_acquire("p1").is_some());
    }
}
