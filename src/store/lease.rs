// Cross-process project leases
//
// A lease is an exclusive advisory lock on `<id>.lock`, held for the whole
// load -> mutate -> save of one project. Every process sharing a store
// directory (CLI commands, the clock sampler) goes through the same files.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use super::StoreError;

/// Exclusive hold on one project; released on drop.
#[derive(Debug)]
pub struct ProjectLease {
    file: Option<File>,
}

impl ProjectLease {
    /// Lease for stores that never leave this process.
    pub fn local() -> Self {
        Self { file: None }
    }

    /// Whether other processes are kept out as well.
    pub fn is_shared_lock(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for ProjectLease {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            // closing the handle releases the lock anyway
            let _ = FileExt::unlock(file);
        }
    }
}

/// Lock files for every project of one store, kept in a single directory.
#[derive(Debug, Clone)]
pub struct LeaseDirectory {
    directory: PathBuf,
}

impl LeaseDirectory {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    fn lock_path(&self, project_id: &str) -> PathBuf {
        self.directory.join(format!("{project_id}.lock"))
    }

    fn open(&self, project_id: &str) -> Result<File, StoreError> {
        std::fs::create_dir_all(&self.directory)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path(project_id))?;
        Ok(file)
    }

    /// Wait until the project is free, then hold it.
    pub async fn acquire(&self, project_id: &str) -> Result<ProjectLease, StoreError> {
        let file = self.open(project_id)?;
        let project_id = project_id.to_string();

        tokio::task::spawn_blocking(move || -> Result<ProjectLease, StoreError> {
            file.lock_exclusive()?;
            debug!(project_id = %project_id, "Project lease acquired");
            Ok(ProjectLease { file: Some(file) })
        })
        .await
        .map_err(|e| StoreError::Lock {
            reason: format!("lease task failed: {e}"),
        })?
    }

    /// Hold the project only if no other process does right now.
    pub fn try_acquire(&self, project_id: &str) -> Result<ProjectLease, StoreError> {
        let file = self.open(project_id)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(ProjectLease { file: Some(file) }),
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
                Err(StoreError::Lock {
                    reason: format!("project {project_id} is held by another process"),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the lock file of a deleted project.
    pub fn discard(&self, project_id: &str) {
        let _ = std::fs::remove_file(self.lock_path(project_id));
    }
}
