use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info};

use super::{check_project_id, LeaseDirectory, ProjectLease, ProjectStore, StoreError};
use crate::pod::Project;

const FILE_SUFFIX: &str = ".project.json";

/// One pretty-printed JSON document per project under a directory, with
/// `<id>.lock` lease files beside them.
#[derive(Debug, Clone)]
pub struct FileProjectStore {
    directory: PathBuf,
    leases: LeaseDirectory,
}

impl FileProjectStore {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            leases: LeaseDirectory::new(directory),
        }
    }

    fn project_path(&self, project_id: &str) -> PathBuf {
        self.directory.join(format!("{project_id}{FILE_SUFFIX}"))
    }
}

#[async_trait]
impl ProjectStore for FileProjectStore {
    async fn load(&self, project_id: &str) -> Result<Project, StoreError> {
        check_project_id(project_id)?;
        let path = self.project_path(project_id);

        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    project_id: project_id.to_string(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        let project: Project = serde_json::from_str(&contents)?;
        debug!(project_id = %project_id, file = ?path, "Project loaded");
        Ok(project)
    }

    async fn save(&self, project: &Project) -> Result<(), StoreError> {
        check_project_id(&project.id)?;
        fs::create_dir_all(&self.directory).await?;

        let path = self.project_path(&project.id);
        let serialized = serde_json::to_string_pretty(project)?;

        // Write to temporary file first, then rename (atomic operation)
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, serialized).await?;
        fs::rename(&temp_path, &path).await?;

        debug!(
            project_id = %project.id,
            current_stage = project.current_stage,
            file = ?path,
            "Project saved"
        );
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            if let Some(id) = name.to_str().and_then(|n| n.strip_suffix(FILE_SUFFIX)) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, project_id: &str) -> Result<(), StoreError> {
        check_project_id(project_id)?;
        let path = self.project_path(project_id);

        match fs::remove_file(&path).await {
            Ok(()) => {
                self.leases.discard(project_id);
                info!(project_id = %project_id, "Project deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
                project_id: project_id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn lock(&self, project_id: &str) -> Result<ProjectLease, StoreError> {
        check_project_id(project_id)?;
        self.leases.acquire(project_id).await
    }

    async fn try_lock(&self, project_id: &str) -> Result<ProjectLease, StoreError> {
        check_project_id(project_id)?;
        self.leases.try_acquire(project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pod::test_support::three_member_project;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_then_load_returns_same_project() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileProjectStore::new(temp_dir.path().join("projects"));
        let project = three_member_project(Utc::now());

        store.save(&project).await.unwrap();
        let loaded = store.load(&project.id).await.unwrap();

        assert_eq!(loaded, project);
        assert!(!temp_dir.path().join("projects/pod-1.project.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_project_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileProjectStore::new(temp_dir.path());

        assert!(matches!(
            store.load("nope").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete("nope").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_ignores_foreign_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileProjectStore::new(temp_dir.path());
        let mut project = three_member_project(Utc::now());

        store.save(&project).await.unwrap();
        project.id = "pod-0".to_string();
        store.save(&project).await.unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "hello").unwrap();

        assert_eq!(store.list_ids().await.unwrap(), vec!["pod-0", "pod-1"]);

        store.delete("pod-0").await.unwrap();
        assert_eq!(store.list_ids().await.unwrap(), vec!["pod-1"]);
    }

    #[tokio::test]
    async fn test_lease_is_shared_between_stores_on_one_directory() {
        let temp_dir = TempDir::new().unwrap();
        let sampler_side = FileProjectStore::new(temp_dir.path());
        let cli_side = FileProjectStore::new(temp_dir.path());
        let project = three_member_project(Utc::now());
        sampler_side.save(&project).await.unwrap();

        let lease = sampler_side.lock("pod-1").await.unwrap();
        assert!(matches!(
            cli_side.try_lock("pod-1").await,
            Err(StoreError::Lock { .. })
        ));
        drop(lease);
        assert!(cli_side.try_lock("pod-1").await.is_ok());

        // lease files are not projects
        assert_eq!(cli_side.list_ids().await.unwrap(), vec!["pod-1"]);
    }

    #[tokio::test]
    async fn test_list_of_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileProjectStore::new(temp_dir.path().join("absent"));
        assert!(store.list_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileProjectStore::new(temp_dir.path());
        std::fs::write(temp_dir.path().join("bad.project.json"), "{not json").unwrap();

        assert!(matches!(
            store.load("bad").await,
            Err(StoreError::Serialization(_))
        ));
    }
}
