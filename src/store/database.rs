use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::{migrate::MigrateDatabase, Row, SqlitePool};
use tracing::info;

use super::{check_project_id, LeaseDirectory, ProjectLease, ProjectStore, StoreError};
use crate::pod::Project;

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database {
            reason: e.to_string(),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StoreError::Database {
            reason: e.to_string(),
        }
    }
}

/// SQLite-backed store; each project is one JSON document row.
///
/// Leases live in a `<database>.locks` directory next to the database file.
/// In-memory databases are private to the process and use local leases.
pub struct SqliteProjectStore {
    pool: SqlitePool,
    leases: Option<LeaseDirectory>,
}

/// Directory for lease files of a file-backed database URL.
fn lease_directory(database_url: &str) -> Option<PathBuf> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let path = path.split('?').next().unwrap_or(path);

    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Some(PathBuf::from(format!("{path}.locks")))
}

impl SqliteProjectStore {
    /// Open (creating if needed) the database and run migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        if !sqlx::Sqlite::database_exists(database_url).await? {
            info!("Creating database at {}", database_url);
            sqlx::Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePool::connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self {
            pool,
            leases: lease_directory(database_url).map(LeaseDirectory::new),
        })
    }

    pub async fn shutdown(&self) {
        info!("Shutting down database connections...");
        self.pool.close().await;
    }
}

#[async_trait]
impl ProjectStore for SqliteProjectStore {
    async fn load(&self, project_id: &str) -> Result<Project, StoreError> {
        let row = sqlx::query("SELECT document FROM projects WHERE id = ?1")
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let document: String = row.get("document");
                Ok(serde_json::from_str(&document)?)
            }
            None => Err(StoreError::NotFound {
                project_id: project_id.to_string(),
            }),
        }
    }

    async fn save(&self, project: &Project) -> Result<(), StoreError> {
        check_project_id(&project.id)?;
        let document = serde_json::to_string(project)?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO projects (id, status, document, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            "#,
        )
        .bind(&project.id)
        .bind(project.status.to_string())
        .bind(document)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT id FROM projects ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|row| row.get("id")).collect())
    }

    async fn delete(&self, project_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?1")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                project_id: project_id.to_string(),
            });
        }
        if let Some(leases) = &self.leases {
            leases.discard(project_id);
        }
        Ok(())
    }

    async fn lock(&self, project_id: &str) -> Result<ProjectLease, StoreError> {
        check_project_id(project_id)?;
        match &self.leases {
            Some(leases) => leases.acquire(project_id).await,
            None => Ok(ProjectLease::local()),
        }
    }

    async fn try_lock(&self, project_id: &str) -> Result<ProjectLease, StoreError> {
        check_project_id(project_id)?;
        match &self.leases {
            Some(leases) => leases.try_acquire(project_id),
            None => Ok(ProjectLease::local()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pod::test_support::three_member_project;
    use chrono::Utc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sqlite_store_round_trip_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", temp_dir.path().join("baton.db").display());
        let store = SqliteProjectStore::connect(&url).await.unwrap();
        let project = three_member_project(Utc::now());

        store.save(&project).await.unwrap();
        assert_eq!(store.load("pod-1").await.unwrap(), project);
        assert_eq!(store.list_ids().await.unwrap(), vec!["pod-1"]);

        store.delete("pod-1").await.unwrap();
        assert!(matches!(
            store.load("pod-1").await,
            Err(StoreError::NotFound { .. })
        ));
        store.shutdown().await;
    }

    #[test]
    fn test_lease_directory_follows_database_path() {
        assert_eq!(
            lease_directory("sqlite://.baton/baton.db"),
            Some(PathBuf::from(".baton/baton.db.locks"))
        );
        assert_eq!(
            lease_directory("sqlite:data.db?mode=rwc"),
            Some(PathBuf::from("data.db.locks"))
        );
        assert_eq!(lease_directory("sqlite::memory:"), None);
    }
}
