//! SQLite-backed [`ProjectStore`] implementation.
//!
//! Tables are created by [`crate::migrate`]. Every write that touches more
//! than one row runs inside a single transaction, so a failed bulk insert
//! leaves no partial set of file records behind.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use repodoc_core::error::{Error, Result};
use repodoc_core::models::{NewProjectFile, Project, ProjectFile, ProjectSummary};
use repodoc_core::store::ProjectStore;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn store_err(e: sqlx::Error) -> Error {
    Error::StoreWrite(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|d| d.is_unique_violation())
        .unwrap_or(false)
}

#[async_trait]
impl ProjectStore for SqliteStore {
    async fn create_project(&self, name: &str, git_url: Option<&str>) -> Result<Project> {
        let project = Project {
            project_id: Uuid::new_v4().to_string(),
            project_name: name.to_string(),
            git_url: git_url.map(str::to_string),
            readme_doc: None,
            created_at: chrono::Utc::now().timestamp(),
        };

        sqlx::query(
            r#"
            INSERT INTO projects (project_id, project_name, git_url, readme_doc, created_at)
            VALUES (?, ?, ?, NULL, ?)
            "#,
        )
        .bind(&project.project_id)
        .bind(&project.project_name)
        .bind(&project.git_url)
        .bind(project.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::DuplicateProject(name.to_string())
            } else {
                store_err(e)
            }
        })?;

        Ok(project)
    }

    async fn update_project_readme(&self, name: &str, readme: &str) -> Result<()> {
        let result = sqlx::query("UPDATE projects SET readme_doc = ? WHERE project_name = ?")
            .bind(readme)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::ProjectNotFound(name.to_string()));
        }
        Ok(())
    }

    async fn bulk_create_files(&self, project_id: &str, records: &[NewProjectFile]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO project_files (file_id, project_id, file_name, file_content,
                                           file_summary, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(project_id)
            .bind(&record.file_name)
            .bind(&record.file_content)
            .bind(&record.file_summary)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(store_err)?;
        }

        tx.commit().await.map_err(store_err)?;
        Ok(())
    }

    async fn get_project_id_by_name(&self, name: &str) -> Result<String> {
        let id: Option<String> =
            sqlx::query_scalar("SELECT project_id FROM projects WHERE project_name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(store_err)?;

        id.ok_or_else(|| Error::ProjectNotFound(name.to_string()))
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT project_id, project_name FROM projects ORDER BY created_at, project_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows
            .into_iter()
            .map(|(project_id, project_name)| ProjectSummary {
                project_id,
                project_name,
            })
            .collect())
    }

    async fn get_files_by_project_id(&self, project_id: &str) -> Result<Vec<ProjectFile>> {
        let rows: Vec<(String, String, String, String, String)> = sqlx::query_as(
            r#"
            SELECT file_id, project_id, file_name, file_content, file_summary
            FROM project_files
            WHERE project_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows
            .into_iter()
            .map(
                |(file_id, project_id, file_name, file_content, file_summary)| ProjectFile {
                    file_id,
                    project_id,
                    file_name,
                    file_content,
                    file_summary,
                },
            )
            .collect())
    }

    async fn get_readme_by_project_id(&self, project_id: &str) -> Result<String> {
        let readme: Option<Option<String>> =
            sqlx::query_scalar("SELECT readme_doc FROM projects WHERE project_id = ?")
                .bind(project_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(store_err)?;

        Ok(readme.flatten().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DbConfig};
    use crate::{db, migrate};
    use tempfile::TempDir;

    async fn open_store(tmp: &TempDir) -> SqliteStore {
        let mut config = Config::minimal();
        config.db = DbConfig {
            path: tmp.path().join("data").join("repodoc.sqlite"),
        };
        let pool = db::connect(&config).await.unwrap();
        migrate::apply(&pool).await.unwrap();
        SqliteStore::new(pool)
    }

    fn record(name: &str) -> NewProjectFile {
        NewProjectFile {
            file_name: name.to_string(),
            file_content: format!("content of {}", name),
            file_summary: format!("- summary of {}", name),
        }
    }

    #[tokio::test]
    async fn test_create_and_resolve_project() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let created = store
            .create_project("demo", Some("https://example.com/demo.git"))
            .await
            .unwrap();
        let id = store.get_project_id_by_name("demo").await.unwrap();
        assert_eq!(id, created.project_id);

        let listed = store.list_projects().await.unwrap();
        assert_eq!(
            listed,
            vec![ProjectSummary {
                project_id: id,
                project_name: "demo".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        store.create_project("demo", None).await.unwrap();
        let err = store.create_project("demo", None).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateProject(_)));
    }

    #[tokio::test]
    async fn test_unknown_project() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let err = store.get_project_id_by_name("ghost").await.unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound(_)));

        let err = store.update_project_readme("ghost", "# x").await.unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound(_)));

        assert_eq!(store.get_readme_by_project_id("nope").await.unwrap(), "");
        assert!(store.get_files_by_project_id("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_readme_overwritten() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        let project = store.create_project("demo", None).await.unwrap();

        assert_eq!(
            store.get_readme_by_project_id(&project.project_id).await.unwrap(),
            ""
        );
        store.update_project_readme("demo", "# First").await.unwrap();
        store.update_project_readme("demo", "# Second").await.unwrap();
        assert_eq!(
            store.get_readme_by_project_id(&project.project_id).await.unwrap(),
            "# Second"
        );
    }

    #[tokio::test]
    async fn test_bulk_create_preserves_order() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;
        let project = store.create_project("demo", None).await.unwrap();

        store
            .bulk_create_files(&project.project_id, &[record("b.py"), record("a.py")])
            .await
            .unwrap();
        store.bulk_create_files(&project.project_id, &[]).await.unwrap();

        let files = store.get_files_by_project_id(&project.project_id).await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["b.py", "a.py"]);
        assert!(files.iter().all(|f| f.project_id == project.project_id));
        assert_ne!(files[0].file_id, files[1].file_id);
    }

    #[tokio::test]
    async fn test_bulk_create_for_missing_project_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let store = open_store(&tmp).await;

        let err = store
            .bulk_create_files("no-such-project", &[record("a.py"), record("b.py")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StoreWrite(_)));
        assert!(store
            .get_files_by_project_id("no-such-project")
            .await
            .unwrap()
            .is_empty());
    }
}
