//! Storage abstraction for project and per-file summary records.
//!
//! The [`ProjectStore`] trait is the pipeline's only view of persistence,
//! so the SQLite backend and the in-memory backend used in tests are
//! interchangeable.
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`create_project`](ProjectStore::create_project) | Register a project by unique name |
//! | [`update_project_readme`](ProjectStore::update_project_readme) | Overwrite the README for a project name |
//! | [`bulk_create_files`](ProjectStore::bulk_create_files) | Insert one run's per-file summaries |
//! | [`get_project_id_by_name`](ProjectStore::get_project_id_by_name) | Resolve a name to an id |
//! | [`list_projects`](ProjectStore::list_projects) | List `(id, name)` pairs |
//! | [`get_files_by_project_id`](ProjectStore::get_files_by_project_id) | Fetch stored file records |
//! | [`get_readme_by_project_id`](ProjectStore::get_readme_by_project_id) | Fetch the README text |

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{NewProjectFile, Project, ProjectFile, ProjectSummary};

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Create a project. Fails with `DuplicateProject` if the name is taken.
    async fn create_project(&self, name: &str, git_url: Option<&str>) -> Result<Project>;

    /// Replace the README of the named project. Fails with `ProjectNotFound`.
    async fn update_project_readme(&self, name: &str, readme: &str) -> Result<()>;

    /// Insert all records for one run. Store-assigned ids; empty input is a no-op.
    async fn bulk_create_files(&self, project_id: &str, records: &[NewProjectFile]) -> Result<()>;

    /// Fails with `ProjectNotFound` if no project has this name.
    async fn get_project_id_by_name(&self, name: &str) -> Result<String>;

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>>;

    async fn get_files_by_project_id(&self, project_id: &str) -> Result<Vec<ProjectFile>>;

    /// Empty string when the project is unknown or has no README yet.
    async fn get_readme_by_project_id(&self, project_id: &str) -> Result<String>;
}
