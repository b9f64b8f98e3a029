//! In-memory [`ProjectStore`] implementation for tests.
//!
//! Uses `Vec`s behind `std::sync::RwLock`. Insertion order is preserved,
//! which keeps listings deterministic.

use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{NewProjectFile, Project, ProjectFile, ProjectSummary};

use super::ProjectStore;

pub struct InMemoryStore {
    projects: RwLock<Vec<Project>>,
    files: RwLock<Vec<ProjectFile>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            projects: RwLock::new(Vec::new()),
            files: RwLock::new(Vec::new()),
        }
    }

    /// Number of file records across all projects.
    pub fn file_count(&self) -> usize {
        self.files.read().unwrap().len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn create_project(&self, name: &str, git_url: Option<&str>) -> Result<Project> {
        let mut projects = self.projects.write().unwrap();
        if projects.iter().any(|p| p.project_name == name) {
            return Err(Error::DuplicateProject(name.to_string()));
        }
        let project = Project {
            project_id: Uuid::new_v4().to_string(),
            project_name: name.to_string(),
            git_url: git_url.map(str::to_string),
            readme_doc: None,
            created_at: chrono::Utc::now().timestamp(),
        };
        projects.push(project.clone());
        Ok(project)
    }

    async fn update_project_readme(&self, name: &str, readme: &str) -> Result<()> {
        let mut projects = self.projects.write().unwrap();
        let project = projects
            .iter_mut()
            .find(|p| p.project_name == name)
            .ok_or_else(|| Error::ProjectNotFound(name.to_string()))?;
        project.readme_doc = Some(readme.to_string());
        Ok(())
    }

    async fn bulk_create_files(&self, project_id: &str, records: &[NewProjectFile]) -> Result<()> {
        let mut files = self.files.write().unwrap();
        files.extend(records.iter().map(|r| ProjectFile {
            file_id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            file_name: r.file_name.clone(),
            file_content: r.file_content.clone(),
            file_summary: r.file_summary.clone(),
        }));
        Ok(())
    }

    async fn get_project_id_by_name(&self, name: &str) -> Result<String> {
        let projects = self.projects.read().unwrap();
        projects
            .iter()
            .find(|p| p.project_name == name)
            .map(|p| p.project_id.clone())
            .ok_or_else(|| Error::ProjectNotFound(name.to_string()))
    }

    async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let projects = self.projects.read().unwrap();
        Ok(projects
            .iter()
            .map(|p| ProjectSummary {
                project_id: p.project_id.clone(),
                project_name: p.project_name.clone(),
            })
            .collect())
    }

    async fn get_files_by_project_id(&self, project_id: &str) -> Result<Vec<ProjectFile>> {
        let files = self.files.read().unwrap();
        Ok(files
            .iter()
            .filter(|f| f.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn get_readme_by_project_id(&self, project_id: &str) -> Result<String> {
        let projects = self.projects.read().unwrap();
        Ok(projects
            .iter()
            .find(|p| p.project_id == project_id)
            .and_then(|p| p.readme_doc.clone())
            .unwrap_or_default())
    }
}
