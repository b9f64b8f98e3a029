//! Error taxonomy shared by every pipeline stage.
//!
//! Each variant is a distinguishable failure kind so callers (CLI, HTTP
//! server) can translate it without string matching. Per-file model
//! failures in the map stage never surface here; they are recorded as
//! placeholder summaries instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("repository directory not found: {0}")]
    RepositoryNotFound(String),

    #[error("aggregate artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("project already exists: {0}")]
    DuplicateProject(String),

    #[error("invalid project name: {0:?}")]
    InvalidProjectName(String),

    #[error("invalid git url: {0}")]
    InvalidGitUrl(String),

    #[error("clone failed: {0}")]
    CloneFailed(String),

    #[error("model call failed: {0}")]
    ModelCall(String),

    #[error("store write failed: {0}")]
    StoreWrite(String),

    #[error("a run for project '{0}' is already in progress")]
    RunInProgress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Short machine-readable code, used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::RepositoryNotFound(_) => "repository_not_found",
            Error::ArtifactNotFound(_) => "artifact_not_found",
            Error::ProjectNotFound(_) => "project_not_found",
            Error::DuplicateProject(_) => "duplicate_project",
            Error::InvalidProjectName(_) => "invalid_project_name",
            Error::InvalidGitUrl(_) => "invalid_git_url",
            Error::CloneFailed(_) => "clone_failed",
            Error::ModelCall(_) => "model_call_failed",
            Error::StoreWrite(_) => "store_write_failed",
            Error::RunInProgress(_) => "run_in_progress",
            Error::Io(_) => "io_error",
        }
    }
}
