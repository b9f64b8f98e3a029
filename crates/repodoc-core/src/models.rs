//! Core data models used throughout repodoc.
//!
//! Source files flow from the aggregator into the artifact, come back out
//! as [`ParsedBlock`]s, and leave the map stage as [`NewProjectFile`]
//! records ready for persistence.

use serde::{Deserialize, Serialize};

/// A file selected during aggregation. Never persisted directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// POSIX-style path relative to the repository root.
    pub relative_path: String,
    /// Leniently decoded text content.
    pub content: String,
}

/// One file's slice of the aggregate artifact, read back by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBlock {
    pub path: String,
    pub code: String,
}

impl ParsedBlock {
    pub fn new(path: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
        }
    }
}

/// A registered project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub project_name: String,
    pub git_url: Option<String>,
    pub readme_doc: Option<String>,
    pub created_at: i64,
}

/// Lightweight listing entry returned by `list_projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub project_id: String,
    pub project_name: String,
}

/// A per-file summary produced by the map stage, before the store assigns ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProjectFile {
    pub file_name: String,
    pub file_content: String,
    pub file_summary: String,
}

/// A persisted per-file summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub file_id: String,
    pub project_id: String,
    pub file_name: String,
    pub file_content: String,
    pub file_summary: String,
}
