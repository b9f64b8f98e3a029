//! On-disk layout of the output root.
//!
//! ```text
//! <root>/git/<name>/                          cloned working tree
//! <root>/aggregate/<name>/aggregated_code.txt aggregate artifact
//! <root>/readme/<name>/readme.md              generated README
//! ```
//!
//! Every path is built from a sanitized [`ProjectName`], so a single
//! segment is ever appended below each subdirectory.

use std::path::{Path, PathBuf};

use repodoc_core::name::ProjectName;

pub const ARTIFACT_FILE_NAME: &str = "aggregated_code.txt";
pub const README_FILE_NAME: &str = "readme.md";

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repo_dir(&self, name: &ProjectName) -> PathBuf {
        self.root.join("git").join(name.as_str())
    }

    pub fn artifact_dir(&self, name: &ProjectName) -> PathBuf {
        self.root.join("aggregate").join(name.as_str())
    }

    pub fn artifact_path(&self, name: &ProjectName) -> PathBuf {
        self.artifact_dir(name).join(ARTIFACT_FILE_NAME)
    }

    pub fn readme_dir(&self, name: &ProjectName) -> PathBuf {
        self.root.join("readme").join(name.as_str())
    }

    pub fn readme_path(&self, name: &ProjectName) -> PathBuf {
        self.readme_dir(name).join(README_FILE_NAME)
    }
}
