//! Project name sanitization.
//!
//! Project names end up as directory names under the output root, so only
//! the final path segment of whatever the caller passed is kept.

use std::fmt;

use crate::error::{Error, Result};

/// A project name reduced to a single safe path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectName(String);

impl ProjectName {
    /// Trim whitespace and quotes, then keep only the last path segment.
    ///
    /// `"../../etc"` becomes `etc`, `"output/git/foo/"` becomes `foo`.
    /// Names that reduce to nothing, `.`, `..`, or contain NUL are rejected.
    ///
    /// ```rust
    /// use repodoc_core::name::ProjectName;
    ///
    /// assert_eq!(ProjectName::sanitize("../../etc").unwrap().as_str(), "etc");
    /// assert!(ProjectName::sanitize("..").is_err());
    /// ```
    pub fn sanitize(raw: &str) -> Result<Self> {
        let trimmed = raw
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .trim();

        let last = trimmed
            .split(['/', '\\'])
            .filter(|s| !s.is_empty())
            .last()
            .unwrap_or("");

        if last.is_empty() || last == "." || last == ".." || last.contains('\0') {
            return Err(Error::InvalidProjectName(raw.to_string()));
        }

        Ok(Self(last.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
