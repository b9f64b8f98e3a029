//! Repository cloning via the `git` CLI.
//!
//! The clone is a precondition for aggregation: any failure (bad URL,
//! occupied destination, git error) is returned to the caller instead of
//! leaving an empty tree behind for the aggregator to walk.

use std::path::{Path, PathBuf};

use reqwest::Url;
use tokio::process::Command;
use tracing::info;

use repodoc_core::error::{Error, Result};

use crate::config::CloneConfig;

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ssh", "git", "file"];

/// Check that `url` is an absolute URL with a scheme git can clone from.
pub fn validate_git_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|e| Error::InvalidGitUrl(format!("{}: {}", url, e)))?;
    if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
        return Err(Error::InvalidGitUrl(format!(
            "{}: unsupported scheme '{}'",
            url,
            parsed.scheme()
        )));
    }
    if parsed.scheme() != "file" && parsed.host_str().map_or(true, str::is_empty) {
        return Err(Error::InvalidGitUrl(format!("{}: missing host", url)));
    }
    Ok(parsed)
}

/// Clone `url` into `dest`.
///
/// `dest` must not exist, or be an empty directory.
pub async fn clone_repo(url: &str, dest: &Path, opts: &CloneConfig) -> Result<PathBuf> {
    let url = validate_git_url(url)?;

    if dest.exists() && !is_empty_dir(dest)? {
        return Err(Error::CloneFailed(format!(
            "destination already exists: {}",
            dest.display()
        )));
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut cmd = Command::new("git");
    cmd.arg("clone");
    if opts.shallow {
        cmd.args(["--depth", "1"]);
    }
    if let Some(branch) = &opts.branch {
        cmd.args(["--branch", branch.as_str(), "--single-branch"]);
    }
    cmd.arg(url.as_str()).arg(dest);

    let output = cmd
        .output()
        .await
        .map_err(|e| Error::CloneFailed(format!("failed to execute 'git clone' (is git installed?): {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::CloneFailed(format!(
            "git clone {} failed: {}",
            url,
            stderr.trim()
        )));
    }

    info!(url = %url, dest = %dest.display(), "repository cloned");
    Ok(dest.to_path_buf())
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    if !path.is_dir() {
        return Ok(false);
    }
    Ok(std::fs::read_dir(path)?.next().is_none())
}
