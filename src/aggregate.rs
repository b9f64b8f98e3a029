//! Aggregator: serialize a cloned repository into one artifact file.
//!
//! Walks the working tree, prunes excluded directories before descending,
//! keeps files whose extension is in the include set, sorts them by
//! case-insensitive relative path, and writes them as blocks (see
//! [`repodoc_core::block`]) to `<output>/aggregate/<name>/aggregated_code.txt`.
//!
//! Individual files that are too large or cannot be read are skipped with
//! a warning. Only a missing repository directory is fatal.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use repodoc_core::block;
use repodoc_core::error::{Error, Result};
use repodoc_core::name::ProjectName;

use crate::config::{normalize_extension, AggregateConfig};
use crate::layout::OutputLayout;

/// File selection rules for one aggregation run.
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Lowercase extensions with a leading dot.
    pub include_extensions: BTreeSet<String>,
    /// Lowercase directory names pruned at any depth.
    pub exclude_dir_names: BTreeSet<String>,
    /// Optional globs over the relative path of files.
    pub exclude_globs: GlobSet,
    pub max_bytes_per_file: Option<u64>,
}

impl AggregateOptions {
    pub fn new<I, J, S, T>(include_extensions: I, exclude_dir_names: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            include_extensions: include_extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .collect(),
            exclude_dir_names: exclude_dir_names
                .into_iter()
                .map(|d| d.as_ref().to_lowercase())
                .collect(),
            exclude_globs: GlobSet::empty(),
            max_bytes_per_file: None,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: Option<u64>) -> Self {
        self.max_bytes_per_file = max_bytes;
        self
    }

    pub fn from_config(config: &AggregateConfig) -> anyhow::Result<Self> {
        let mut opts = Self::new(config.extension_set(), config.exclude_dir_set())
            .with_max_bytes(config.max_bytes_per_file);
        opts.exclude_globs = build_globset(&config.exclude_globs)?;
        Ok(opts)
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self
                .exclude_dir_names
                .contains(&entry.file_name().to_string_lossy().to_lowercase())
    }

    fn is_included_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .is_some_and(|ext| self.include_extensions.contains(&ext))
    }
}

/// Outcome of one aggregation run.
#[derive(Debug, Clone)]
pub struct AggregateReport {
    pub artifact_path: PathBuf,
    pub file_count: usize,
    pub skipped: usize,
    /// Hex SHA-256 of the artifact bytes.
    pub sha256: String,
}

/// Aggregate the project's clone under `layout` (`<root>/git/<name>`).
pub fn aggregate_project(
    layout: &OutputLayout,
    project_name: &str,
    opts: &AggregateOptions,
) -> Result<AggregateReport> {
    let name = ProjectName::sanitize(project_name)?;
    aggregate(&layout.repo_dir(&name), layout, project_name, opts)
}

/// Aggregate `repo_root` into the artifact for `project_name`.
///
/// The project name is sanitized before any output path is built; the
/// artifact is fully overwritten.
pub fn aggregate(
    repo_root: &Path,
    layout: &OutputLayout,
    project_name: &str,
    opts: &AggregateOptions,
) -> Result<AggregateReport> {
    let name = ProjectName::sanitize(project_name)?;

    if !repo_root.is_dir() {
        return Err(Error::RepositoryNotFound(repo_root.display().to_string()));
    }

    let candidates = collect_candidates(repo_root, opts);
    debug!(
        project = %name,
        candidates = candidates.len(),
        "collected candidate files"
    );

    std::fs::create_dir_all(layout.artifact_dir(&name))?;
    let artifact_path = layout.artifact_path(&name);
    let mut out = BufWriter::new(File::create(&artifact_path)?);
    let mut hasher = Sha256::new();
    let mut buf = String::new();

    let mut file_count = 0;
    let mut skipped = 0;

    for (rel, path) in &candidates {
        let content = match read_candidate(path, opts.max_bytes_per_file) {
            Ok(Some(content)) => content,
            Ok(None) => {
                debug!(path = %rel, "skipping oversized file");
                skipped += 1;
                continue;
            }
            Err(e) => {
                warn!(path = %rel, error = %e, "skipping unreadable file");
                skipped += 1;
                continue;
            }
        };

        buf.clear();
        block::write_block(&mut buf, rel, &content);
        out.write_all(buf.as_bytes())?;
        hasher.update(buf.as_bytes());
        file_count += 1;
    }
    out.flush()?;

    let sha256 = format!("{:x}", hasher.finalize());
    info!(
        project = %name,
        files = file_count,
        skipped,
        artifact = %artifact_path.display(),
        "aggregation complete"
    );

    Ok(AggregateReport {
        artifact_path,
        file_count,
        skipped,
        sha256,
    })
}

/// Walk the tree and return `(relative_posix_path, absolute_path)` pairs,
/// sorted by case-insensitive relative path.
fn collect_candidates(repo_root: &Path, opts: &AggregateOptions) -> Vec<(String, PathBuf)> {
    let walker = WalkDir::new(repo_root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !opts.is_excluded_dir(e));

    let mut candidates = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        // Symlinked files are read through the link; linked dirs are not entered.
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file || !opts.is_included_file(entry.path()) {
            continue;
        }

        let rel = to_posix(entry.path().strip_prefix(repo_root).unwrap_or(entry.path()));
        if opts.exclude_globs.is_match(&rel) {
            continue;
        }
        candidates.push((rel, entry.into_path()));
    }

    // Exact path breaks ties between names differing only in case.
    candidates.sort_by(|(a, _), (b, _)| a.to_lowercase().cmp(&b.to_lowercase()).then(a.cmp(b)));
    candidates
}

/// `Ok(None)` when the file exceeds the size limit.
fn read_candidate(path: &Path, max_bytes: Option<u64>) -> anyhow::Result<Option<String>> {
    if let Some(max) = max_bytes {
        let size = std::fs::metadata(path)
            .with_context(|| format!("stat {}", path.display()))?
            .len();
        if size > max {
            return Ok(None);
        }
    }
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

fn to_posix(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("invalid glob: {}", pattern))?);
    }
    Ok(builder.build()?)
}
