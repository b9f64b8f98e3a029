//! Pipeline orchestration: artifact → map → reduce → persist.
//!
//! The [`Orchestrator`] owns the store, the model client, and the output
//! layout for the lifetime of the process, and is shared by the CLI and
//! the HTTP server. A run moves through named [`Stage`]s and logs every
//! transition.
//!
//! ```text
//! generate:  register ─▶ clone ─▶ aggregate ─▶ run
//! run:       Aggregated ─▶ Parsed ─▶ Mapped ─▶ Reduced ─▶ Persisted
//! ```
//!
//! Only one run per project may be in flight; a second one fails fast with
//! `RunInProgress`. Runs for different projects are independent.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::info;

use repodoc_core::compose::compose_readme;
use repodoc_core::error::{Error, Result};
use repodoc_core::llm::LanguageModel;
use repodoc_core::models::Project;
use repodoc_core::name::ProjectName;
use repodoc_core::store::ProjectStore;
use repodoc_core::summarize::{summarize_and_persist, MapLimits};

use crate::aggregate::{aggregate_project, AggregateOptions, AggregateReport};
use crate::artifact::parse_artifact;
use crate::config::{CloneConfig, Config};
use crate::git::{clone_repo, validate_git_url};
use crate::layout::OutputLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Aggregated,
    Parsed,
    Mapped,
    Reduced,
    Persisted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Aggregated => "aggregated",
            Stage::Parsed => "parsed",
            Stage::Mapped => "mapped",
            Stage::Reduced => "reduced",
            Stage::Persisted => "persisted",
        };
        f.write_str(s)
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub project_name: String,
    pub readme_path: PathBuf,
    pub files_summarized: usize,
    pub files_failed: usize,
}

pub struct Orchestrator {
    store: Arc<dyn ProjectStore>,
    llm: Arc<dyn LanguageModel>,
    layout: OutputLayout,
    aggregate_opts: AggregateOptions,
    clone_opts: CloneConfig,
    limits: MapLimits,
    running: Mutex<HashSet<String>>,
}

/// Releases the project's run lock on drop.
struct RunGuard<'a> {
    running: &'a Mutex<HashSet<String>>,
    name: String,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut running) = self.running.lock() {
            running.remove(&self.name);
        }
    }
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn ProjectStore>,
        llm: Arc<dyn LanguageModel>,
        layout: OutputLayout,
        aggregate_opts: AggregateOptions,
    ) -> Self {
        Self {
            store,
            llm,
            layout,
            aggregate_opts,
            clone_opts: CloneConfig::default(),
            limits: MapLimits::default(),
            running: Mutex::new(HashSet::new()),
        }
    }

    pub fn from_config(
        config: &Config,
        store: Arc<dyn ProjectStore>,
        llm: Arc<dyn LanguageModel>,
    ) -> anyhow::Result<Self> {
        let opts = AggregateOptions::from_config(&config.aggregate)?;
        Ok(Self::new(store, llm, OutputLayout::new(&config.output.root), opts)
            .with_limits(config.summarize.limits())
            .with_clone_options(config.clone.clone()))
    }

    pub fn with_limits(mut self, limits: MapLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_clone_options(mut self, opts: CloneConfig) -> Self {
        self.clone_opts = opts;
        self
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn store(&self) -> &Arc<dyn ProjectStore> {
        &self.store
    }

    fn lock(&self, name: &ProjectName) -> Result<RunGuard<'_>> {
        let mut running = self
            .running
            .lock()
            .map_err(|_| Error::RunInProgress(name.to_string()))?;
        if !running.insert(name.to_string()) {
            return Err(Error::RunInProgress(name.to_string()));
        }
        Ok(RunGuard {
            running: &self.running,
            name: name.to_string(),
        })
    }

    /// Create the project record. The URL, when given, must be valid.
    pub async fn register(&self, project_name: &str, git_url: Option<&str>) -> Result<Project> {
        let name = ProjectName::sanitize(project_name)?;
        if let Some(url) = git_url {
            validate_git_url(url)?;
        }
        let project = self.store.create_project(name.as_str(), git_url).await?;
        info!(project = %name, id = %project.project_id, "project registered");
        Ok(project)
    }

    /// Clone `git_url` into the project's repository directory.
    pub async fn clone_repository(&self, project_name: &str, git_url: &str) -> Result<PathBuf> {
        let name = ProjectName::sanitize(project_name)?;
        clone_repo(git_url, &self.layout.repo_dir(&name), &self.clone_opts).await
    }

    /// Write the aggregate artifact from the project's cloned tree.
    ///
    /// The walk and file reads run on the blocking pool.
    pub async fn aggregate(&self, project_name: &str) -> Result<AggregateReport> {
        let layout = self.layout.clone();
        let opts = self.aggregate_opts.clone();
        let name = project_name.to_string();
        tokio::task::spawn_blocking(move || aggregate_project(&layout, &name, &opts))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(format!("aggregate task panicked: {}", e))))?
    }

    /// Summarize the project's artifact into a README.
    ///
    /// Per-file model failures are recorded and do not stop the run; a
    /// reduce-stage failure does, leaving the stored README untouched.
    pub async fn run(&self, project_name: &str) -> Result<RunReport> {
        let name = ProjectName::sanitize(project_name)?;
        let _guard = self.lock(&name)?;
        self.run_locked(&name).await
    }

    /// Full flow: register → clone → aggregate → run.
    ///
    /// A failed clone stops the flow; the project record stays registered.
    pub async fn generate(&self, project_name: &str, git_url: &str) -> Result<RunReport> {
        let name = ProjectName::sanitize(project_name)?;
        validate_git_url(git_url)?;
        let _guard = self.lock(&name)?;

        self.register(name.as_str(), Some(git_url)).await?;
        self.clone_repository(name.as_str(), git_url).await?;
        let report = self.aggregate(name.as_str()).await?;
        info!(
            project = %name,
            files = report.file_count,
            skipped = report.skipped,
            "aggregate written"
        );
        self.run_locked(&name).await
    }

    async fn run_locked(&self, name: &ProjectName) -> Result<RunReport> {
        let artifact_path = self.layout.artifact_path(name);
        info!(project = %name, stage = %Stage::Aggregated, path = %artifact_path.display(), "run started");

        let blocks = parse_artifact(&artifact_path)?;
        info!(project = %name, stage = %Stage::Parsed, blocks = blocks.len(), "stage complete");

        let mapped = summarize_and_persist(
            self.llm.as_ref(),
            self.store.as_ref(),
            &blocks,
            name.as_str(),
            &self.limits,
        )
        .await?;
        info!(
            project = %name,
            stage = %Stage::Mapped,
            records = mapped.records.len(),
            failed = mapped.failed,
            "stage complete"
        );

        let readme = compose_readme(self.llm.as_ref(), &mapped.combined_summary).await?;
        info!(project = %name, stage = %Stage::Reduced, chars = readme.len(), "stage complete");

        self.store
            .update_project_readme(name.as_str(), &readme)
            .await?;
        std::fs::create_dir_all(self.layout.readme_dir(name))?;
        let readme_path = self.layout.readme_path(name);
        std::fs::write(&readme_path, &readme)?;
        info!(project = %name, stage = %Stage::Persisted, path = %readme_path.display(), "stage complete");

        Ok(RunReport {
            project_name: name.to_string(),
            readme_path,
            files_summarized: mapped.records.len(),
            files_failed: mapped.failed,
        })
    }
}
