//! CLI command implementations.
//!
//! Each `run_*` function builds what its command needs (the SQLite store,
//! an [`Orchestrator`], or just the output layout) and prints results to
//! stdout. Logs go to stderr, so stdout stays usable in scripts.

use anyhow::{Context, Result};
use std::sync::Arc;

use repodoc_core::llm::{DisabledModel, LanguageModel};
use repodoc_core::name::ProjectName;
use repodoc_core::store::ProjectStore;

use crate::aggregate::{aggregate_project, AggregateOptions};
use crate::config::Config;
use crate::git::clone_repo;
use crate::layout::OutputLayout;
use crate::llm::create_model;
use crate::pipeline::{Orchestrator, RunReport};
use crate::sqlite_store::SqliteStore;
use crate::{db, migrate};

async fn open_store(config: &Config) -> Result<Arc<SqliteStore>> {
    let pool = db::connect(config).await?;
    migrate::apply(&pool).await?;
    Ok(Arc::new(SqliteStore::new(pool)))
}

async fn orchestrator(config: &Config, llm: Arc<dyn LanguageModel>) -> Result<Orchestrator> {
    let store = open_store(config).await?;
    Orchestrator::from_config(config, store, llm)
}

/// Orchestrator for commands that never call the model.
async fn offline_orchestrator(config: &Config) -> Result<Orchestrator> {
    orchestrator(config, Arc::new(DisabledModel)).await
}

pub async fn run_register(config: &Config, name: &str, git_url: Option<&str>) -> Result<()> {
    let orch = offline_orchestrator(config).await?;
    let project = orch
        .register(name, git_url)
        .await
        .with_context(|| format!("Failed to register project '{}'", name))?;
    println!("Registered project {} ({})", project.project_name, project.project_id);
    Ok(())
}

pub async fn run_clone(config: &Config, name: &str, url: &str) -> Result<()> {
    let name = ProjectName::sanitize(name)?;
    let layout = OutputLayout::new(&config.output.root);
    let dest = clone_repo(url, &layout.repo_dir(&name), &config.clone)
        .await
        .with_context(|| format!("Failed to clone {}", url))?;
    println!("Cloned {} into {}", url, dest.display());
    Ok(())
}

pub fn run_aggregate(config: &Config, name: &str, max_bytes: Option<u64>) -> Result<()> {
    let layout = OutputLayout::new(&config.output.root);
    let mut opts = AggregateOptions::from_config(&config.aggregate)?;
    if max_bytes.is_some() {
        opts = opts.with_max_bytes(max_bytes);
    }

    let report = aggregate_project(&layout, name, &opts)
        .with_context(|| format!("Failed to aggregate project '{}'", name))?;

    println!("Aggregated {} files", report.file_count);
    if report.skipped > 0 {
        println!("  skipped: {}", report.skipped);
    }
    println!("  sha256:  {}", report.sha256);
    println!("  output:  {}", report.artifact_path.display());
    Ok(())
}

pub async fn run_pipeline(config: &Config, name: &str) -> Result<()> {
    let llm = create_model(&config.llm)?;
    let orch = orchestrator(config, llm).await?;
    let report = orch
        .run(name)
        .await
        .with_context(|| format!("README generation failed for '{}'", name))?;
    print_run_report(&report);
    Ok(())
}

pub async fn run_generate(config: &Config, name: &str, url: &str) -> Result<()> {
    let llm = create_model(&config.llm)?;
    let orch = orchestrator(config, llm).await?;
    let report = orch
        .generate(name, url)
        .await
        .with_context(|| format!("README generation failed for '{}'", name))?;
    print_run_report(&report);
    Ok(())
}

fn print_run_report(report: &RunReport) {
    println!("README written for {}", report.project_name);
    println!("  files summarized: {}", report.files_summarized);
    if report.files_failed > 0 {
        println!("  summaries failed: {}", report.files_failed);
    }
    println!("  output: {}", report.readme_path.display());
}

pub async fn run_list_projects(config: &Config) -> Result<()> {
    let store = open_store(config).await?;
    let projects = store.list_projects().await?;

    if projects.is_empty() {
        println!("No projects registered.");
        return Ok(());
    }
    for p in projects {
        println!("{}  {}", p.project_id, p.project_name);
    }
    Ok(())
}

pub async fn run_list_files(config: &Config, project_id: &str) -> Result<()> {
    let store = open_store(config).await?;
    let files = store.get_files_by_project_id(project_id).await?;

    if files.is_empty() {
        println!("No files stored for project {}.", project_id);
        return Ok(());
    }
    for (i, f) in files.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("### {}", f.file_name);
        println!("{}", f.file_summary);
    }
    Ok(())
}

pub async fn run_show_readme(config: &Config, project_id: &str) -> Result<()> {
    let store = open_store(config).await?;
    let readme = store.get_readme_by_project_id(project_id).await?;
    if readme.is_empty() {
        println!("No README stored for project {}.", project_id);
    } else {
        println!("{}", readme);
    }
    Ok(())
}
