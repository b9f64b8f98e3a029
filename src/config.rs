//! TOML configuration parsing and validation.
//!
//! Every section except `[db]` is optional and falls back to defaults, so a
//! minimal file only names the database path.
//!
//! ```toml
//! [db]
//! path = "./data/repodoc.sqlite"
//!
//! [output]
//! root = "./output"
//!
//! [aggregate]
//! include_extensions = [".py", ".rs"]
//! exclude_dirs = ["node_modules", ".git"]
//! max_bytes_per_file = 200000
//!
//! [summarize]
//! max_files = 50
//! max_snippet_chars = 6000
//!
//! [llm]
//! provider = "openai"
//! model = "gpt-4o-mini"
//!
//! [clone]
//! shallow = true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use repodoc_core::summarize::MapLimits;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub aggregate: AggregateConfig,
    #[serde(default)]
    pub summarize: SummarizeConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub clone: CloneConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_root")]
    pub root: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_output_root(),
        }
    }
}

fn default_output_root() -> PathBuf {
    PathBuf::from("./output")
}

#[derive(Debug, Deserialize, Clone)]
pub struct AggregateConfig {
    #[serde(default = "default_include_extensions")]
    pub include_extensions: Vec<String>,
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub max_bytes_per_file: Option<u64>,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            include_extensions: default_include_extensions(),
            exclude_dirs: default_exclude_dirs(),
            exclude_globs: Vec::new(),
            max_bytes_per_file: None,
        }
    }
}

impl AggregateConfig {
    /// Extensions lowercased, with a leading dot.
    pub fn extension_set(&self) -> BTreeSet<String> {
        self.include_extensions
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| e.len() > 1)
            .collect()
    }

    /// Directory names lowercased for case-insensitive pruning.
    pub fn exclude_dir_set(&self) -> BTreeSet<String> {
        self.exclude_dirs
            .iter()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect()
    }
}

pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

fn default_include_extensions() -> Vec<String> {
    [
        ".py", ".js", ".jsx", ".ts", ".tsx", ".mjs", ".java", ".kt", ".go", ".rs", ".rb", ".php",
        ".c", ".h", ".cc", ".cpp", ".hpp", ".cs", ".swift", ".scala", ".sh", ".sql", ".html",
        ".css", ".scss", ".vue", ".md", ".toml", ".yaml", ".yml", ".json",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_exclude_dirs() -> Vec<String> {
    [
        ".git",
        ".hg",
        ".svn",
        "node_modules",
        "__pycache__",
        ".venv",
        "venv",
        "env",
        ".mypy_cache",
        ".pytest_cache",
        ".tox",
        "dist",
        "build",
        "target",
        ".next",
        ".idea",
        ".vscode",
        "coverage",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummarizeConfig {
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_max_snippet_chars")]
    pub max_snippet_chars: usize,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_snippet_chars: default_max_snippet_chars(),
            concurrency: default_concurrency(),
        }
    }
}

impl SummarizeConfig {
    pub fn limits(&self) -> MapLimits {
        MapLimits {
            max_files: self.max_files,
            max_snippet_chars: self.max_snippet_chars,
            concurrency: self.concurrency,
        }
    }
}

fn default_max_files() -> usize {
    50
}
fn default_max_snippet_chars() -> usize {
    6000
}
fn default_concurrency() -> usize {
    1
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base URL override (OpenAI-compatible endpoint or Ollama host).
    #[serde(default)]
    pub url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            url: None,
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CloneConfig {
    /// Clone with `--depth 1`; history is never read.
    #[serde(default = "default_shallow")]
    pub shallow: bool,
    #[serde(default)]
    pub branch: Option<String>,
}

impl Default for CloneConfig {
    fn default() -> Self {
        Self {
            shallow: default_shallow(),
            branch: None,
        }
    }
}

fn default_shallow() -> bool {
    true
}

impl Config {
    /// Defaults for commands that can run without a config file.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/repodoc.sqlite"),
            },
            output: OutputConfig::default(),
            aggregate: AggregateConfig::default(),
            summarize: SummarizeConfig::default(),
            llm: LlmConfig::default(),
            server: ServerConfig::default(),
            clone: CloneConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Like [`load_config`], but a missing file yields [`Config::minimal`].
///
/// A file that exists and fails to parse or validate is still an error.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::minimal());
    }
    load_config(path)
}

fn validate(config: &Config) -> Result<()> {
    if config.summarize.max_files == 0 {
        anyhow::bail!("summarize.max_files must be >= 1");
    }
    if config.summarize.max_snippet_chars == 0 {
        anyhow::bail!("summarize.max_snippet_chars must be >= 1");
    }
    if config.summarize.concurrency == 0 {
        anyhow::bail!("summarize.concurrency must be >= 1");
    }

    if config.aggregate.extension_set().is_empty() {
        anyhow::bail!("aggregate.include_extensions must name at least one extension");
    }
    if config.aggregate.max_bytes_per_file == Some(0) {
        anyhow::bail!("aggregate.max_bytes_per_file must be > 0 when set");
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        anyhow::bail!("llm.temperature must be in [0.0, 2.0]");
    }

    match config.llm.provider.as_str() {
        "disabled" | "openai" | "ollama" => {}
        other => anyhow::bail!(
            "Unknown llm provider: '{}'. Must be disabled, openai, or ollama.",
            other
        ),
    }

    Ok(())
}
