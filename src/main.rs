//! # repodoc CLI
//!
//! Turns a Git repository into a generated README: clone, aggregate the
//! source files into one artifact, summarize each file with a language
//! model, then compose the README from those summaries.
//!
//! ## Usage
//!
//! ```bash
//! repodoc --config ./config/repodoc.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `repodoc init` | Create the SQLite database and schema |
//! | `repodoc register <name>` | Register a project |
//! | `repodoc clone <name> <url>` | Clone a repository into the output root |
//! | `repodoc aggregate <name>` | Write the aggregate artifact |
//! | `repodoc run <name>` | Summarize the artifact and write the README |
//! | `repodoc generate <name> <url>` | register → clone → aggregate → run |
//! | `repodoc projects` | List registered projects |
//! | `repodoc files <id>` | Show stored per-file summaries |
//! | `repodoc readme <id>` | Print the stored README |
//! | `repodoc serve` | Start the HTTP API |
//!
//! ## Examples
//!
//! ```bash
//! repodoc init
//! repodoc generate demo https://github.com/org/demo.git
//! RUST_LOG=repodoc=debug repodoc run demo
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use repodoc::{commands, config, migrate, server};

/// repodoc: generate README documentation for Git repositories.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/repodoc.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "repodoc",
    about = "Generate README documentation for a Git repository with an LLM",
    version,
    long_about = "repodoc clones a repository, aggregates its source files into one artifact, \
    summarizes each file with a language model (map), and composes a README from the \
    summaries (reduce). Results are stored in SQLite and served over a small HTTP API."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/repodoc.toml`. Commands that do not touch the
    /// database or the model fall back to built-in defaults when it is missing.
    #[arg(long, global = true, default_value = "./config/repodoc.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `projects` and
    /// `project_files` tables. Safe to run repeatedly.
    Init,

    /// Register a project by name.
    Register {
        /// Project name; only the last path segment is kept.
        name: String,

        /// Remote the project is cloned from.
        #[arg(long)]
        git_url: Option<String>,
    },

    /// Clone a repository into `<output>/git/<name>`.
    Clone { name: String, url: String },

    /// Aggregate the project's cloned tree into one artifact file.
    Aggregate {
        name: String,

        /// Skip files larger than this many bytes.
        #[arg(long)]
        max_bytes: Option<u64>,
    },

    /// Summarize the aggregate artifact and write the README.
    ///
    /// The project must be registered and aggregated first.
    Run { name: String },

    /// Register, clone, aggregate, and run in one step.
    Generate { name: String, url: String },

    /// List registered projects.
    Projects,

    /// Show stored per-file summaries for a project id.
    Files { project_id: String },

    /// Print the stored README for a project id.
    Readme { project_id: String },

    /// Start the HTTP API on `[server].bind`.
    Serve,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("repodoc=info,repodoc_core=info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // Commands that only touch the filesystem work without a config file,
    // but a config file that exists must be valid
    match &cli.command {
        Commands::Clone { name, url } => {
            let cfg = config::load_config_or_default(&cli.config)?;
            return commands::run_clone(&cfg, name, url).await;
        }
        Commands::Aggregate { name, max_bytes } => {
            let cfg = config::load_config_or_default(&cli.config)?;
            return commands::run_aggregate(&cfg, name, *max_bytes);
        }
        _ => {}
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Register { name, git_url } => {
            commands::run_register(&cfg, &name, git_url.as_deref()).await?;
        }
        Commands::Run { name } => {
            commands::run_pipeline(&cfg, &name).await?;
        }
        Commands::Generate { name, url } => {
            commands::run_generate(&cfg, &name, &url).await?;
        }
        Commands::Projects => {
            commands::run_list_projects(&cfg).await?;
        }
        Commands::Files { project_id } => {
            commands::run_list_files(&cfg, &project_id).await?;
        }
        Commands::Readme { project_id } => {
            commands::run_show_readme(&cfg, &project_id).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Clone { .. } | Commands::Aggregate { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
