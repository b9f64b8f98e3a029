//! # repodoc
//!
//! **Generate README documentation for a Git repository with an LLM.**
//!
//! repodoc clones a repository, serializes its source files into a single
//! aggregate artifact, summarizes each file independently (map), and
//! composes one README from those summaries (reduce). Projects, per-file
//! summaries, and READMEs are stored in SQLite and exposed through a CLI
//! and a small HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌──────────────┐   ┌──────────┐
//! │  git     │──▶│ aggregate │──▶│ map / reduce │──▶│  SQLite  │
//! │  clone   │   │ artifact  │   │  (LLM calls) │   │ + readme │
//! └──────────┘   └───────────┘   └──────────────┘   └────┬─────┘
//!                                                        │
//!                                  ┌─────────────────────┤
//!                                  ▼                     ▼
//!                             ┌──────────┐         ┌──────────┐
//!                             │   CLI    │         │   HTTP   │
//!                             │(repodoc) │         │  (axum)  │
//!                             └──────────┘         └──────────┘
//! ```
//!
//! The stage logic that needs no I/O beyond its collaborators (block
//! format, prompts, map and reduce, the store trait) lives in
//! `repodoc-core`; this crate supplies the filesystem, git, SQLite, HTTP
//! model clients, and the orchestrator that wires them together.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`layout`] | Output directory layout |
//! | [`git`] | Repository cloning |
//! | [`aggregate`] | Repository → aggregate artifact |
//! | [`artifact`] | Aggregate artifact → parsed blocks |
//! | [`llm`] | OpenAI and Ollama model clients |
//! | [`pipeline`] | Stage orchestration and run locking |
//! | [`sqlite_store`] | SQLite project store |
//! | [`server`] | HTTP API |
//! | [`commands`] | CLI command implementations |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod aggregate;
pub mod artifact;
pub mod commands;
pub mod config;
pub mod db;
pub mod git;
pub mod layout;
pub mod llm;
pub mod migrate;
pub mod pipeline;
pub mod server;
pub mod sqlite_store;
