//! # repodoc core
//!
//! Filesystem-free logic for repodoc: data models, the error taxonomy, the
//! aggregate artifact block format, prompt templates, the language model
//! and project store traits, and the map and reduce stages.
//!
//! This crate contains no tokio runtime, sqlx, or filesystem I/O. The
//! `repodoc` crate supplies the aggregator, concrete model clients, the
//! SQLite store, and the orchestrator on top of it.

pub mod block;
pub mod compose;
pub mod error;
pub mod llm;
pub mod models;
pub mod name;
pub mod prompt;
pub mod store;
pub mod summarize;

pub use error::{Error, Result};
