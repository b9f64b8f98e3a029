//! Map stage: one bounded summary per file.
//!
//! At most `max_files` blocks are summarized, in order. Each file's content
//! is cut to its first `max_snippet_chars` characters before it is sent to
//! the model, so summaries of large files only reflect their head.
//!
//! A failed model call never aborts the stage: the file gets a placeholder
//! summary recording the failure and still produces a record.
//!
//! With `concurrency > 1` several calls are in flight at once, but results
//! are collected in block order so the combined summary is deterministic.

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::llm::LanguageModel;
use crate::models::{NewProjectFile, ParsedBlock};
use crate::prompt::{vars, PromptTemplate};
use crate::store::ProjectStore;

/// Bounds applied to one map-stage run.
#[derive(Debug, Clone, Copy)]
pub struct MapLimits {
    pub max_files: usize,
    pub max_snippet_chars: usize,
    pub concurrency: usize,
}

impl Default for MapLimits {
    fn default() -> Self {
        Self {
            max_files: 50,
            max_snippet_chars: 6000,
            concurrency: 1,
        }
    }
}

/// Result of the map stage.
#[derive(Debug, Clone, Default)]
pub struct MapOutput {
    /// `### <path>\n<summary>\n` per file, joined with blank lines.
    pub combined_summary: String,
    /// One record per processed file, placeholders included.
    pub records: Vec<NewProjectFile>,
    /// How many records carry a failure placeholder.
    pub failed: usize,
}

/// Summary text recorded for a file whose model call failed.
pub fn failure_placeholder(reason: &str) -> String {
    format!("- (summary failed: {})", reason)
}

/// First `max_chars` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

struct FileSummary {
    summary: String,
    ok: bool,
}

async fn summarize_one(
    llm: &dyn LanguageModel,
    template: &PromptTemplate,
    block: &ParsedBlock,
    max_snippet_chars: usize,
) -> FileSummary {
    let snippet = truncate_chars(&block.code, max_snippet_chars);
    debug!(
        path = %block.path,
        chars = snippet.chars().count(),
        "summarizing file"
    );

    match llm
        .complete_template(template, &vars([("path", block.path.as_str()), ("code", snippet)]))
        .await
    {
        Ok(text) => FileSummary {
            summary: text.trim().to_string(),
            ok: true,
        },
        Err(e) => {
            warn!(path = %block.path, error = %e, "file summary failed");
            FileSummary {
                summary: failure_placeholder(&e.to_string()),
                ok: false,
            }
        }
    }
}

/// Summarize up to `limits.max_files` blocks. Never fails.
pub async fn summarize_files(
    llm: &dyn LanguageModel,
    blocks: &[ParsedBlock],
    limits: &MapLimits,
) -> MapOutput {
    let limit = limits.max_files.min(blocks.len());
    let selected = &blocks[..limit];
    let template = PromptTemplate::file_summary();

    let pending: Vec<_> = selected
        .iter()
        .map(|block| summarize_one(llm, &template, block, limits.max_snippet_chars))
        .collect();
    let results: Vec<FileSummary> = stream::iter(pending)
        .buffered(limits.concurrency.max(1))
        .collect()
        .await;

    let mut sections = Vec::with_capacity(limit);
    let mut records = Vec::with_capacity(limit);
    let mut failed = 0;

    for (block, result) in selected.iter().zip(results) {
        if !result.ok {
            failed += 1;
        }
        sections.push(format!("### {}\n{}\n", block.path, result.summary));
        records.push(NewProjectFile {
            file_name: block.path.clone(),
            file_content: block.code.clone(),
            file_summary: result.summary,
        });
    }

    info!(
        model = llm.model_name(),
        summarized = records.len(),
        failed,
        skipped = blocks.len() - limit,
        "map stage complete"
    );

    MapOutput {
        combined_summary: sections.join("\n"),
        records,
        failed,
    }
}

/// Map stage plus its persistence side effect.
///
/// The project id is resolved before any model call, so an unregistered
/// project fails with `ProjectNotFound` without spending model calls. All
/// records are written in one bulk call after every file has been handled.
pub async fn summarize_and_persist(
    llm: &dyn LanguageModel,
    store: &dyn ProjectStore,
    blocks: &[ParsedBlock],
    project_name: &str,
    limits: &MapLimits,
) -> Result<MapOutput> {
    let project_id = store.get_project_id_by_name(project_name).await?;
    let output = summarize_files(llm, blocks, limits).await;
    store.bulk_create_files(&project_id, &output.records).await?;
    Ok(output)
}
