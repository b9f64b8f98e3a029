//! Reduce stage: one README from all per-file summaries.
//!
//! Unlike the map stage, a model failure here is fatal. The README is the
//! single deliverable of a run, so nothing partial is returned. The model
//! output is passed through untouched.

use tracing::info;

use crate::error::Result;
use crate::llm::LanguageModel;
use crate::prompt::{vars, PromptTemplate};

pub async fn compose_readme(llm: &dyn LanguageModel, combined_summary: &str) -> Result<String> {
    let readme = llm
        .complete_template(
            &PromptTemplate::readme(),
            &vars([("summaries", combined_summary)]),
        )
        .await?;
    info!(
        model = llm.model_name(),
        chars = readme.len(),
        "reduce stage complete"
    );
    Ok(readme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::llm::{DisabledModel, ScriptedModel};

    #[tokio::test]
    async fn test_single_call_with_summaries() {
        let llm = ScriptedModel::new("  # Demo\n\nOverview.  ");
        let readme = compose_readme(&llm, "### a.py\n- prints").await.unwrap();

        assert_eq!(readme, "  # Demo\n\nOverview.  ");
        assert_eq!(llm.call_count(), 1);
        assert!(llm.prompts()[0].contains("FILE SUMMARIES:\n### a.py\n- prints"));
    }

    #[tokio::test]
    async fn test_failure_is_surfaced() {
        let err = compose_readme(&DisabledModel, "### a.py\n- x").await.unwrap_err();
        assert!(matches!(err, Error::ModelCall(_)));
    }
}
