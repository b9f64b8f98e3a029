//! Prompt templates for the map and reduce stages.
//!
//! Templates use `{name}` placeholders filled from a variable map. The
//! wording is tunable; the shape is not: the file prompt asks for a short
//! bounded bullet list without code, which is what the README prompt
//! expects to consume.

use std::collections::BTreeMap;

/// Variables substituted into a [`PromptTemplate`].
pub type PromptVars = BTreeMap<String, String>;

/// Per-file summary request. Variables: `path`, `code`.
pub const FILE_SUMMARY_TEMPLATE: &str = "\
You are a precise code summarizer. Summarize the file below for a README.
Focus on: purpose, key responsibilities, important functions/classes/exports, routes/CLI, \
external deps, and how it fits the project. No code snippets.

PATH: {path}
CONTENT:
```
{code}
```

Output 9-10 concise bullet points.";

/// Final README request. Variables: `summaries`.
pub const README_TEMPLATE: &str = "\
You will write a high-quality README.md for a repository using the condensed file summaries below.
Write concise, actionable documentation without large code blocks. Use fenced blocks only for commands.

FILE SUMMARIES:
{summaries}

Produce README with these sections (only include a section if relevant):
1. Overview (what it is and why it exists)
2. Tech Stack
3. Project Structure (high-level; list major dirs/files and roles)
4. Key Components/Modules/Database-Schema (what they do)
5. Setup (install) [include how to create a virtual env or otherwise install dependencies if needed]
6. Usage (run, CLI or API quickstart; sample commands/endpoints)
7. Configuration (env vars table: NAME | Purpose | Required | Default)
8. Data Model (entities/relations if present)
9. Testing (how to run tests)
10. Deployment (Docker/CI/CD/cloud hints)
11. Roadmap/Limitations
Keep it crisp and dev-friendly.";

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn file_summary() -> Self {
        Self::new(FILE_SUMMARY_TEMPLATE)
    }

    pub fn readme() -> Self {
        Self::new(README_TEMPLATE)
    }

    /// Fill placeholders in a single left-to-right pass.
    ///
    /// Substituted values are never rescanned, so a file containing `{path}`
    /// is passed through literally. Unknown placeholders are left untouched.
    pub fn render(&self, vars: &PromptVars) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    let key = &after[..close];
                    match vars.get(key) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push('{');
                            out.push_str(key);
                            out.push('}');
                        }
                    }
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Build a [`PromptVars`] map from `(name, value)` pairs.
pub fn vars<const N: usize>(pairs: [(&str, &str); N]) -> PromptVars {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_known_vars() {
        let t = PromptTemplate::new("PATH: {path}\n{code}");
        let out = t.render(&vars([("path", "a.py"), ("code", "print(1)")]));
        assert_eq!(out, "PATH: a.py\nprint(1)");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let t = PromptTemplate::new("{code}|{path}");
        let out = t.render(&vars([("path", "p"), ("code", "fn x() { {path} }")]));
        assert_eq!(out, "fn x() { {path} }|p");
    }

    #[test]
    fn test_render_leaves_unknown_and_unclosed_braces() {
        let t = PromptTemplate::new("{missing} and {open");
        assert_eq!(t.render(&PromptVars::new()), "{missing} and {open");
    }

    #[test]
    fn test_file_summary_template_shape() {
        let out = PromptTemplate::file_summary().render(&vars([("path", "src/app.py"), ("code", "x = 1")]));
        assert!(out.contains("PATH: src/app.py"));
        assert!(out.contains("```\nx = 1\n```"));
        assert!(out.contains("No code snippets."));
    }

    #[test]
    fn test_readme_template_lists_eleven_sections() {
        let out = PromptTemplate::readme().render(&vars([("summaries", "### a.py\n- does a")]));
        assert!(out.contains("### a.py\n- does a"));
        assert!(out.contains("1. Overview"));
        assert!(out.contains("11. Roadmap/Limitations"));
        assert!(!out.contains("{summaries}"));
    }
}
