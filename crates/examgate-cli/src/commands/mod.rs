//! CLI subcommand implementations.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

use examgate_core::model::Question;

pub mod grade;
pub mod ingest;
pub mod init;
pub mod report;
pub mod validate;

/// How a question source is structured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Loosely-structured question text ("Question 1", options, ...).
    Text,
    /// A JSON array of string-keyed rows exported from a spreadsheet.
    Rows,
}

impl SourceFormat {
    /// Resolve an explicit `--format` value, falling back to the file
    /// extension (`.json` means rows).
    pub fn resolve(explicit: Option<&str>, path: &Path) -> Result<Self> {
        match explicit {
            Some("text") => Ok(SourceFormat::Text),
            Some("rows") => Ok(SourceFormat::Rows),
            Some(other) => anyhow::bail!("unknown source format '{other}' (expected text or rows)"),
            None => Ok(if path.extension().is_some_and(|ext| ext == "json") {
                SourceFormat::Rows
            } else {
                SourceFormat::Text
            }),
        }
    }
}

/// Load and parse a question source file with either front end.
pub fn load_questions(path: &Path, format: SourceFormat) -> Result<Vec<Question>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question source: {}", path.display()))?;

    match format {
        SourceFormat::Text => Ok(examgate_core::ingest::parse_text(&content)),
        SourceFormat::Rows => {
            let rows: Vec<HashMap<String, String>> = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse rows JSON: {}", path.display()))?;
            examgate_core::ingest::parse_rows(&rows)
                .with_context(|| format!("ingestion failed for {}", path.display()))
        }
    }
}
