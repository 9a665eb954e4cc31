//! The `examgate validate` command.

use std::path::PathBuf;

use anyhow::Result;

use examgate_core::ingest::validate_questions;
use examgate_core::model::Question;

use super::{load_questions, SourceFormat};

pub fn execute(input: PathBuf, format: Option<String>) -> Result<()> {
    let format = SourceFormat::resolve(format.as_deref(), &input)?;
    let questions = load_questions(&input, format)?;

    if questions.is_empty() {
        println!("No questions detected in {}.", input.display());
        return Ok(());
    }

    let mcq = questions
        .iter()
        .filter(|q| matches!(q, Question::Mcq { .. }))
        .count();
    println!(
        "{}: {} questions ({} mcq, {} long)",
        input.display(),
        questions.len(),
        mcq,
        questions.len() - mcq
    );

    let warnings = validate_questions(&questions);
    for w in &warnings {
        let prefix = w
            .question_id
            .map(|id| format!("  [Q{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Question set is valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
