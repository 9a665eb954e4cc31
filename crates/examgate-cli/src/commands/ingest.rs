//! The `examgate ingest` command.

use std::path::PathBuf;

use anyhow::Result;

use examgate_core::ingest::validate_questions;
use examgate_core::model::Test;
use examgate_core::report::save_test_json;

use super::{load_questions, SourceFormat};

pub fn execute(
    input: PathBuf,
    format: Option<String>,
    id: String,
    title: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let format = SourceFormat::resolve(format.as_deref(), &input)?;
    let questions = load_questions(&input, format)?;

    if questions.is_empty() {
        anyhow::bail!("no questions detected in {}", input.display());
    }

    for w in validate_questions(&questions) {
        let prefix = w
            .question_id
            .map(|id| format!("  [Q{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    let test = Test::new(id, title, questions);
    let (mcq, long) = test.type_counts();
    let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.json", test.id)));
    save_test_json(&test, &output)?;

    println!(
        "Published test \"{}\" ({} questions: {mcq} mcq, {long} long) to {}",
        test.id,
        test.question_count(),
        output.display()
    );

    Ok(())
}
