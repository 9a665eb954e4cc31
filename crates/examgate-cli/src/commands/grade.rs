//! The `examgate grade` command: offline grading of a responses file.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::Table;
use serde::Deserialize;
use uuid::Uuid;

use examgate_core::grader::{GraderConfig, GradingOrchestrator};
use examgate_core::model::Submission;
use examgate_core::report::{load_test_json, save_submissions_json};
use examgate_similarity::{create_grader, load_config_from};

/// Input shape for a responses file.
#[derive(Debug, Deserialize)]
struct ResponsesFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    responses: BTreeMap<u32, String>,
}

pub async fn execute(
    test_path: PathBuf,
    submission_path: PathBuf,
    grader_url: Option<String>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let test = load_test_json(&test_path)?;

    let content = std::fs::read_to_string(&submission_path).with_context(|| {
        format!("failed to read responses from {}", submission_path.display())
    })?;
    let responses_file: ResponsesFile =
        serde_json::from_str(&content).context("failed to parse responses JSON")?;

    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(url) = grader_url {
        config.grader.base_url = url;
    }

    let orchestrator = GradingOrchestrator::new(
        create_grader(&config),
        GraderConfig {
            parallelism: config.parallelism,
            call_timeout: Duration::from_secs(config.grader.timeout_secs),
        },
    );

    let graded = orchestrator
        .grade(&test.questions, &responses_file.responses)
        .await;

    let mut table = Table::new();
    table.set_header(["#", "Question", "Score", "Feedback"]);
    for (index, question) in test.questions.iter().enumerate() {
        let number = index as u32 + 1;
        let text: String = question.question_text().chars().take(48).collect();
        let (score, feedback) = graded
            .detailed_analysis
            .get(&number)
            .map(|a| (format!("{:.1}", a.score), a.feedback.clone()))
            .unwrap_or_else(|| ("-".to_string(), "-".to_string()));
        table.add_row([number.to_string(), text, score, feedback]);
    }
    println!("{table}");
    println!(
        "Total: {}/{}",
        graded.calculated_score.correct, graded.calculated_score.total
    );

    if let Some(output) = output {
        let email = responses_file
            .email
            .unwrap_or_else(|| "unknown@local".to_string());
        let submission = Submission {
            id: Uuid::new_v4(),
            test_id: test.id.clone(),
            user_id: "offline".to_string(),
            name: responses_file.name.unwrap_or_else(|| email.clone()),
            email,
            responses: responses_file.responses,
            calculated_score: Some(graded.calculated_score),
            detailed_analysis: Some(graded.detailed_analysis),
            submitted_at: Utc::now(),
        };
        save_submissions_json(&[submission], &output)?;
        println!("Wrote graded submission to {}", output.display());
    }

    Ok(())
}
