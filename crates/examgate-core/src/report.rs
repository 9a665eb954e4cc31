//! Report row generation and JSON persistence for tests and submissions.
//!
//! Byte-level CSV/HTML export is left to external tooling; this module
//! produces the row data those exports consume. Stored totals always win
//! over recomputation so reports show exactly what the student saw.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::model::{Question, Submission, Test};
use crate::scoring::mcq_answer_matches;

/// One row of the answer-sheet report: identity, totals, and the raw answer
/// text per question.
#[derive(Debug, Clone)]
pub struct TestReportRow {
    pub student_name: String,
    pub email: String,
    pub submitted_at: DateTime<Utc>,
    /// Display form, e.g. "5.9/16".
    pub total_score: String,
    /// Display form with two decimals, e.g. "36.88%".
    pub percentage: String,
    pub test_title: String,
    /// One cell per question, in question order; "Not Answered" when blank.
    pub answers: Vec<String>,
}

/// One row of the marks report: numeric marks per question.
#[derive(Debug, Clone)]
pub struct MarksReportRow {
    pub student_name: String,
    pub email: String,
    pub total_marks: f64,
    pub max_marks: u32,
    /// Awarded marks per question, in question order.
    pub per_question: Vec<f64>,
}

/// Legacy fallback for submissions graded before per-question analysis was
/// stored: exact-match MCQ scoring only.
fn legacy_score(questions: &[Question], responses: &BTreeMap<u32, String>) -> (f64, u32) {
    let mut correct = 0.0;
    let mut total = 0;
    for (index, question) in questions.iter().enumerate() {
        if let Question::Mcq {
            correct_answer: Some(key),
            ..
        } = question
        {
            total += 1;
            let number = index as u32 + 1;
            if responses
                .get(&number)
                .is_some_and(|r| mcq_answer_matches(r, key))
            {
                correct += 1.0;
            }
        }
    }
    (correct, total)
}

/// Build answer-sheet rows for every submission to a test.
pub fn test_report_rows(test: &Test, submissions: &[Submission]) -> Vec<TestReportRow> {
    submissions
        .iter()
        .map(|sub| {
            let (correct, total) = match sub.calculated_score {
                Some(score) => (score.correct, score.total),
                None => legacy_score(&test.questions, &sub.responses),
            };
            let percentage = if total > 0 {
                format!("{:.2}%", correct / total as f64 * 100.0)
            } else {
                "0%".to_string()
            };

            let answers = (1..=test.questions.len() as u32)
                .map(|number| {
                    sub.responses
                        .get(&number)
                        .filter(|r| !r.trim().is_empty())
                        .cloned()
                        .unwrap_or_else(|| "Not Answered".to_string())
                })
                .collect();

            TestReportRow {
                student_name: sub.name.clone(),
                email: sub.email.clone(),
                submitted_at: sub.submitted_at,
                total_score: format!("{correct}/{total}"),
                percentage,
                test_title: test.title.clone(),
                answers,
            }
        })
        .collect()
}

/// Build marks rows for every submission to a test.
pub fn marks_report_rows(test: &Test, submissions: &[Submission]) -> Vec<MarksReportRow> {
    submissions
        .iter()
        .map(|sub| {
            let (total_marks, max_marks) = match sub.calculated_score {
                Some(score) => (score.correct, score.total),
                None => legacy_score(&test.questions, &sub.responses),
            };

            let per_question = test
                .questions
                .iter()
                .enumerate()
                .map(|(index, question)| {
                    let number = index as u32 + 1;
                    if let Some(analysis) = sub
                        .detailed_analysis
                        .as_ref()
                        .and_then(|a| a.get(&number))
                    {
                        return analysis.score;
                    }
                    // Legacy MCQ fallback when no analysis was stored.
                    if let Question::Mcq {
                        correct_answer: Some(key),
                        ..
                    } = question
                    {
                        if sub
                            .responses
                            .get(&number)
                            .is_some_and(|r| mcq_answer_matches(r, key))
                        {
                            return 1.0;
                        }
                    }
                    0.0
                })
                .collect();

            MarksReportRow {
                student_name: sub.name.clone(),
                email: sub.email.clone(),
                total_marks,
                max_marks,
                per_question,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// JSON persistence (admin file flow)
// ---------------------------------------------------------------------------

/// Save a published test as pretty JSON.
pub fn save_test_json(test: &Test, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(test).context("failed to serialize test")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write test to {}", path.display()))?;
    Ok(())
}

pub fn load_test_json(path: &Path) -> Result<Test> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read test from {}", path.display()))?;
    serde_json::from_str(&content).context("failed to parse test JSON")
}

/// Load a JSON array of submissions.
pub fn load_submissions_json(path: &Path) -> Result<Vec<Submission>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read submissions from {}", path.display()))?;
    serde_json::from_str(&content).context("failed to parse submissions JSON")
}

pub fn save_submissions_json(submissions: &[Submission], path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(submissions).context("failed to serialize submissions")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
        .with_context(|| format!("failed to write submissions to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CalculatedScore, QuestionAnalysis};
    use uuid::Uuid;

    fn sample_test() -> Test {
        Test::new(
            "rust-101",
            "Rust Basics",
            vec![
                Question::Mcq {
                    id: 1,
                    question_text: "Capital of France?".into(),
                    options: vec!["Paris".into(), "Lyon".into()],
                    correct_answer: Some("Paris".into()),
                },
                Question::Long {
                    id: 2,
                    question_text: "Explain ownership.".into(),
                    reference_answer: Some("Each value has one owner.".into()),
                },
            ],
        )
    }

    fn submission(
        responses: &[(u32, &str)],
        calculated: Option<CalculatedScore>,
        analysis: Option<BTreeMap<u32, QuestionAnalysis>>,
    ) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            test_id: "rust-101".into(),
            user_id: "uid-1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            responses: responses
                .iter()
                .map(|(n, r)| (*n, r.to_string()))
                .collect(),
            calculated_score: calculated,
            detailed_analysis: analysis,
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn stored_totals_win_over_recomputation() {
        let test = sample_test();
        let sub = submission(
            &[(1, "Lyon")],
            Some(CalculatedScore {
                correct: 5.9,
                total: 16,
            }),
            None,
        );
        let rows = test_report_rows(&test, &[sub]);
        assert_eq!(rows[0].total_score, "5.9/16");
        assert_eq!(rows[0].percentage, "36.88%");
    }

    #[test]
    fn legacy_fallback_scores_keyed_mcqs_only() {
        let test = sample_test();
        let sub = submission(&[(1, "  PARIS "), (2, "essay text")], None, None);
        let rows = test_report_rows(&test, &[sub]);
        // Only the keyed MCQ is counted in the legacy path.
        assert_eq!(rows[0].total_score, "1/1");
        assert_eq!(rows[0].percentage, "100.00%");
    }

    #[test]
    fn unanswered_cells_read_not_answered() {
        let test = sample_test();
        let sub = submission(&[(2, "an essay")], None, None);
        let rows = test_report_rows(&test, &[sub]);
        assert_eq!(rows[0].answers, vec!["Not Answered", "an essay"]);
        assert_eq!(rows[0].test_title, "Rust Basics");
    }

    #[test]
    fn marks_rows_prefer_stored_analysis() {
        let test = sample_test();
        let analysis = BTreeMap::from([
            (1, QuestionAnalysis::new(1.0, "Correct")),
            (2, QuestionAnalysis::new(0.7, "AI Similarity: 0.640")),
        ]);
        let sub = submission(
            &[(1, "Paris"), (2, "essay")],
            Some(CalculatedScore {
                correct: 1.7,
                total: 2,
            }),
            Some(analysis),
        );
        let rows = marks_report_rows(&test, &[sub]);
        assert_eq!(rows[0].total_marks, 1.7);
        assert_eq!(rows[0].max_marks, 2);
        assert_eq!(rows[0].per_question, vec![1.0, 0.7]);
    }

    #[test]
    fn marks_rows_legacy_mcq_fallback() {
        let test = sample_test();
        let sub = submission(&[(1, "paris"), (2, "essay")], None, None);
        let rows = marks_report_rows(&test, &[sub]);
        assert_eq!(rows[0].per_question, vec![1.0, 0.0]);
        assert_eq!(rows[0].total_marks, 1.0);
        assert_eq!(rows[0].max_marks, 1);
    }

    #[test]
    fn empty_submissions_produce_no_rows() {
        let test = sample_test();
        assert!(test_report_rows(&test, &[]).is_empty());
        assert!(marks_report_rows(&test, &[]).is_empty());
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tests/rust-101.json");
        let test = sample_test();

        save_test_json(&test, &path).unwrap();
        let loaded = load_test_json(&path).unwrap();
        assert_eq!(loaded.id, "rust-101");
        assert_eq!(loaded.questions, test.questions);
    }

    #[test]
    fn submissions_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.json");
        let subs = vec![submission(&[(1, "Paris")], None, None)];

        save_submissions_json(&subs, &path).unwrap();
        let loaded = load_submissions_json(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].email, "ada@example.com");
    }
}
