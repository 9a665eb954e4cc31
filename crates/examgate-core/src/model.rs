//! Core data model types for examgate.
//!
//! These are the fundamental types the entire examgate system uses to
//! represent questions, published tests, and student submissions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single assessment question.
///
/// Tagged union rather than a struct with optional fields: every consumer
/// (ingestion, grading, report generation) matches exhaustively instead of
/// probing for field presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Question {
    /// Multiple-choice question, scored by exact (case/whitespace-insensitive)
    /// string match against the answer key.
    Mcq {
        /// 1-based id, unique and stable within a test.
        id: u32,
        question_text: String,
        /// Presented options, in source order. Tabular ingestion guarantees
        /// at least two; text ingestion guarantees at least one.
        options: Vec<String>,
        /// Answer key. `None` for questions ingested from unstructured text,
        /// which carries no key; such questions are excluded from the
        /// scorable total.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        correct_answer: Option<String>,
    },
    /// Free-text question, scored by semantic similarity against an
    /// instructor-supplied reference answer (never shown to the student).
    Long {
        id: u32,
        question_text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reference_answer: Option<String>,
    },
}

impl Question {
    pub fn id(&self) -> u32 {
        match self {
            Question::Mcq { id, .. } | Question::Long { id, .. } => *id,
        }
    }

    pub fn question_text(&self) -> &str {
        match self {
            Question::Mcq { question_text, .. } | Question::Long { question_text, .. } => {
                question_text
            }
        }
    }

    /// Whether this question counts toward the scorable total: every long
    /// question does, and every MCQ that carries an answer key.
    pub fn is_scorable(&self) -> bool {
        match self {
            Question::Mcq { correct_answer, .. } => correct_answer.is_some(),
            Question::Long { .. } => true,
        }
    }
}

/// Publication status of a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Active,
    Closed,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Active => write!(f, "active"),
            TestStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for TestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" | "open" => Ok(TestStatus::Active),
            "closed" => Ok(TestStatus::Closed),
            other => Err(format!("unknown test status: {other}")),
        }
    }
}

/// A published test: an ordered, immutable question set.
///
/// Immutable after publish except for a full replace (delete + re-create);
/// partial edits are not supported.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    /// Externally unique id chosen by the administrator (e.g.
    /// "react-final-2024").
    pub id: String,
    pub title: String,
    pub questions: Vec<Question>,
    pub status: TestStatus,
    pub created_at: DateTime<Utc>,
}

impl Test {
    pub fn new(id: impl Into<String>, title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            questions,
            status: TestStatus::Active,
            created_at: Utc::now(),
        }
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// (mcq, long) counts for dashboard summaries.
    pub fn type_counts(&self) -> (usize, usize) {
        let mcq = self
            .questions
            .iter()
            .filter(|q| matches!(q, Question::Mcq { .. }))
            .count();
        (mcq, self.questions.len() - mcq)
    }
}

/// Aggregate score for a submission. `correct` is a sum of per-question
/// scores and may be fractional (e.g. 5.9 / 16).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedScore {
    pub correct: f64,
    pub total: u32,
}

/// Per-question grading outcome attached to a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalysis {
    /// Awarded score in [0, 1].
    pub score: f64,
    /// Always 1.0 under the current policy.
    pub max_score: f64,
    /// Human-readable outcome ("Correct", "Not Answered",
    /// "AI Similarity: 0.873", ...). Preserved for admin review.
    pub feedback: String,
}

impl QuestionAnalysis {
    pub fn new(score: f64, feedback: impl Into<String>) -> Self {
        Self {
            score,
            max_score: 1.0,
            feedback: feedback.into(),
        }
    }
}

/// A student's graded submission. Append-only: created exactly once per
/// (email, testId) pair under normal operation, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub test_id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    /// Raw answers keyed by 1-based question number. Sparse: unanswered
    /// questions have no entry.
    pub responses: BTreeMap<u32, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_score: Option<CalculatedScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_analysis: Option<BTreeMap<u32, QuestionAnalysis>>,
    pub submitted_at: DateTime<Utc>,
}
