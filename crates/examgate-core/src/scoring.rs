//! Deterministic scoring policy.
//!
//! The numeric rules here must stay bit-exact: the bucket table mirrors the
//! grading service's published mapping, and aggregate rounding defines the
//! totals students see.

use crate::model::{CalculatedScore, Question, QuestionAnalysis};
use std::collections::BTreeMap;

/// Partial-credit step function from semantic similarity to marks out of 1.
///
/// Thresholds are inclusive and monotonic; a similarity earns the highest
/// bucket it satisfies.
pub fn bucket_marks(similarity: f64) -> f64 {
    if similarity >= 0.90 {
        1.0
    } else if similarity >= 0.80 {
        0.9
    } else if similarity >= 0.70 {
        0.8
    } else if similarity >= 0.60 {
        0.7
    } else if similarity >= 0.50 {
        0.5
    } else if similarity >= 0.40 {
        0.4
    } else {
        0.0
    }
}

/// MCQ equality: both sides trimmed, compared case-insensitively.
pub fn mcq_answer_matches(response: &str, correct_answer: &str) -> bool {
    response.trim().to_lowercase() == correct_answer.trim().to_lowercase()
}

/// Round an aggregate score to one decimal place (5.8999... -> 5.9).
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Fold per-question analyses into the aggregate score.
///
/// `total` counts every question that carried a gradable definition: each
/// MCQ with an answer key and every long question (whether or not it could
/// actually be graded at run time), 1 mark each. `correct` is the rounded
/// sum of awarded scores and may be fractional.
pub fn aggregate(
    questions: &[Question],
    analysis: &BTreeMap<u32, QuestionAnalysis>,
) -> CalculatedScore {
    let total = questions.iter().filter(|q| q.is_scorable()).count() as u32;
    let correct = round_to_tenth(analysis.values().map(|a| a.score).sum());
    CalculatedScore { correct, total }
}
