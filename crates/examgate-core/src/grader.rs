//! Grading orchestrator.
//!
//! Scores a submission against a test's question list: multiple-choice
//! answers deterministically, free-text answers through the external
//! similarity service. Similarity calls fan out concurrently with a bounded
//! pool and independent per-call timeouts, and the run always completes: an
//! individual call failing degrades that question to score 0, it never
//! blocks the student's submission.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;

use crate::error::SimilarityError;
use crate::model::{CalculatedScore, Question, QuestionAnalysis};
use crate::scoring::{aggregate, bucket_marks, mcq_answer_matches};
use crate::traits::SimilarityGrader;

pub const FEEDBACK_NOT_ANSWERED: &str = "Not Answered";
pub const FEEDBACK_CORRECT: &str = "Correct";
pub const FEEDBACK_INCORRECT: &str = "Incorrect";
/// MCQ ingested without an answer key; excluded from the scorable total.
pub const FEEDBACK_NOT_GRADABLE: &str = "Not Gradable";
pub const FEEDBACK_UNAVAILABLE: &str = "Grading Server Unavailable";
pub const FEEDBACK_AI_ERROR: &str = "AI Error";

/// Configuration for the grading fan-out.
#[derive(Debug, Clone)]
pub struct GraderConfig {
    /// Maximum concurrent similarity calls.
    pub parallelism: usize,
    /// Independent timeout applied to each outstanding call, so one slow
    /// call cannot stall the whole aggregate.
    pub call_timeout: Duration,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            call_timeout: Duration::from_secs(20),
        }
    }
}

/// The output of one grading run.
#[derive(Debug, Clone)]
pub struct GradedSubmission {
    /// Per-question breakdown keyed by 1-based question number.
    pub detailed_analysis: BTreeMap<u32, QuestionAnalysis>,
    pub calculated_score: CalculatedScore,
}

/// Concurrent scorer for one submission.
///
/// Invoked at most once per session (the session controller's latch enforces
/// that); otherwise a pure function of its inputs, so re-running after a
/// persistence failure is safe.
pub struct GradingOrchestrator {
    grader: Arc<dyn SimilarityGrader>,
    config: GraderConfig,
}

impl GradingOrchestrator {
    pub fn new(grader: Arc<dyn SimilarityGrader>, config: GraderConfig) -> Self {
        Self { grader, config }
    }

    /// Score `responses` (1-based question number -> raw answer text, sparse
    /// for unanswered items) against `questions`.
    pub async fn grade(
        &self,
        questions: &[Question],
        responses: &BTreeMap<u32, String>,
    ) -> GradedSubmission {
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism));
        let mut analysis: BTreeMap<u32, QuestionAnalysis> = BTreeMap::new();
        let mut pending = FuturesUnordered::new();

        for (index, question) in questions.iter().enumerate() {
            let number = index as u32 + 1;
            let response = responses
                .get(&number)
                .map(String::as_str)
                .filter(|r| !r.trim().is_empty());

            match question {
                Question::Mcq { correct_answer, .. } => {
                    let outcome = match (response, correct_answer) {
                        (_, None) => QuestionAnalysis::new(0.0, FEEDBACK_NOT_GRADABLE),
                        (None, Some(_)) => QuestionAnalysis::new(0.0, FEEDBACK_NOT_ANSWERED),
                        (Some(r), Some(key)) if mcq_answer_matches(r, key) => {
                            QuestionAnalysis::new(1.0, FEEDBACK_CORRECT)
                        }
                        (Some(_), Some(_)) => QuestionAnalysis::new(0.0, FEEDBACK_INCORRECT),
                    };
                    analysis.insert(number, outcome);
                }
                Question::Long {
                    reference_answer, ..
                } => match (response, reference_answer) {
                    (Some(response), Some(reference)) => {
                        let grader = Arc::clone(&self.grader);
                        let semaphore = Arc::clone(&semaphore);
                        let response = response.to_string();
                        let reference = reference.clone();
                        let timeout = self.config.call_timeout;

                        pending.push(async move {
                            let result = match semaphore.acquire_owned().await {
                                Ok(_permit) => {
                                    match tokio::time::timeout(
                                        timeout,
                                        grader.score(&response, &reference),
                                    )
                                    .await
                                    {
                                        Ok(result) => result,
                                        Err(_) => {
                                            Err(SimilarityError::Timeout(timeout.as_secs()))
                                        }
                                    }
                                }
                                Err(_) => {
                                    Err(SimilarityError::Network("grading pool closed".into()))
                                }
                            };
                            (number, result)
                        });
                    }
                    // No answer, or no reference to compare against: skip
                    // the external call entirely.
                    _ => {
                        analysis.insert(number, QuestionAnalysis::new(0.0, FEEDBACK_NOT_ANSWERED));
                    }
                },
            }
        }

        // Collect-all join: each task owns a disjoint question number, and a
        // failed call degrades only its own question.
        while let Some((number, result)) = pending.next().await {
            let outcome = match result {
                Ok(similarity) => QuestionAnalysis::new(
                    bucket_marks(similarity),
                    format!("AI Similarity: {similarity:.3}"),
                ),
                Err(e) if e.is_unavailable() => {
                    tracing::warn!("similarity service unavailable for question {number}: {e}");
                    QuestionAnalysis::new(0.0, FEEDBACK_UNAVAILABLE)
                }
                Err(e) => {
                    tracing::warn!("similarity call failed for question {number}: {e}");
                    QuestionAnalysis::new(0.0, FEEDBACK_AI_ERROR)
                }
            };
            analysis.insert(number, outcome);
        }

        let calculated_score = aggregate(questions, &analysis);
        GradedSubmission {
            detailed_analysis: analysis,
            calculated_score,
        }
    }
}
