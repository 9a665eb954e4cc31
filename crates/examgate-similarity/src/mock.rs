//! Mock similarity grader for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use examgate_core::error::SimilarityError;
use examgate_core::traits::SimilarityGrader;

/// A mock grader for exercising the grading orchestrator without the real
/// embedding service.
///
/// Returns configurable similarities based on reference-answer substring
/// matching, or an injected failure.
pub struct MockSimilarityGrader {
    /// Map of reference-answer substring -> similarity.
    similarities: HashMap<String, f64>,
    /// Default similarity if no reference matches.
    default_similarity: f64,
    /// When set, every call fails with a clone of this error.
    failure: Option<SimilarityError>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last (student, reference) pair received.
    last_request: Mutex<Option<(String, String)>>,
}

impl MockSimilarityGrader {
    /// Create a mock with the given reference-substring -> similarity map.
    pub fn new(similarities: HashMap<String, f64>) -> Self {
        Self {
            similarities,
            default_similarity: 1.0,
            failure: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same similarity.
    pub fn with_fixed_similarity(similarity: f64) -> Self {
        Self {
            similarities: HashMap::new(),
            default_similarity: similarity,
            failure: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock where every call fails with the given error.
    pub fn failing_with(error: SimilarityError) -> Self {
        Self {
            similarities: HashMap::new(),
            default_similarity: 0.0,
            failure: Some(error),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of calls made to this grader.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last (student, reference) pair received.
    pub fn last_request(&self) -> Option<(String, String)> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl SimilarityGrader for MockSimilarityGrader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn score(
        &self,
        student_answer: &str,
        reference_answer: &str,
    ) -> Result<f64, SimilarityError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() =
            Some((student_answer.to_string(), reference_answer.to_string()));

        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }

        let similarity = self
            .similarities
            .iter()
            .find(|(key, _)| reference_answer.contains(key.as_str()))
            .map(|(_, v)| *v)
            .unwrap_or(self.default_similarity);

        Ok(similarity)
    }
}
