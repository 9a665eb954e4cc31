//! Error taxonomy for the assessment lifecycle.
//!
//! All error enums are defined in `examgate-core` so the grading orchestrator
//! and session controller can classify failures structurally (retry, degrade,
//! block) without string matching.

use thiserror::Error;

use crate::session::Phase;

/// Ingestion failures. These block publishing and carry enough location
/// context (1-based row/line numbers, field names) to fix the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// A required column was empty or absent in a tabular row.
    #[error("row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: &'static str },

    /// An MCQ row supplied fewer than two non-blank options.
    #[error("row {row}: MCQ needs at least 2 options, found {found}")]
    InsufficientOptions { row: usize, found: usize },

    /// The `type` column held something other than `mcq` or `long`.
    #[error("row {row}: unknown question type '{value}'")]
    UnknownType { row: usize, value: String },
}

impl IngestError {
    /// 1-based source row the error points at.
    pub fn row(&self) -> usize {
        match self {
            IngestError::MissingField { row, .. }
            | IngestError::InsufficientOptions { row, .. }
            | IngestError::UnknownType { row, .. } => *row,
        }
    }
}

/// Credential verification failures. These block session start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("an account already exists for {0}")]
    EmailAlreadyRegistered(String),

    #[error("authentication service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Failures from the external similarity-scoring service.
///
/// Non-fatal by policy: the orchestrator degrades the affected question to
/// score 0 instead of failing the grading run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimilarityError {
    /// The service answered 503: the embedding model is not yet initialized.
    #[error("similarity model is still loading")]
    ModelLoading,

    /// The service rejected the request (HTTP 400).
    #[error("similarity request rejected: {0}")]
    InvalidRequest(String),

    /// Any other error response from a reachable service.
    #[error("similarity API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request exceeded its bounded timeout.
    #[error("similarity request timed out after {0}s")]
    Timeout(u64),

    /// The service could not be reached at all.
    #[error("similarity network error: {0}")]
    Network(String),
}

impl SimilarityError {
    /// Whether the service was unreachable or not ready, as opposed to
    /// reachable but failing. Selects between the "Grading Server
    /// Unavailable" and "AI Error" feedback paths.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            SimilarityError::ModelLoading
                | SimilarityError::Timeout(_)
                | SimilarityError::Network(_)
        )
    }
}

/// Document store failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("test id \"{0}\" already exists")]
    AlreadyExists(String),

    #[error("test \"{0}\" not found")]
    NotFound(String),

    #[error("test \"{0}\" has been closed by the admin")]
    TestClosed(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Session lifecycle failures surfaced to the student-facing layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The requested test does not exist. Checked before any credential work.
    #[error("invalid test id: exam \"{0}\" not found")]
    InvalidTestId(String),

    /// The test exists but is closed to new attempts.
    #[error("test \"{0}\" has been closed by the admin")]
    TestClosed(String),

    #[error("authentication failed: {0}")]
    AuthFailed(#[source] AuthError),

    /// A submission already exists for this (email, testId) pair. The test
    /// content is never revealed on this path.
    #[error("test already attempted")]
    AlreadyAttempted,

    /// An operation arrived in a phase that does not accept it.
    #[error("session is in phase {0:?}, operation not allowed")]
    NotInProgress(Phase),

    /// The store failed while reading test or attempt data at session start.
    #[error("store error: {0}")]
    Store(#[source] StoreError),

    /// Persisting the submission failed. Fatal to this attempt only: the
    /// grading latch is released so the student may retry.
    #[error("failed to persist submission: {0}")]
    Persistence(#[source] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_error_rows() {
        let e = IngestError::MissingField {
            row: 4,
            field: "answer",
        };
        assert_eq!(e.row(), 4);
        assert_eq!(e.to_string(), "row 4: missing required field 'answer'");

        let e = IngestError::InsufficientOptions { row: 2, found: 1 };
        assert_eq!(e.to_string(), "row 2: MCQ needs at least 2 options, found 1");
    }

    #[test]
    fn unavailable_classification() {
        assert!(SimilarityError::ModelLoading.is_unavailable());
        assert!(SimilarityError::Timeout(20).is_unavailable());
        assert!(SimilarityError::Network("refused".into()).is_unavailable());
        assert!(!SimilarityError::InvalidRequest("missing field".into()).is_unavailable());
        assert!(!SimilarityError::ApiError {
            status: 500,
            message: "internal".into()
        }
        .is_unavailable());
    }
}
