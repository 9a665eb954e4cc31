//! Trait seams to the external collaborators.
//!
//! The similarity service, document store, and identity provider are
//! external systems; these async traits are their contracts. The
//! `examgate-similarity` and `examgate-store` crates provide the
//! implementations.

use async_trait::async_trait;

use crate::error::{AuthError, SimilarityError, StoreError};
use crate::model::{Submission, Test, TestStatus};

// ---------------------------------------------------------------------------
// Similarity grader
// ---------------------------------------------------------------------------

/// External semantic-similarity scoring capability.
///
/// Stateless and safe for unlimited concurrent invocation; no ordering
/// guarantee relative to other calls. Implementations must apply a bounded
/// request timeout and surface timeout/error as a distinguishable
/// [`SimilarityError`] so the orchestrator can degrade instead of hanging.
#[async_trait]
pub trait SimilarityGrader: Send + Sync {
    /// Human-readable backend name (e.g. "http").
    fn name(&self) -> &str;

    /// Compare a student answer against the reference answer, returning a
    /// similarity in [0, 1] (higher means more semantically alike).
    async fn score(
        &self,
        student_answer: &str,
        reference_answer: &str,
    ) -> Result<f64, SimilarityError>;
}

// ---------------------------------------------------------------------------
// Document store
// ---------------------------------------------------------------------------

/// Test/submission persistence and querying.
///
/// The attempt-uniqueness contract is intentionally weak:
/// [`has_already_attempted`](DocumentStore::has_already_attempted) followed by
/// [`save_submission`](DocumentStore::save_submission) is read-then-act, not
/// atomic. Two concurrent sessions for the same (email, testId) can both pass
/// the check before either writes. A hardened store would replace the pair
/// with a single atomic insert keyed by (email, testId).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Publish a test. Fails with [`StoreError::AlreadyExists`] rather than
    /// overwriting; replacing a test means delete + create.
    async fn create_test(&self, test: Test) -> Result<(), StoreError>;

    /// Fetch a test for delivery. [`StoreError::NotFound`] if the id is
    /// unknown, [`StoreError::TestClosed`] if the admin closed it.
    async fn get_test_metadata(&self, test_id: &str) -> Result<Test, StoreError>;

    /// Flip a test between active and closed.
    async fn set_test_status(&self, test_id: &str, status: TestStatus) -> Result<(), StoreError>;

    async fn delete_test(&self, test_id: &str) -> Result<(), StoreError>;

    /// Whether a submission already exists for this (email, testId) pair.
    async fn has_already_attempted(&self, email: &str, test_id: &str)
        -> Result<bool, StoreError>;

    /// Append a submission. Never mutates an existing one.
    async fn save_submission(&self, submission: &Submission) -> Result<(), StoreError>;

    async fn get_all_tests(&self) -> Result<Vec<Test>, StoreError>;

    async fn get_submissions_for_test(&self, test_id: &str)
        -> Result<Vec<Submission>, StoreError>;
}

// ---------------------------------------------------------------------------
// Authenticator
// ---------------------------------------------------------------------------

/// An authenticated identity as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
}

/// Credential verification against the external identity provider.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Verify existing credentials.
    async fn login(&self, email: &str, password: &str)
        -> Result<AuthenticatedUser, AuthError>;

    /// Create a new account and sign it in.
    async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedUser, AuthError>;
}
