//! In-memory document store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use examgate_core::error::StoreError;
use examgate_core::model::{Submission, Test, TestStatus};
use examgate_core::traits::DocumentStore;

/// Process-local [`DocumentStore`] backing tests and local CLI runs.
///
/// Faithful to the external store's contract, including its weakness:
/// `save_submission` is append-only and does not enforce (email, testId)
/// uniqueness, so the attempt check remains read-then-act at the caller.
#[derive(Default)]
pub struct InMemoryStore {
    tests: RwLock<HashMap<String, Test>>,
    submissions: RwLock<Vec<Submission>>,
    fail_saves: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `save_submission` calls fail, for exercising the
    /// persistence-retry path.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::Relaxed);
    }

    pub async fn submission_count(&self) -> usize {
        self.submissions.read().await.len()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create_test(&self, test: Test) -> Result<(), StoreError> {
        let mut tests = self.tests.write().await;
        if tests.contains_key(&test.id) {
            return Err(StoreError::AlreadyExists(test.id));
        }
        tracing::info!(test_id = %test.id, questions = test.question_count(), "publishing test");
        tests.insert(test.id.clone(), test);
        Ok(())
    }

    async fn get_test_metadata(&self, test_id: &str) -> Result<Test, StoreError> {
        let tests = self.tests.read().await;
        let test = tests
            .get(test_id)
            .ok_or_else(|| StoreError::NotFound(test_id.to_string()))?;
        if test.status == TestStatus::Closed {
            return Err(StoreError::TestClosed(test_id.to_string()));
        }
        Ok(test.clone())
    }

    async fn set_test_status(&self, test_id: &str, status: TestStatus) -> Result<(), StoreError> {
        let mut tests = self.tests.write().await;
        let test = tests
            .get_mut(test_id)
            .ok_or_else(|| StoreError::NotFound(test_id.to_string()))?;
        test.status = status;
        Ok(())
    }

    async fn delete_test(&self, test_id: &str) -> Result<(), StoreError> {
        let mut tests = self.tests.write().await;
        tests
            .remove(test_id)
            .ok_or_else(|| StoreError::NotFound(test_id.to_string()))?;
        Ok(())
    }

    async fn has_already_attempted(
        &self,
        email: &str,
        test_id: &str,
    ) -> Result<bool, StoreError> {
        let submissions = self.submissions.read().await;
        Ok(submissions
            .iter()
            .any(|s| s.email == email && s.test_id == test_id))
    }

    async fn save_submission(&self, submission: &Submission) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("injected save failure".into()));
        }
        self.submissions.write().await.push(submission.clone());
        Ok(())
    }

    async fn get_all_tests(&self) -> Result<Vec<Test>, StoreError> {
        let tests = self.tests.read().await;
        let mut all: Vec<Test> = tests.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn get_submissions_for_test(
        &self,
        test_id: &str,
    ) -> Result<Vec<Submission>, StoreError> {
        let submissions = self.submissions.read().await;
        Ok(submissions
            .iter()
            .filter(|s| s.test_id == test_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use examgate_core::model::Question;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn sample_test(id: &str) -> Test {
        Test::new(
            id,
            "Sample",
            vec![Question::Long {
                id: 1,
                question_text: "Explain.".into(),
                reference_answer: None,
            }],
        )
    }

    fn sample_submission(test_id: &str, email: &str) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            test_id: test_id.into(),
            user_id: "uid".into(),
            name: "Ada".into(),
            email: email.into(),
            responses: BTreeMap::new(),
            calculated_score: None,
            detailed_analysis: None,
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_test_ids_rejected() {
        let store = InMemoryStore::new();
        store.create_test(sample_test("t1")).await.unwrap();
        let err = store.create_test(sample_test("t1")).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn missing_and_closed_tests_are_distinguished() {
        let store = InMemoryStore::new();
        store.create_test(sample_test("t1")).await.unwrap();

        assert!(matches!(
            store.get_test_metadata("nope").await.unwrap_err(),
            StoreError::NotFound(_)
        ));

        store
            .set_test_status("t1", TestStatus::Closed)
            .await
            .unwrap();
        assert!(matches!(
            store.get_test_metadata("t1").await.unwrap_err(),
            StoreError::TestClosed(_)
        ));
    }

    #[tokio::test]
    async fn attempt_lookup_matches_email_and_test() {
        let store = InMemoryStore::new();
        store
            .save_submission(&sample_submission("t1", "ada@example.com"))
            .await
            .unwrap();

        assert!(store
            .has_already_attempted("ada@example.com", "t1")
            .await
            .unwrap());
        assert!(!store
            .has_already_attempted("ada@example.com", "t2")
            .await
            .unwrap());
        assert!(!store
            .has_already_attempted("bob@example.com", "t1")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn save_is_append_only_even_for_duplicates() {
        // The store intentionally does not enforce attempt uniqueness; the
        // read-then-act check lives in the session controller.
        let store = InMemoryStore::new();
        store
            .save_submission(&sample_submission("t1", "ada@example.com"))
            .await
            .unwrap();
        store
            .save_submission(&sample_submission("t1", "ada@example.com"))
            .await
            .unwrap();
        assert_eq!(store.submission_count().await, 2);
    }

    #[tokio::test]
    async fn injected_save_failure() {
        let store = InMemoryStore::new();
        store.set_fail_saves(true);
        let err = store
            .save_submission(&sample_submission("t1", "a@b.c"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        store.set_fail_saves(false);
        store
            .save_submission(&sample_submission("t1", "a@b.c"))
            .await
            .unwrap();
        assert_eq!(store.submission_count().await, 1);
    }

    #[tokio::test]
    async fn delete_then_recreate_replaces_a_test() {
        let store = InMemoryStore::new();
        store.create_test(sample_test("t1")).await.unwrap();
        store.delete_test("t1").await.unwrap();
        store.create_test(sample_test("t1")).await.unwrap();
        assert_eq!(store.get_all_tests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn submissions_filtered_by_test() {
        let store = InMemoryStore::new();
        store
            .save_submission(&sample_submission("t1", "a@b.c"))
            .await
            .unwrap();
        store
            .save_submission(&sample_submission("t2", "a@b.c"))
            .await
            .unwrap();

        let subs = store.get_submissions_for_test("t1").await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].test_id, "t1");
    }
}
