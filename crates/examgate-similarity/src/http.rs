//! HTTP client for the external similarity-scoring service.
//!
//! The service exposes a single endpoint: `POST /grade` with a student and
//! reference answer, returning a cosine similarity in [0, 1]. Any non-200
//! response or transport failure is surfaced as a typed [`SimilarityError`]
//! so the grading orchestrator can degrade instead of failing the run.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use examgate_core::error::SimilarityError;
use examgate_core::traits::SimilarityGrader;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Client for the embedding-based grading service.
pub struct HttpSimilarityGrader {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpSimilarityGrader {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.into(),
            timeout_secs: timeout.as_secs(),
            client,
        }
    }
}

impl Default for HttpSimilarityGrader {
    fn default() -> Self {
        Self::new(
            DEFAULT_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }
}

#[derive(Serialize)]
struct GradeRequest<'a> {
    student_answer: &'a str,
    reference_answer: &'a str,
}

#[derive(Deserialize)]
struct GradeResponse {
    /// Cosine similarity, three decimals.
    similarity: f64,
}

#[derive(Deserialize)]
struct GradeErrorBody {
    error: String,
}

#[async_trait]
impl SimilarityGrader for HttpSimilarityGrader {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, student_answer, reference_answer))]
    async fn score(
        &self,
        student_answer: &str,
        reference_answer: &str,
    ) -> Result<f64, SimilarityError> {
        let body = GradeRequest {
            student_answer,
            reference_answer,
        };

        let response = self
            .client
            .post(format!("{}/grade", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SimilarityError::Timeout(self.timeout_secs)
                } else {
                    SimilarityError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 503 {
            // The embedding model is still loading on the server.
            return Err(SimilarityError::ModelLoading);
        }
        if status == 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GradeErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(SimilarityError::InvalidRequest(message));
        }
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GradeErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(SimilarityError::ApiError { status, message });
        }

        let graded: GradeResponse =
            response.json().await.map_err(|e| SimilarityError::ApiError {
                status: 200,
                message: format!("failed to parse response: {e}"),
            })?;

        // Cosine similarity can drift marginally outside [0, 1] in
        // degenerate cases; the bucket table expects the closed interval.
        Ok(graded.similarity.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn grader(server: &MockServer) -> HttpSimilarityGrader {
        HttpSimilarityGrader::new(server.uri(), Duration::from_secs(2))
    }

    #[tokio::test]
    async fn successful_scoring() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/grade"))
            .and(body_json(serde_json::json!({
                "student_answer": "values have one owner",
                "reference_answer": "each value has a single owner",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "similarity": 0.873,
                "marks_out_of_1": 0.9,
            })))
            .mount(&server)
            .await;

        let similarity = grader(&server)
            .score("values have one owner", "each value has a single owner")
            .await
            .unwrap();
        assert!((similarity - 0.873).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn model_still_loading_reads_as_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/grade"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": "Model is still loading, please wait..."
            })))
            .mount(&server)
            .await;

        let err = grader(&server).score("a", "b").await.unwrap_err();
        assert_eq!(err, SimilarityError::ModelLoading);
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn bad_request_is_not_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/grade"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "Missing student_answer or reference_answer"
            })))
            .mount(&server)
            .await;

        let err = grader(&server).score("a", "b").await.unwrap_err();
        assert!(matches!(err, SimilarityError::InvalidRequest(ref m)
            if m.contains("Missing student_answer")));
        assert!(!err.is_unavailable());
    }

    #[tokio::test]
    async fn internal_error_maps_to_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/grade"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": "Internal grading error"
            })))
            .mount(&server)
            .await;

        let err = grader(&server).score("a", "b").await.unwrap_err();
        assert_eq!(
            err,
            SimilarityError::ApiError {
                status: 500,
                message: "Internal grading error".into()
            }
        );
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/grade"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"similarity": 0.9}))
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let slow = HttpSimilarityGrader::new(server.uri(), Duration::from_millis(50));
        let err = slow.score("a", "b").await.unwrap_err();
        assert!(matches!(err, SimilarityError::Timeout(_)));
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        // Nothing is listening on this port.
        let dead = HttpSimilarityGrader::new(
            "http://127.0.0.1:1",
            Duration::from_millis(200),
        );
        let err = dead.score("a", "b").await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn out_of_range_similarity_is_clamped() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/grade"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "similarity": -0.012
            })))
            .mount(&server)
            .await;

        let similarity = grader(&server).score("a", "b").await.unwrap();
        assert_eq!(similarity, 0.0);
    }
}
