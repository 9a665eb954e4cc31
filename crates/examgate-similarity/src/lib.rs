//! examgate-similarity — Similarity-scoring service integration.
//!
//! Implements the `SimilarityGrader` trait over the external embedding
//! service's HTTP contract, plus a mock grader and configuration loading.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{create_grader, load_config, load_config_from, ExamgateConfig, GraderSettings};
pub use http::HttpSimilarityGrader;
pub use mock::MockSimilarityGrader;
