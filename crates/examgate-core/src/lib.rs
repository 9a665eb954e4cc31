//! examgate-core — Assessment lifecycle engine.
//!
//! This crate defines the canonical question/test/submission model, the
//! ingestion parsers, the session/attempt state machine, the concurrent
//! grading orchestrator, and the trait seams to the external similarity
//! service, document store, and identity provider.

pub mod error;
pub mod grader;
pub mod ingest;
pub mod model;
pub mod report;
pub mod scoring;
pub mod session;
pub mod traits;
