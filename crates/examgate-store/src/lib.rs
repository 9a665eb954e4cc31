//! examgate-store — In-process document store and authenticator.
//!
//! The production document store and identity provider are external
//! collaborators; their contracts are the `DocumentStore` and
//! `Authenticator` traits in `examgate-core`. This crate supplies the
//! in-memory implementations that back tests and local CLI runs.

pub mod auth;
pub mod memory;

pub use auth::InMemoryAuth;
pub use memory::InMemoryStore;
