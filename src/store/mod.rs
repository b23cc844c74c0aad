//! Document Store Module
//!
//! The adapter between the gateway and the text-search engine holding the
//! `books` index.
//!
//! ## Contract
//! - **put**: index a document under a caller-supplied id, overwriting.
//! - **get / delete**: an absent id is a normal outcome (`None` / `false`),
//!   never an error.
//! - **search**: run a `StructuredQuery`; zero hits is an empty `Vec`.
//!
//! Connectivity problems are reported as `GatewayError::StoreUnavailable`
//! so callers can tell "the store is down" from "the store found nothing".
//!
//! ## Submodules
//! - **`elastic`**: HTTP client for the search engine's REST API.
//! - **`memory`**: in-process implementation with the same query semantics.
//! - **`analysis`**: text analysis shared by the in-process matcher.
//! - **`types`**: the book schema and index mapping.

pub mod analysis;
pub mod elastic;
pub mod memory;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::query::StructuredQuery;

pub use elastic::ElasticStore;
pub use memory::MemoryStore;
pub use types::{Book, INDEX_NAME, StoredHit};

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Indexes `document` under `id` and returns the id the store assigned.
    async fn put(&self, id: &str, document: Value) -> Result<String>;

    async fn get(&self, id: &str) -> Result<Option<Value>>;

    /// Returns `true` when a document was removed.
    async fn delete(&self, id: &str) -> Result<bool>;

    async fn search(&self, query: &StructuredQuery) -> Result<Vec<StoredHit>>;

    /// Indexes many documents at once; returns how many were accepted.
    async fn put_many(&self, documents: Vec<(Option<String>, Value)>) -> Result<usize>;
}
