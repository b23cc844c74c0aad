//! Book Catalog Gateway Library
//!
//! An HTTP gateway offering CRUD and search over a `books` collection held by
//! a text-search engine, plus a per-user activity journal held in a ranked
//! key-value store. The binary (`main.rs`) wires these modules together.
//!
//! ## Modules
//! - **`query`**: composes free-text, price-range and sort criteria into one
//!   structured search request.
//! - **`store`**: the document store adapter (search-engine client and an
//!   in-process equivalent).
//! - **`journal`**: best-effort activity recording and "most recent first"
//!   retrieval.
//! - **`service`**: request orchestration and the Axum HTTP surface.
//! - **`loader`**: CSV-to-document conversion for seeding the catalog.
//! - **`config`** / **`error`**: settings and the error taxonomy.

pub mod config;
pub mod error;
pub mod journal;
pub mod loader;
pub mod query;
pub mod service;
pub mod store;
