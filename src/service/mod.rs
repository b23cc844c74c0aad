//! Document Service Module
//!
//! The orchestration layer between the HTTP surface and the two stores.
//!
//! ## Request lifecycle
//! `Validating -> Executing -> (journal entry submitted) -> Responding`.
//! The journal submission is a side transition: it is queued without waiting
//! and can neither delay nor revert the primary outcome.
//!
//! ## Submodules
//! - **`service`**: `DocumentService`, the add/get/delete/search/recent operations.
//! - **`handlers`**: Axum handlers and the router.
//! - **`protocol`**: endpoints, query parameters and the response envelope.

pub mod handlers;
pub mod protocol;
pub mod service;

pub use handlers::router;
pub use service::DocumentService;
