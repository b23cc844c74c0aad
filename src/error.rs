//! Gateway Error Taxonomy
//!
//! Every failure that can cross the request boundary is one of four kinds.
//! Transport and validation errors propagate to the caller; journal write
//! failures never reach this type because the journal swallows them.

use axum::http::StatusCode;

/// Errors surfaced by the document service and its collaborators.
///
/// | Variant | Raised by | HTTP |
/// |---------|-----------|------|
/// | `StoreUnavailable` | document store transport, request timeout | 503 |
/// | `NotFound` | get / delete of an absent identifier | 404 |
/// | `JournalUnavailable` | recent-entries retrieval only | 503 |
/// | `Validation` | empty identifier, empty or malformed payload | 400 |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("{0}")]
    NotFound(String),

    #[error("activity journal unavailable: {0}")]
    JournalUnavailable(String),

    #[error("invalid request: {0}")]
    Validation(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::StoreUnavailable(_) | GatewayError::JournalUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    pub fn book_not_found() -> Self {
        GatewayError::NotFound("book not found".to_string())
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::StoreUnavailable(err.to_string())
    }
}

pub type Result<T, E = GatewayError> = std::result::Result<T, E>;
