//! HTTP Protocol
//!
//! Route paths, query parameters and the response envelope.
//! Every response body is either `{"status":"success","res":...}` or
//! `{"status":"error","msg":"..."}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GatewayError;

// --- API Endpoints ---

pub const ENDPOINT_BOOK: &str = "/book/:id";
pub const ENDPOINT_SEARCH: &str = "/search";
pub const ENDPOINT_RECENT: &str = "/recent/:user_id";

/// Header carrying the caller's identity for journal attribution.
pub const USER_HEADER: &str = "x-user-id";

// --- Data Transfer Objects ---

/// Query string of `GET /search`. Values stay raw; parsing is lenient.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub sort_ebook: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentParams {
    pub limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ApiResponse {
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        res: Option<Value>,
    },
    Error {
        msg: String,
    },
}

impl ApiResponse {
    pub fn success(res: impl Into<Value>) -> Self {
        ApiResponse::Success {
            res: Some(res.into()),
        }
    }

    pub fn empty() -> Self {
        ApiResponse::Success { res: None }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        ApiResponse::Error { msg: msg.into() }
    }
}

impl From<&GatewayError> for ApiResponse {
    fn from(err: &GatewayError) -> Self {
        ApiResponse::error(err.to_string())
    }
}
