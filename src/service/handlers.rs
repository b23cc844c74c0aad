use axum::extract::{Path, Query, Request};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::Value;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use super::protocol::{
    ApiResponse, ENDPOINT_BOOK, ENDPOINT_RECENT, ENDPOINT_SEARCH, RecentParams, SearchParams,
    USER_HEADER,
};
use super::service::DocumentService;
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::query::SearchCriteria;

type Reply = (StatusCode, Json<ApiResponse>);

pub fn router(service: Arc<DocumentService>, config: Arc<GatewayConfig>) -> Router {
    Router::new()
        .route(
            ENDPOINT_BOOK,
            get(handle_get_book)
                .put(handle_put_book)
                .delete(handle_delete_book)
                .fallback(handle_unsupported_method),
        )
        .route(ENDPOINT_SEARCH, get(handle_search))
        .route(ENDPOINT_RECENT, get(handle_recent))
        .fallback(handle_not_found)
        .layer(middleware::from_fn(trace_request))
        .layer(Extension(service))
        .layer(Extension(config))
}

pub async fn handle_get_book(
    Extension(service): Extension<Arc<DocumentService>>,
    Extension(config): Extension<Arc<GatewayConfig>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Reply {
    let user_id = caller(&headers, &config);
    respond(service.get_document(&user_id, &id).await.map(ApiResponse::success))
}

pub async fn handle_put_book(
    Extension(service): Extension<Arc<DocumentService>>,
    Extension(config): Extension<Arc<GatewayConfig>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Reply {
    let user_id = caller(&headers, &config);
    respond(
        service
            .add_document(&user_id, &id, &body)
            .await
            .map(ApiResponse::success),
    )
}

pub async fn handle_delete_book(
    Extension(service): Extension<Arc<DocumentService>>,
    Extension(config): Extension<Arc<GatewayConfig>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Reply {
    let user_id = caller(&headers, &config);
    respond(
        service
            .delete_document(&user_id, &id)
            .await
            .map(|()| ApiResponse::empty()),
    )
}

pub async fn handle_search(
    Extension(service): Extension<Arc<DocumentService>>,
    Extension(config): Extension<Arc<GatewayConfig>>,
    Query(params): Query<SearchParams>,
    headers: HeaderMap,
) -> Reply {
    let user_id = caller(&headers, &config);
    let criteria = SearchCriteria::from_params(
        params.title.as_deref(),
        params.from.as_deref(),
        params.to.as_deref(),
        params.sort_ebook.as_deref(),
    );

    respond(
        service
            .search(&user_id, &criteria)
            .await
            .map(|docs| ApiResponse::success(Value::Array(docs))),
    )
}

pub async fn handle_recent(
    Extension(service): Extension<Arc<DocumentService>>,
    Extension(config): Extension<Arc<GatewayConfig>>,
    Path(user_id): Path<String>,
    Query(params): Query<RecentParams>,
) -> Reply {
    let limit = params
        .limit
        .as_deref()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(config.recent_limit);

    respond(
        service
            .recent_entries(&user_id, limit)
            .await
            .map(ApiResponse::success),
    )
}

pub async fn handle_unsupported_method() -> Reply {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ApiResponse::error("unsupported method")),
    )
}

pub async fn handle_not_found() -> Reply {
    (StatusCode::NOT_FOUND, Json(ApiResponse::error("page not found")))
}

async fn trace_request(request: Request, next: Next) -> Response {
    let span = tracing::info_span!(
        "request",
        id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let response = next.run(request).await;
        tracing::info!(status = response.status().as_u16(), "request handled");
        response
    }
    .instrument(span)
    .await
}

fn caller(headers: &HeaderMap, config: &GatewayConfig) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(&config.default_user)
        .to_string()
}

fn respond(result: Result<ApiResponse>) -> Reply {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(e) => {
            tracing::debug!("Request failed: {}", e);
            (e.status_code(), Json(ApiResponse::from(&e)))
        }
    }
}
