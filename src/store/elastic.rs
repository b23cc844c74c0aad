//! Search Engine Client
//!
//! Talks to the search engine's REST API over one pooled `reqwest::Client`
//! created at startup. Transport failures are retried with exponential
//! backoff and jitter; HTTP-level "not found" answers are mapped to the
//! adapter's domain outcomes instead of errors.

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

use super::DocumentStore;
use super::types::{INDEX_NAME, StoredHit, index_mapping};
use crate::error::{GatewayError, Result};
use crate::query::StructuredQuery;

const CALL_TIMEOUT: Duration = Duration::from_millis(2_000);
const RETRY_ATTEMPTS: usize = 3;
const INDEX_EXISTS: &str = "resource_already_exists_exception";

#[derive(Debug, Deserialize)]
struct IndexResponse {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source", default)]
    source: Value,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct PingResponse {
    version: VersionInfo,
}

#[derive(Debug, Deserialize)]
struct VersionInfo {
    number: String,
}

pub struct ElasticStore {
    http_client: reqwest::Client,
    base_url: Url,
    max_hits: usize,
    call_timeout: Duration,
}

impl ElasticStore {
    pub fn new(base_url: &str, max_hits: usize) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            GatewayError::StoreUnavailable(format!("invalid store url {}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::StoreUnavailable(format!(
                "invalid store url {}",
                base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            max_hits: max_hits.max(1),
            call_timeout: CALL_TIMEOUT,
        })
    }

    /// Builds the client, checks the engine answers and makes sure the index exists.
    pub async fn connect(base_url: &str, max_hits: usize) -> Result<Self> {
        let store = Self::new(base_url, max_hits)?;
        let version = store.ping().await?;
        tracing::info!("Search engine at {} answered with version {}", store.base_url, version);
        store.ensure_index().await?;
        Ok(store)
    }

    /// Returns the engine version number.
    pub async fn ping(&self) -> Result<String> {
        let request = self.http_client.get(self.base_url.clone());
        let response = self.send_with_retry(request, RETRY_ATTEMPTS).await?;
        if !response.status().is_success() {
            return Err(rejection(response, "ping").await);
        }
        let info: PingResponse = response.json().await?;
        Ok(info.version.number)
    }

    /// Creates the `books` index with its mapping when it does not exist yet.
    pub async fn ensure_index(&self) -> Result<()> {
        let url = self.url(&[INDEX_NAME])?;

        let exists = self
            .send_with_retry(self.http_client.request(Method::HEAD, url.clone()), RETRY_ATTEMPTS)
            .await?;
        if exists.status().is_success() {
            tracing::debug!("Index {} already present", INDEX_NAME);
            return Ok(());
        }
        if exists.status() != StatusCode::NOT_FOUND {
            return Err(rejection(exists, "index lookup").await);
        }

        let created = self
            .send_with_retry(self.http_client.put(url).json(&index_mapping()), RETRY_ATTEMPTS)
            .await?;
        if created.status() == StatusCode::BAD_REQUEST {
            let body = created.text().await.unwrap_or_default();
            if error_type(&body).as_deref() == Some(INDEX_EXISTS) {
                tracing::debug!("Index {} created concurrently", INDEX_NAME);
                return Ok(());
            }
            return Err(GatewayError::Validation(format!(
                "index creation rejected by store: {}",
                error_reason(&body)
            )));
        }
        if !created.status().is_success() {
            return Err(rejection(created, "index creation").await);
        }

        tracing::info!("Created index {}", INDEX_NAME);
        Ok(())
    }

    /// Submits a newline-delimited `_bulk` payload; returns accepted item count.
    pub async fn bulk(&self, payload: String) -> Result<usize> {
        let mut url = self.url(&["_bulk"])?;
        url.query_pairs_mut().append_pair("refresh", "wait_for");

        let request = self
            .http_client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(payload);
        // Bulk items without ids are not idempotent: single attempt.
        let response = self.send_with_retry(request, 1).await?;
        if !response.status().is_success() {
            return Err(rejection(response, "bulk").await);
        }

        let result: BulkResponse = response.json().await?;
        let accepted = result
            .items
            .iter()
            .filter(|item| {
                item.as_object()
                    .and_then(|obj| obj.values().next())
                    .and_then(|inner| inner.get("status"))
                    .and_then(Value::as_u64)
                    .is_some_and(|status| status < 300)
            })
            .count();
        if result.errors {
            tracing::warn!(
                "Bulk load accepted {} of {} documents",
                accepted,
                result.items.len()
            );
        }
        Ok(accepted)
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::StoreUnavailable("store url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn doc_url(&self, id: &str) -> Result<Url> {
        let mut url = self.url(&[INDEX_NAME, "_doc", id])?;
        url.query_pairs_mut().append_pair("refresh", "wait_for");
        Ok(url)
    }

    async fn send_with_retry(
        &self,
        request: reqwest::RequestBuilder,
        attempts: usize,
    ) -> Result<reqwest::Response> {
        let mut delay_ms = 150u64;

        for attempt in 0..attempts {
            let Some(attempt_request) = request.try_clone() else {
                return Err(GatewayError::StoreUnavailable(
                    "request body cannot be replayed".into(),
                ));
            };

            match attempt_request.timeout(self.call_timeout).send().await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if attempt + 1 == attempts {
                        return Err(GatewayError::from(e));
                    }
                    tracing::debug!("Store call failed (attempt {}): {}", attempt + 1, e);
                    let jitter = rand::random::<u64>() % 50;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(1200);
                }
            }
        }

        Err(GatewayError::StoreUnavailable("retry attempts exhausted".into()))
    }
}

#[async_trait]
impl DocumentStore for ElasticStore {
    async fn put(&self, id: &str, document: Value) -> Result<String> {
        let request = self.http_client.put(self.doc_url(id)?).json(&document);
        let response = self.send_with_retry(request, RETRY_ATTEMPTS).await?;
        if !response.status().is_success() {
            return Err(rejection(response, "index").await);
        }

        let indexed: IndexResponse = response.json().await?;
        tracing::info!("Indexed book {} to index {}", indexed.id, INDEX_NAME);
        Ok(indexed.id)
    }

    async fn get(&self, id: &str) -> Result<Option<Value>> {
        let request = self.http_client.get(self.url(&[INDEX_NAME, "_doc", id])?);
        let response = self.send_with_retry(request, RETRY_ATTEMPTS).await?;

        // Covers both a missing document and a missing index.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(rejection(response, "get").await);
        }

        let doc: GetResponse = response.json().await?;
        let found = doc.found;
        Ok(doc.source.filter(|_| found))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let request = self.http_client.delete(self.doc_url(id)?);
        let response = self.send_with_retry(request, RETRY_ATTEMPTS).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(rejection(response, "delete").await);
        }

        tracing::info!("Deleted book {} from index {}", id, INDEX_NAME);
        Ok(true)
    }

    async fn search(&self, query: &StructuredQuery) -> Result<Vec<StoredHit>> {
        let body = query.to_search_body(self.max_hits);
        tracing::debug!("Search request: {}", body);

        let request = self.http_client.post(self.url(&[INDEX_NAME, "_search"])?).json(&body);
        let response = self.send_with_retry(request, RETRY_ATTEMPTS).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(rejection(response, "search").await);
        }

        let result: SearchResponse = response.json().await?;
        Ok(result
            .hits
            .hits
            .into_iter()
            .map(|hit| StoredHit {
                id: hit.id,
                source: hit.source,
            })
            .collect())
    }

    async fn put_many(&self, documents: Vec<(Option<String>, Value)>) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }
        let payload = bulk_body(INDEX_NAME, &documents)
            .map_err(|e| GatewayError::Validation(format!("unserializable document: {}", e)))?;
        self.bulk(payload).await
    }
}

/// Renders a `_bulk` NDJSON body: one `index` action line per document,
/// followed by the document itself.
pub fn bulk_body(
    index: &str,
    documents: &[(Option<String>, Value)],
) -> std::result::Result<String, serde_json::Error> {
    let mut out = String::new();
    for (id, document) in documents {
        let action = match id {
            Some(id) => json!({ "index": { "_index": index, "_id": id } }),
            None => json!({ "index": { "_index": index } }),
        };
        out.push_str(&serde_json::to_string(&action)?);
        out.push('\n');
        out.push_str(&serde_json::to_string(document)?);
        out.push('\n');
    }
    Ok(out)
}

async fn rejection(response: reqwest::Response, op: &str) -> GatewayError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status == StatusCode::BAD_REQUEST {
        GatewayError::Validation(format!("{} rejected by store: {}", op, error_reason(&body)))
    } else {
        tracing::error!("Store {} failed with status {}: {}", op, status, error_reason(&body));
        GatewayError::StoreUnavailable(format!("{} failed with status {}", op, status))
    }
}

/// Pulls `error.reason` out of an engine error body, or a short prefix of the raw text.
pub(crate) fn error_reason(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/reason")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

pub(crate) fn error_type(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .pointer("/error/type")
        .and_then(Value::as_str)
        .map(str::to_string)
}
