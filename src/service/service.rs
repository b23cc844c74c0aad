//! Document Service
//!
//! Orchestrates one request: validate input, run the store operation under
//! the request timeout, and on success hand a journal entry to the writer.
//! The journal side-channel never changes the outcome of the primary call.

use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{GatewayError, Result};
use crate::journal::JournalHandle;
use crate::query::{SearchCriteria, build_query};
use crate::store::DocumentStore;

pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    journal: JournalHandle,
    request_timeout: Duration,
}

impl DocumentService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        journal: JournalHandle,
        request_timeout: Duration,
    ) -> Self {
        Self {
            store,
            journal,
            request_timeout,
        }
    }

    pub fn journal(&self) -> &JournalHandle {
        &self.journal
    }

    /// Indexes `raw_payload` under `id`. The payload must be a non-empty JSON object.
    pub async fn add_document(&self, user_id: &str, id: &str, raw_payload: &str) -> Result<String> {
        validate_id(id)?;
        let document = parse_payload(raw_payload)?;

        let indexed_id = self.bounded(self.store.put(id, document)).await?;

        self.journal
            .submit(user_id, format!(r#"Index book to "{}""#, indexed_id));
        Ok(indexed_id)
    }

    pub async fn get_document(&self, user_id: &str, id: &str) -> Result<Value> {
        validate_id(id)?;

        match self.bounded(self.store.get(id)).await? {
            Some(document) => {
                self.journal
                    .submit(user_id, format!(r#"Retrieve book with id "{}""#, id));
                Ok(document)
            }
            None => Err(GatewayError::book_not_found()),
        }
    }

    pub async fn delete_document(&self, user_id: &str, id: &str) -> Result<()> {
        validate_id(id)?;

        if !self.bounded(self.store.delete(id)).await? {
            return Err(GatewayError::book_not_found());
        }

        self.journal
            .submit(user_id, format!(r#"Delete book with id "{}""#, id));
        Ok(())
    }

    /// Runs the composed query and returns every hit's stored document, in store order.
    pub async fn search(&self, user_id: &str, criteria: &SearchCriteria) -> Result<Vec<Value>> {
        let query = build_query(criteria);
        tracing::debug!("Composed query: {:?}", query);

        let hits = self.bounded(self.store.search(&query)).await?;

        self.journal.submit(
            user_id,
            format!(r#"Search for book(s) with title "{}""#, criteria.title_text()),
        );
        Ok(hits.into_iter().map(|hit| hit.source).collect())
    }

    /// Reads after the writer has caught up, so a caller sees its own latest action.
    pub async fn recent_entries(&self, user_id: &str, limit: usize) -> Result<Vec<String>> {
        let read = async {
            self.journal.flush().await;
            self.journal.journal().recent_entries(user_id, limit).await
        };
        match tokio::time::timeout(self.request_timeout, read).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::JournalUnavailable(format!(
                "timed out after {:?}",
                self.request_timeout
            ))),
        }
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("Document store call timed out after {:?}", self.request_timeout);
                Err(GatewayError::StoreUnavailable(format!(
                    "timed out after {:?}",
                    self.request_timeout
                )))
            }
        }
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(GatewayError::Validation("empty book id".into()));
    }
    Ok(())
}

fn parse_payload(raw: &str) -> Result<Value> {
    if raw.trim().is_empty() {
        return Err(GatewayError::Validation("empty book payload".into()));
    }
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| GatewayError::Validation(format!("malformed book payload: {}", e)))?;
    match &value {
        Value::Object(map) if !map.is_empty() => Ok(value),
        Value::Object(_) => Err(GatewayError::Validation("empty book payload".into())),
        _ => Err(GatewayError::Validation("book payload must be a JSON object".into())),
    }
}
