//! Activity Journal Module
//!
//! An append-only, per-user log of successful operations with "most recent
//! first" retrieval, kept in a ranked set keyed by user id. Members are the
//! human-readable descriptions; scores are millisecond timestamps.
//!
//! ## Write path
//! Recording is best-effort. `ActivityJournal::record` validates and writes
//! but never returns an error; the request path does not even wait for it:
//! it hands entries to a `JournalWriter` task through a `JournalHandle`.
//!
//! ## Read path
//! `recent_entries` is the only operation that surfaces
//! `GatewayError::JournalUnavailable`.
//!
//! ## Submodules
//! - **`store`**: the `RankedStore` seam with Redis and in-process backends.
//! - **`writer`**: background writer task and its handle.
//! - **`types`**: `ActivityEntry` and the journal clock.

pub mod store;
pub mod types;
pub mod writer;

use std::sync::Arc;

use crate::error::{GatewayError, Result};
use store::RankedStore;
use types::{ActivityEntry, JournalClock};

pub use store::{MemoryRankedStore, RedisRankedStore};
pub use writer::{JournalHandle, JournalWriter};

pub struct ActivityJournal {
    store: Arc<dyn RankedStore>,
    clock: JournalClock,
    retention: Option<usize>,
}

impl ActivityJournal {
    pub fn new(store: Arc<dyn RankedStore>) -> Self {
        Self {
            store,
            clock: JournalClock::new(),
            retention: None,
        }
    }

    /// Keep at most `keep` newest entries per user. Off by default.
    pub fn with_retention(mut self, keep: Option<usize>) -> Self {
        self.retention = keep.filter(|k| *k > 0);
        self
    }

    /// Stamps and writes one entry. Returns whether it was written.
    ///
    /// Empty user ids or descriptions and store failures are logged and
    /// swallowed.
    pub async fn record(&self, user_id: &str, description: &str) -> bool {
        if user_id.is_empty() || description.is_empty() {
            tracing::warn!("Journal: refusing entry with empty user or description");
            return false;
        }

        let entry = ActivityEntry {
            user_id: user_id.to_string(),
            description: description.to_string(),
            timestamp: self.clock.next(),
        };

        if let Err(e) = self
            .store
            .add(&entry.user_id, &entry.description, entry.timestamp)
            .await
        {
            tracing::error!("Journal: could not record entry for {}: {}", entry.user_id, e);
            return false;
        }

        if let Some(keep) = self.retention
            && let Err(e) = self.store.trim(&entry.user_id, keep).await
        {
            tracing::warn!("Journal: could not trim entries for {}: {}", entry.user_id, e);
        }

        tracing::debug!(
            "Journal: recorded '{}' for {} at {}",
            entry.description,
            entry.user_id,
            entry.timestamp
        );
        true
    }

    /// The `limit` most recent descriptions for `user_id`, newest first.
    pub async fn recent_entries(&self, user_id: &str, limit: usize) -> Result<Vec<String>> {
        if user_id.is_empty() {
            return Err(GatewayError::JournalUnavailable("empty user id".into()));
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        self.store.top(user_id, limit).await.map_err(|e| {
            tracing::error!("Journal: could not read entries for {}: {}", user_id, e);
            GatewayError::JournalUnavailable(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests;
