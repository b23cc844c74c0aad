//! In-Process Document Store
//!
//! A `DashMap`-backed implementation of `DocumentStore` that evaluates
//! `StructuredQuery` the way the search engine does for this schema:
//! a `match` hits when any analysed query token occurs in the analysed field,
//! a range is inclusive on the numeric value, and results come back by match
//! score (insertion order on ties) unless a price sort is requested.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use super::DocumentStore;
use super::analysis::match_score;
use super::types::StoredHit;
use crate::error::Result;
use crate::query::{Clause, StructuredQuery};

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    document: Value,
}

pub struct MemoryStore {
    documents: DashMap<String, Entry>,
    next_seq: AtomicU64,
    max_hits: usize,
}

impl MemoryStore {
    pub fn new(max_hits: usize) -> Self {
        Self {
            documents: DashMap::new(),
            next_seq: AtomicU64::new(0),
            max_hits: max_hits.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn store_local(&self, id: String, document: Value) {
        let seq = self.next_seq.fetch_add(1, AtomicOrdering::Relaxed);
        self.documents.insert(id, Entry { seq, document });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn put(&self, id: &str, document: Value) -> Result<String> {
        self.store_local(id.to_string(), document);
        tracing::debug!("Stored book {} in memory", id);
        Ok(id.to_string())
    }

    async fn get(&self, id: &str) -> Result<Option<Value>> {
        Ok(self.documents.get(id).map(|entry| entry.document.clone()))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.documents.remove(id).is_some())
    }

    async fn search(&self, query: &StructuredQuery) -> Result<Vec<StoredHit>> {
        let mut scored: Vec<(usize, u64, StoredHit)> = Vec::new();

        for entry in self.documents.iter() {
            if let Some(score) = evaluate(&query.must, &entry.value().document) {
                scored.push((
                    score,
                    entry.value().seq,
                    StoredHit {
                        id: entry.key().clone(),
                        source: entry.value().document.clone(),
                    },
                ));
            }
        }

        match &query.sort {
            // `SortOrder` only has `Asc`.
            Some(sort) => scored.sort_by(|a, b| {
                compare_numeric(&a.2.source, &b.2.source, &sort.field).then(a.1.cmp(&b.1))
            }),
            None => scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1))),
        }

        Ok(scored
            .into_iter()
            .take(self.max_hits)
            .map(|(_, _, hit)| hit)
            .collect())
    }

    async fn put_many(&self, documents: Vec<(Option<String>, Value)>) -> Result<usize> {
        let count = documents.len();
        for (id, document) in documents {
            let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            self.store_local(id, document);
        }
        Ok(count)
    }
}

/// Returns the relevance score when every clause holds, `None` otherwise.
fn evaluate(clauses: &[Clause], document: &Value) -> Option<usize> {
    let mut score = 0;
    for clause in clauses {
        match clause {
            Clause::Match { field, text } => {
                let field_text = document.get(field).and_then(Value::as_str)?;
                let hits = match_score(text, field_text);
                if hits == 0 {
                    return None;
                }
                score += hits;
            }
            Clause::Range { field, gte, lte } => {
                let value = numeric(document.get(field)?)?;
                if value < *gte || value > *lte {
                    return None;
                }
            }
        }
    }
    Some(score)
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Documents without a numeric value for `field` sort last.
fn compare_numeric(a: &Value, b: &Value, field: &str) -> Ordering {
    let a = a.get(field).and_then(numeric);
    let b = b.get(field).and_then(numeric);
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
