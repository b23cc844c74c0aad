//! Book Schema
//!
//! Documents are stored as opaque JSON under a caller-supplied id. `Book` is
//! the shape the bulk loader produces and the mapping the index is created with.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Name of the index holding the catalog.
pub const INDEX_NAME: &str = "books";

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author_name: String,
    pub price: f64,
    pub publish_date: String,
    pub ebook_available: bool,
}

/// A search hit: the document id and its stored source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredHit {
    pub id: String,
    pub source: Value,
}

/// Index mapping: text fields carry a `raw` keyword sub-field for exact matching.
pub fn index_mapping() -> Value {
    let text_with_raw = json!({
        "type": "text",
        "fields": { "raw": { "type": "keyword" } }
    });

    json!({
        "mappings": {
            "properties": {
                "title": text_with_raw,
                "author_name": text_with_raw,
                "price": { "type": "float" },
                "ebook_available": { "type": "boolean" },
                "publish_date": { "type": "date" }
            }
        }
    })
}
