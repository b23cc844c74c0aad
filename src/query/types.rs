use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Field carrying the searchable book title.
pub const TITLE_FIELD: &str = "title";
/// Numeric field used for range filtering and sorting.
pub const PRICE_FIELD: &str = "price";

/// Request-scoped search parameters.
///
/// A range filter is only applied when both `price_from` and `price_to` are
/// present. An entirely empty value matches every document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub title_match: Option<String>,
    pub price_from: Option<f64>,
    pub price_to: Option<f64>,
    pub sort_by_price_ascending: bool,
}

/// A single required sub-query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Clause {
    /// Full-text match: analysed `text` against analysed `field`.
    Match { field: String, text: String },
    /// Inclusive numeric range `[gte, lte]` applied as a filter.
    Range { field: String, gte: f64, lte: f64 },
}

/// Only ascending price order is ever requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortDirective {
    pub field: String,
    pub order: SortOrder,
}

/// The composed boolean / range / sort request handed to a `DocumentStore`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    /// Sub-queries combined with logical AND, in insertion order.
    pub must: Vec<Clause>,
    pub sort: Option<SortDirective>,
}

impl StructuredQuery {
    pub fn is_match_all(&self) -> bool {
        self.must.is_empty()
    }

    pub fn range_filter(&self) -> Option<(f64, f64)> {
        self.must.iter().find_map(|clause| match clause {
            Clause::Range { gte, lte, .. } => Some((*gte, *lte)),
            Clause::Match { .. } => None,
        })
    }

    /// Renders the request body for the search engine's `_search` endpoint.
    pub fn to_search_body(&self, size: usize) -> Value {
        let query = if self.is_match_all() {
            json!({ "match_all": {} })
        } else {
            let must: Vec<Value> = self.must.iter().map(Clause::to_dsl).collect();
            json!({ "bool": { "must": must } })
        };

        let mut body = json!({ "query": query, "size": size });
        if let Some(sort) = &self.sort {
            body["sort"] = json!([{ sort.field.as_str(): { "order": sort.order } }]);
        }
        body
    }
}

impl Clause {
    fn to_dsl(&self) -> Value {
        match self {
            Clause::Match { field, text } => json!({ "match": { field.as_str(): text } }),
            Clause::Range { field, gte, lte } => json!({
                "bool": {
                    "filter": { "range": { field.as_str(): { "gte": gte, "lte": lte } } }
                }
            }),
        }
    }
}
