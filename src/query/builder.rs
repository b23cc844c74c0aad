use super::types::{
    Clause, PRICE_FIELD, SearchCriteria, SortDirective, SortOrder, StructuredQuery, TITLE_FIELD,
};

/// Composes a `StructuredQuery` from search criteria.
///
/// Pure and deterministic. A single price bound is ignored: the range filter
/// needs both ends.
pub fn build_query(criteria: &SearchCriteria) -> StructuredQuery {
    let mut must = Vec::new();

    if let Some(title) = criteria.title_match.as_deref()
        && !title.is_empty()
    {
        must.push(Clause::Match {
            field: TITLE_FIELD.to_string(),
            text: title.to_string(),
        });
    }

    if let (Some(from), Some(to)) = (criteria.price_from, criteria.price_to) {
        must.push(Clause::Range {
            field: PRICE_FIELD.to_string(),
            gte: from,
            lte: to,
        });
    }

    let sort = criteria.sort_by_price_ascending.then(|| SortDirective {
        field: PRICE_FIELD.to_string(),
        order: SortOrder::Asc,
    });

    StructuredQuery { must, sort }
}

impl SearchCriteria {
    /// Builds criteria from raw query-string values.
    ///
    /// Blank titles and blank or non-numeric bounds become `None`. The sort
    /// flag is on whenever `sort` is present and non-empty.
    pub fn from_params(
        title: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
        sort: Option<&str>,
    ) -> Self {
        Self {
            title_match: title
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            price_from: parse_bound(from),
            price_to: parse_bound(to),
            sort_by_price_ascending: parse_flag(sort),
        }
    }

    /// Title text used in journal descriptions; empty when no title was given.
    pub fn title_text(&self) -> &str {
        self.title_match.as_deref().unwrap_or("")
    }
}

fn parse_bound(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Presence switch: any non-empty value turns the flag on, including `false`.
fn parse_flag(raw: Option<&str>) -> bool {
    raw.is_some_and(|s| !s.is_empty())
}
