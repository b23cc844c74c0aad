//! Query Builder Tests
//!
//! ## Test Scopes
//! - **Composition**: which clauses appear for which criteria.
//! - **Parsing**: raw query-string values to `SearchCriteria`.
//! - **Rendering**: the search-engine request body.

#[cfg(test)]
mod tests {
    use crate::query::builder::build_query;
    use crate::query::types::{Clause, SearchCriteria, SortOrder};
    use serde_json::json;

    fn criteria(title: Option<&str>, from: Option<f64>, to: Option<f64>, sort: bool) -> SearchCriteria {
        SearchCriteria {
            title_match: title.map(str::to_string),
            price_from: from,
            price_to: to,
            sort_by_price_ascending: sort,
        }
    }

    // ============================================================
    // COMPOSITION
    // ============================================================

    #[test]
    fn test_title_only_yields_single_match_clause() {
        let query = build_query(&criteria(Some("Dune"), None, None, false));

        assert_eq!(query.must.len(), 1);
        assert_eq!(
            query.must[0],
            Clause::Match {
                field: "title".to_string(),
                text: "Dune".to_string()
            }
        );
        assert!(query.range_filter().is_none());
        assert!(query.sort.is_none());
    }

    #[test]
    fn test_both_bounds_yield_inclusive_range() {
        let query = build_query(&criteria(None, Some(5.0), Some(20.5), false));

        assert_eq!(query.must.len(), 1);
        assert_eq!(query.range_filter(), Some((5.0, 20.5)));
    }

    #[test]
    fn test_single_bound_is_ignored() {
        // Only one end of the range: no filter at all.
        let only_from = build_query(&criteria(None, Some(5.0), None, false));
        let only_to = build_query(&criteria(None, None, Some(20.0), false));

        assert!(only_from.range_filter().is_none());
        assert!(only_from.is_match_all());
        assert!(only_to.range_filter().is_none());
        assert!(only_to.is_match_all());
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        let query = build_query(&SearchCriteria::default());

        assert!(query.is_match_all());
        assert!(query.sort.is_none());
    }

    #[test]
    fn test_empty_title_is_treated_as_absent() {
        let query = build_query(&criteria(Some(""), None, None, false));
        assert!(query.is_match_all());
    }

    #[test]
    fn test_clause_order_is_match_then_range() {
        let query = build_query(&criteria(Some("Dune"), Some(1.0), Some(2.0), true));

        assert_eq!(query.must.len(), 2);
        assert!(matches!(query.must[0], Clause::Match { .. }));
        assert!(matches!(query.must[1], Clause::Range { .. }));
    }

    #[test]
    fn test_sort_flag_attaches_ascending_price_sort() {
        let query = build_query(&criteria(None, None, None, true));

        let sort = query.sort.expect("sort directive");
        assert_eq!(sort.field, "price");
        assert_eq!(sort.order, SortOrder::Asc);
    }

    #[test]
    fn test_build_is_repeatable() {
        let c = criteria(Some("Dune"), Some(1.0), Some(9.0), true);
        assert_eq!(build_query(&c), build_query(&c));
    }

    // ============================================================
    // PARSING
    // ============================================================

    #[test]
    fn test_from_params_parses_all_fields() {
        let c = SearchCriteria::from_params(Some("Dune"), Some("10"), Some("15.5"), Some("true"));

        assert_eq!(c.title_match.as_deref(), Some("Dune"));
        assert_eq!(c.price_from, Some(10.0));
        assert_eq!(c.price_to, Some(15.5));
        assert!(c.sort_by_price_ascending);
    }

    #[test]
    fn test_from_params_malformed_bounds_become_absent() {
        let c = SearchCriteria::from_params(None, Some("cheap"), Some("20"), None);

        assert_eq!(c.price_from, None);
        assert_eq!(c.price_to, Some(20.0));
        assert!(build_query(&c).range_filter().is_none());
    }

    #[test]
    fn test_from_params_blank_values() {
        let c = SearchCriteria::from_params(Some("   "), Some(""), Some(" "), Some(""));

        assert_eq!(c, SearchCriteria::default());
    }

    #[test]
    fn test_from_params_sort_flag_is_presence_based() {
        for raw in ["true", "1", "on", "yes", "false", " "] {
            assert!(
                SearchCriteria::from_params(None, None, None, Some(raw)).sort_by_price_ascending,
                "{:?} should enable sorting",
                raw
            );
        }
        assert!(!SearchCriteria::from_params(None, None, None, Some("")).sort_by_price_ascending);
        assert!(!SearchCriteria::from_params(None, None, None, None).sort_by_price_ascending);
    }

    // ============================================================
    // RENDERING
    // ============================================================

    #[test]
    fn test_match_all_body() {
        let body = build_query(&SearchCriteria::default()).to_search_body(10);

        assert_eq!(body, json!({ "query": { "match_all": {} }, "size": 10 }));
    }

    #[test]
    fn test_full_body() {
        let body = build_query(&criteria(Some("Dune"), Some(5.0), Some(20.0), true)).to_search_body(25);

        assert_eq!(
            body,
            json!({
                "query": {
                    "bool": {
                        "must": [
                            { "match": { "title": "Dune" } },
                            { "bool": { "filter": { "range": { "price": { "gte": 5.0, "lte": 20.0 } } } } }
                        ]
                    }
                },
                "size": 25,
                "sort": [ { "price": { "order": "asc" } } ]
            })
        );
    }
}
