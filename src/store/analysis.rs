use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").unwrap());

/// Lowercased word tokens of a field value, deduplicated.
pub fn analyze_field(text: &str) -> HashSet<String> {
    WORD.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lowercased word tokens of a query string, in query order.
pub fn analyze_query(query: &str) -> Vec<String> {
    WORD.find_iter(&query.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Number of distinct query tokens present in `field_text`. Zero means no match.
pub fn match_score(query: &str, field_text: &str) -> usize {
    let field_tokens = analyze_field(field_text);
    let mut seen = HashSet::new();
    analyze_query(query)
        .into_iter()
        .filter(|token| seen.insert(token.clone()))
        .filter(|token| field_tokens.contains(token))
        .count()
}
