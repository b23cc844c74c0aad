//! Query Builder Module
//!
//! Turns the handful of optional search parameters a client may send into a
//! single structured request for the document store.
//!
//! ## Composition
//! - **Text**: at most one full-text `match` on `title`.
//! - **Range**: at most one inclusive `price` filter, only when both bounds are present.
//! - **Sort**: an optional ascending `price` sort; otherwise store relevance order.
//!
//! All clauses are AND-ed. No clauses means "match every document".
//!
//! ## Submodules
//! - **`types`**: `SearchCriteria`, `StructuredQuery` and the clause types.
//! - **`builder`**: the pure `build_query` function and parameter parsing.

pub mod builder;
pub mod types;

pub use builder::build_query;
pub use types::{Clause, SearchCriteria, SortDirective, SortOrder, StructuredQuery};

#[cfg(test)]
mod tests;
