//! Free-text item search state and query shaping.
//!
//! # Responsibility
//! - Decide whether a query is long enough to hit storage.
//! - Escape `LIKE` wildcards so user input matches literally.
//!
//! # Invariants
//! - Queries shorter than [`MIN_QUERY_CHARS`] after trimming never reach
//!   storage and yield an empty, non-initial state.
//! - `%`, `_` and the escape character `\` are always escaped.

use crate::model::item::Item;

/// Minimum trimmed query length that triggers a storage lookup.
pub const MIN_QUERY_CHARS: usize = 2;
/// Upper bound of rows returned by one search.
pub const MAX_RESULTS: u32 = 100;
/// Escape character passed to SQL `LIKE ... ESCAPE`.
pub const LIKE_ESCAPE: char = '\\';

/// Result envelope for one search invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    /// Query as submitted (untrimmed).
    pub query: String,
    /// Matches, most recently created first.
    pub results: Vec<Item>,
    /// `true` only before any search has been run.
    pub initial: bool,
    /// User-facing notice when the search could not be completed.
    pub message: Option<String>,
}

impl SearchState {
    /// State before any search has been submitted.
    pub fn initial() -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            initial: true,
            message: None,
        }
    }

    /// Completed search with no storage lookup or zero matches.
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            results: Vec::new(),
            initial: false,
            message: None,
        }
    }
}

/// Returns the trimmed search term, or `None` when it is too short.
pub fn normalize_query(query: &str) -> Option<&str> {
    let trimmed = query.trim();
    if trimmed.chars().count() < MIN_QUERY_CHARS {
        return None;
    }
    Some(trimmed)
}

/// Escapes `LIKE` metacharacters with [`LIKE_ESCAPE`].
pub fn escape_like_term(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{escape_like_term, normalize_query};

    #[test]
    fn short_queries_are_dropped_after_trim() {
        assert_eq!(normalize_query("  a  "), None);
        assert_eq!(normalize_query(""), None);
        assert_eq!(normalize_query(" du "), Some("du"));
    }

    #[test]
    fn wildcards_and_escape_char_are_escaped() {
        assert_eq!(escape_like_term("50%"), r"50\%");
        assert_eq!(escape_like_term("a_b"), r"a\_b");
        assert_eq!(escape_like_term(r"c:\d"), r"c:\\d");
        assert_eq!(escape_like_term("plain"), "plain");
    }
}
