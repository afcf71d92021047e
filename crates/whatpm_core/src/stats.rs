//! Aggregate statistics over logged items.
//!
//! Computed from validated items only, so rows rejected by the item
//! validator never inflate counts.

use crate::export::json::ItemTypeCounts;
use crate::model::item::{Item, ItemType};
use std::collections::BTreeMap;

/// Count for one item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeCount {
    pub itemtype: ItemType,
    pub count: usize,
}

/// Running totals per type up to and including `year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CumulativeYear {
    pub year: i32,
    pub books: usize,
    pub movies: usize,
    pub shows: usize,
}

/// Snapshot backing the stats view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Counts across all years, always in Book, Movie, Show order.
    pub totals: Vec<TypeCount>,
    /// Counts for `current_year`, same order as `totals`.
    pub current_year_counts: Vec<TypeCount>,
    pub current_year: i32,
    /// Number of distinct years with at least one logged item.
    pub years_logged: usize,
    /// Ascending by year.
    pub cumulative: Vec<CumulativeYear>,
}

/// Builds a stats snapshot for `current_year`.
pub fn compute_stats(items: &[Item], current_year: i32) -> StatsSnapshot {
    let totals = ItemTypeCounts::tally(items);
    let current = ItemTypeCounts::tally(
        items
            .iter()
            .filter(|item| item.belongs_to_year == current_year),
    );

    let mut per_year: BTreeMap<i32, ItemTypeCounts> = BTreeMap::new();
    for item in items {
        per_year
            .entry(item.belongs_to_year)
            .or_default()
            .increment(item.item_type());
    }

    let mut running = ItemTypeCounts::default();
    let cumulative = per_year
        .iter()
        .map(|(year, counts)| {
            running.books += counts.books;
            running.movies += counts.movies;
            running.shows += counts.shows;
            CumulativeYear {
                year: *year,
                books: running.books,
                movies: running.movies,
                shows: running.shows,
            }
        })
        .collect();

    StatsSnapshot {
        totals: ordered_counts(&totals),
        current_year_counts: ordered_counts(&current),
        current_year,
        years_logged: per_year.len(),
        cumulative,
    }
}

fn ordered_counts(counts: &ItemTypeCounts) -> Vec<TypeCount> {
    ItemType::ALL
        .iter()
        .map(|itemtype| TypeCount {
            itemtype: *itemtype,
            count: counts.get(*itemtype),
        })
        .collect()
}
