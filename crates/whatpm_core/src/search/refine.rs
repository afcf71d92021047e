//! Client-side re-sort and re-filter of fetched search results.
//!
//! Both operations are pure and work on the last fetched result set, so
//! changing sort or filter never needs another storage round trip.

use crate::model::item::{Item, ItemType};
use std::cmp::Ordering;
use std::str::FromStr;

/// Local ordering applied to search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Keep fetch order (most recently created first).
    #[default]
    Relevance,
    TitleAsc,
    TitleDesc,
    /// Oldest published year first.
    YearAsc,
    /// Newest published year first.
    YearDesc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::TitleAsc => "title-asc",
            Self::TitleDesc => "title-desc",
            Self::YearAsc => "year-asc",
            Self::YearDesc => "year-desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "relevance" => Ok(Self::Relevance),
            "title-asc" => Ok(Self::TitleAsc),
            "title-desc" => Ok(Self::TitleDesc),
            "year-asc" => Ok(Self::YearAsc),
            "year-desc" => Ok(Self::YearDesc),
            other => Err(format!(
                "unknown sort `{other}`; expected relevance|title-asc|title-desc|year-asc|year-desc"
            )),
        }
    }
}

/// Local item-type filter applied to search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Only(ItemType),
}

impl TypeFilter {
    pub fn matches(self, item: &Item) -> bool {
        match self {
            Self::All => true,
            Self::Only(kind) => item.item_type() == kind,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        value.parse::<ItemType>().map(Self::Only)
    }
}

/// Filters then sorts `results` without mutating the source set.
///
/// Sorting is stable: equal keys keep fetch order.
pub fn refine(results: &[Item], sort: SortOrder, filter: TypeFilter) -> Vec<Item> {
    let mut refined: Vec<Item> = results
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect();

    match sort {
        SortOrder::Relevance => {}
        SortOrder::TitleAsc => refined.sort_by(compare_titles),
        SortOrder::TitleDesc => refined.sort_by(|a, b| compare_titles(b, a)),
        SortOrder::YearAsc => refined.sort_by_key(|item| item.published_year),
        SortOrder::YearDesc => {
            refined.sort_by(|a, b| b.published_year.cmp(&a.published_year))
        }
    }

    refined
}

fn compare_titles(a: &Item, b: &Item) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
}

#[cfg(test)]
mod tests {
    use super::{SortOrder, TypeFilter};
    use crate::model::item::ItemType;

    #[test]
    fn sort_order_parses_wire_values() {
        for sort in [
            SortOrder::Relevance,
            SortOrder::TitleAsc,
            SortOrder::TitleDesc,
            SortOrder::YearAsc,
            SortOrder::YearDesc,
        ] {
            assert_eq!(sort.as_str().parse::<SortOrder>().unwrap(), sort);
        }
        assert!("popularity".parse::<SortOrder>().is_err());
    }

    #[test]
    fn type_filter_parses_all_and_types() {
        assert_eq!("all".parse::<TypeFilter>().unwrap(), TypeFilter::All);
        assert_eq!(
            "Show".parse::<TypeFilter>().unwrap(),
            TypeFilter::Only(ItemType::Show)
        );
    }
}
