//! Structured JSON export.

use crate::model::item::{Item, ItemRecord, ItemType};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Version tag written into every JSON export.
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// Per-type item counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTypeCounts {
    pub books: usize,
    pub movies: usize,
    pub shows: usize,
}

impl ItemTypeCounts {
    pub fn tally<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
        let mut counts = Self::default();
        for item in items {
            counts.increment(item.item_type());
        }
        counts
    }

    pub fn increment(&mut self, kind: ItemType) {
        match kind {
            ItemType::Book => self.books += 1,
            ItemType::Movie => self.movies += 1,
            ItemType::Show => self.shows += 1,
        }
    }

    pub fn get(&self, kind: ItemType) -> usize {
        match kind {
            ItemType::Book => self.books,
            ItemType::Movie => self.movies,
            ItemType::Show => self.shows,
        }
    }

    pub fn total(&self) -> usize {
        self.books + self.movies + self.shows
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// RFC 3339 UTC timestamp of the export.
    pub export_date: String,
    pub version: String,
    pub total_items: usize,
    pub item_types: ItemTypeCounts,
}

/// Full JSON export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub items: Vec<ItemRecord>,
}

impl ExportDocument {
    pub fn new(items: &[Item], exported_at: DateTime<Utc>) -> Self {
        Self {
            metadata: ExportMetadata {
                export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                version: EXPORT_FORMAT_VERSION.to_string(),
                total_items: items.len(),
                item_types: ItemTypeCounts::tally(items),
            },
            items: items.iter().map(ItemRecord::from).collect(),
        }
    }
}

/// Serializes items as a pretty-printed (2-space) export document.
pub fn items_to_json(items: &[Item], exported_at: DateTime<Utc>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ExportDocument::new(items, exported_at))
}
