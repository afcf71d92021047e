//! Item domain model.
//!
//! # Responsibility
//! - Define the canonical record for one logged book, movie or show.
//! - Provide the flat wire shape used by persistence and JSON export.
//!
//! # Invariants
//! - Exactly one of author/director/season is populated, selected by
//!   `ItemType`. `ItemKind` makes any other combination unrepresentable.
//! - `id` is opaque and never reused for another item.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Opaque stable identifier of a logged item.
pub type ItemId = String;

/// Lower bound shared by published-year and year-logged checks.
pub const MIN_YEAR: i32 = 1600;
/// How far past the current calendar year a year value may go.
pub const MAX_FUTURE_YEARS: i32 = 10;

/// Discriminator stored in the `itemtype` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemType {
    Book,
    Movie,
    Show,
}

impl ItemType {
    /// All variants in display order (Book, Movie, Show).
    pub const ALL: [ItemType; 3] = [ItemType::Book, ItemType::Movie, ItemType::Show];

    /// Literal persisted in `items.itemtype`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Book => "Book",
            Self::Movie => "Movie",
            Self::Show => "Show",
        }
    }

    /// Parses the exact persisted literal. Case-sensitive.
    pub fn from_literal(value: &str) -> Option<Self> {
        match value {
            "Book" => Some(Self::Book),
            "Movie" => Some(Self::Movie),
            "Show" => Some(Self::Show),
            _ => None,
        }
    }
}

impl Display for ItemType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = String;

    /// Lenient parser for CLI input: accepts any casing.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "book" => Ok(Self::Book),
            "movie" => Ok(Self::Movie),
            "show" => Ok(Self::Show),
            other => Err(format!("unknown item type `{other}`; expected book|movie|show")),
        }
    }
}

/// Type-specific payload of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Book { author: String },
    Movie { director: String },
    Show { season: i32, in_progress: Option<bool> },
}

impl ItemKind {
    pub fn item_type(&self) -> ItemType {
        match self {
            Self::Book { .. } => ItemType::Book,
            Self::Movie { .. } => ItemType::Movie,
            Self::Show { .. } => ItemType::Show,
        }
    }

    pub fn author(&self) -> Option<&str> {
        match self {
            Self::Book { author } => Some(author),
            _ => None,
        }
    }

    pub fn director(&self) -> Option<&str> {
        match self {
            Self::Movie { director } => Some(director),
            _ => None,
        }
    }

    pub fn season(&self) -> Option<i32> {
        match self {
            Self::Show { season, .. } => Some(*season),
            _ => None,
        }
    }

    pub fn in_progress(&self) -> Option<bool> {
        match self {
            Self::Show { in_progress, .. } => *in_progress,
            _ => None,
        }
    }
}

/// A validated, typed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub kind: ItemKind,
    pub published_year: i32,
    /// Calendar year the item was added to the log.
    pub belongs_to_year: i32,
    /// Marks a re-read or re-watch.
    pub redo: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Item {
    pub fn item_type(&self) -> ItemType {
        self.kind.item_type()
    }

    /// Flat wire representation with non-applicable fields set to null.
    pub fn to_record(&self) -> ItemRecord {
        ItemRecord::from(self)
    }
}

/// Flat persisted/exported shape of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub title: String,
    pub itemtype: ItemType,
    pub author: Option<String>,
    pub director: Option<String>,
    pub season: Option<i32>,
    pub in_progress: Option<bool>,
    pub published_year: i32,
    pub belongs_to_year: i32,
    pub redo: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<&Item> for ItemRecord {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            itemtype: item.item_type(),
            author: item.kind.author().map(str::to_string),
            director: item.kind.director().map(str::to_string),
            season: item.kind.season(),
            in_progress: item.kind.in_progress(),
            published_year: item.published_year,
            belongs_to_year: item.belongs_to_year,
            redo: item.redo,
            created_at: item.created_at.clone(),
            updated_at: item.updated_at.clone(),
        }
    }
}

/// Validated form payload ready to be written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub title: String,
    pub kind: ItemKind,
    pub published_year: i32,
    pub redo: bool,
    /// Set only by update forms; creation assigns the current year.
    pub belongs_to_year: Option<i32>,
}

/// Generates a fresh opaque item id.
pub fn new_item_id() -> ItemId {
    Uuid::new_v4().to_string()
}

/// Inclusive upper bound for year fields given the current calendar year.
pub fn max_year(current_year: i32) -> i32 {
    current_year + MAX_FUTURE_YEARS
}

#[cfg(test)]
mod tests {
    use super::{Item, ItemKind, ItemType};

    #[test]
    fn item_type_literal_roundtrip_is_case_sensitive() {
        for kind in ItemType::ALL {
            assert_eq!(ItemType::from_literal(kind.as_str()), Some(kind));
        }
        assert_eq!(ItemType::from_literal("book"), None);
    }

    #[test]
    fn cli_parser_accepts_any_casing() {
        assert_eq!("MOVIE".parse::<ItemType>().unwrap(), ItemType::Movie);
        assert!("podcast".parse::<ItemType>().is_err());
    }

    #[test]
    fn record_nulls_non_applicable_fields() {
        let item = Item {
            id: "s1".to_string(),
            title: "Severance".to_string(),
            kind: ItemKind::Show {
                season: 2,
                in_progress: Some(true),
            },
            published_year: 2025,
            belongs_to_year: 2025,
            redo: false,
            created_at: None,
            updated_at: None,
        };

        let record = item.to_record();
        assert_eq!(record.itemtype, ItemType::Show);
        assert_eq!(record.season, Some(2));
        assert_eq!(record.in_progress, Some(true));
        assert_eq!(record.author, None);
        assert_eq!(record.director, None);
    }
}
