//! Raw record validation.
//!
//! # Responsibility
//! - Turn an untyped storage row into a canonical `Item`, or reject it.
//!
//! # Invariants
//! - Pure and deterministic: the same record always yields the same result.
//! - Rows violating the per-type field rule are rejected, never coerced.
//! - Fields that do not apply to the resolved type are discarded.

use crate::model::item::{Item, ItemKind, ItemType};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Untyped row as fetched from storage.
pub type RawRecord = Map<String, Value>;

/// Reason a raw record was not accepted as an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemRejection {
    /// A common field is missing or has the wrong JSON type.
    InvalidStructure,
    /// The type-specific required field is null, empty or zero.
    MissingField {
        itemtype: ItemType,
        field: &'static str,
    },
}

impl Display for ItemRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStructure => write!(f, "invalid item structure"),
            Self::MissingField { itemtype, field } => {
                write!(f, "{itemtype} item missing {field}")
            }
        }
    }
}

impl Error for ItemRejection {}

/// Validates one raw record into a typed item.
///
/// # Errors
/// - `InvalidStructure` when `id`/`title` are not strings, `itemtype` is not
///   one of the three literals, years are not integers or `redo` is not a
///   boolean.
/// - `MissingField` when the type-specific field is absent.
pub fn validate_raw_item(raw: &RawRecord) -> Result<Item, ItemRejection> {
    let id = string_field(raw, "id").ok_or(ItemRejection::InvalidStructure)?;
    let title = string_field(raw, "title").ok_or(ItemRejection::InvalidStructure)?;
    let itemtype = string_field(raw, "itemtype")
        .and_then(ItemType::from_literal)
        .ok_or(ItemRejection::InvalidStructure)?;
    let published_year = int_field(raw, "published_year").ok_or(ItemRejection::InvalidStructure)?;
    let belongs_to_year =
        int_field(raw, "belongs_to_year").ok_or(ItemRejection::InvalidStructure)?;
    let redo = raw
        .get("redo")
        .and_then(Value::as_bool)
        .ok_or(ItemRejection::InvalidStructure)?;

    let missing = |field| ItemRejection::MissingField { itemtype, field };
    let kind = match itemtype {
        ItemType::Book => ItemKind::Book {
            author: non_empty_string(raw, "author").ok_or_else(|| missing("author"))?,
        },
        ItemType::Movie => ItemKind::Movie {
            director: non_empty_string(raw, "director").ok_or_else(|| missing("director"))?,
        },
        ItemType::Show => ItemKind::Show {
            season: int_field(raw, "season")
                .filter(|season| *season != 0)
                .ok_or_else(|| missing("season"))?,
            in_progress: raw.get("in_progress").and_then(Value::as_bool),
        },
    };

    Ok(Item {
        id: id.to_string(),
        title: title.to_string(),
        kind,
        published_year,
        belongs_to_year,
        redo,
        created_at: string_field(raw, "created_at").map(str::to_string),
        updated_at: string_field(raw, "updated_at").map(str::to_string),
    })
}

/// Validates a batch, splitting accepted items from rejection reasons.
///
/// Input order is preserved for accepted items.
pub fn validate_raw_items(rows: &[RawRecord]) -> (Vec<Item>, Vec<ItemRejection>) {
    let mut items = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();
    for row in rows {
        match validate_raw_item(row) {
            Ok(item) => items.push(item),
            Err(reason) => rejected.push(reason),
        }
    }
    (items, rejected)
}

fn string_field<'a>(raw: &'a RawRecord, key: &str) -> Option<&'a str> {
    raw.get(key).and_then(Value::as_str)
}

fn non_empty_string(raw: &RawRecord, key: &str) -> Option<String> {
    string_field(raw, key)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn int_field(raw: &RawRecord, key: &str) -> Option<i32> {
    raw.get(key)
        .and_then(Value::as_i64)
        .and_then(|value| i32::try_from(value).ok())
}
