//! User-submitted form validation for item create/update.
//!
//! # Responsibility
//! - Check submitted string fields before anything is written to storage.
//! - Report every problem at once as human-readable messages.
//!
//! # Invariants
//! - Validation never reads the wall clock; `current_year` is injected.
//! - Success iff the aggregated error list is empty.

use crate::model::item::{max_year, ItemDraft, ItemKind, ItemType, MIN_YEAR};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TITLE_MAX_CHARS: usize = 200;
const CREATOR_MAX_CHARS: usize = 100;
const SEASON_MIN: i32 = 1;
const SEASON_MAX: i32 = 50;

/// Raw item form fields as submitted.
///
/// Checkbox-style flags arrive already decoded as booleans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemForm {
    pub title: String,
    pub itemtype: String,
    pub published_year: String,
    /// Only present on update forms.
    pub belongs_to_year: Option<String>,
    pub author: Option<String>,
    pub director: Option<String>,
    pub season: Option<String>,
    pub redo: bool,
    pub in_progress: bool,
}

/// Aggregated validation messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormErrors(Vec<String>);

impl FormErrors {
    pub fn new(messages: Vec<String>) -> Self {
        Self(messages)
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, message: &str) -> bool {
        self.0.iter().any(|value| value == message)
    }
}

impl Display for FormErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl Error for FormErrors {}

impl ItemForm {
    /// Validates all fields against `current_year` and builds a draft.
    ///
    /// # Errors
    /// Returns every failed rule, in field order.
    pub fn validate(&self, current_year: i32) -> Result<ItemDraft, FormErrors> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        let title_len = title.chars().count();
        if title_len == 0 {
            errors.push("Title is required".to_string());
        } else if title_len > TITLE_MAX_CHARS {
            errors.push(format!(
                "Title must be {TITLE_MAX_CHARS} characters or less"
            ));
        }

        let itemtype = ItemType::from_literal(self.itemtype.trim());
        if itemtype.is_none() {
            errors.push("Invalid item type".to_string());
        }

        let published_year = check_year(&self.published_year, "Published year", current_year)
            .map_err(|message| errors.push(message))
            .ok();

        let belongs_to_year = match self.belongs_to_year.as_deref() {
            Some(raw) => check_year(raw, "Year logged", current_year)
                .map_err(|message| errors.push(message))
                .ok(),
            None => None,
        };

        let kind = match itemtype {
            Some(ItemType::Book) => {
                check_creator(self.author.as_deref(), "Author", "books", &mut errors)
                    .map(|author| ItemKind::Book { author })
            }
            Some(ItemType::Movie) => {
                check_creator(self.director.as_deref(), "Director", "movies", &mut errors)
                    .map(|director| ItemKind::Movie { director })
            }
            Some(ItemType::Show) => check_season(self.season.as_deref(), &mut errors).map(
                |season| ItemKind::Show {
                    season,
                    in_progress: Some(self.in_progress),
                },
            ),
            None => None,
        };

        match (kind, published_year) {
            (Some(kind), Some(published_year)) if errors.is_empty() => Ok(ItemDraft {
                title: title.to_string(),
                kind,
                published_year,
                redo: self.redo,
                belongs_to_year,
            }),
            _ => Err(FormErrors(errors)),
        }
    }
}

fn check_year(raw: &str, label: &str, current_year: i32) -> Result<i32, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!("{label} is required"));
    }
    let year = trimmed
        .parse::<i32>()
        .map_err(|_| format!("{label} must be a whole number"))?;
    let max = max_year(current_year);
    if year < MIN_YEAR {
        return Err(format!("Year must be {MIN_YEAR} or later"));
    }
    if year > max {
        return Err(format!("Year must be {max} or earlier"));
    }
    Ok(year)
}

fn check_creator(
    raw: Option<&str>,
    label: &str,
    plural: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    let value = raw.map(str::trim).unwrap_or_default();
    let len = value.chars().count();
    if len == 0 {
        errors.push(format!("{label} is required for {plural}"));
        return None;
    }
    if len > CREATOR_MAX_CHARS {
        errors.push(format!(
            "{label} must be {CREATOR_MAX_CHARS} characters or less"
        ));
        return None;
    }
    Some(value.to_string())
}

fn check_season(raw: Option<&str>, errors: &mut Vec<String>) -> Option<i32> {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        errors.push("Season is required for shows".to_string());
        return None;
    }
    let Ok(season) = value.parse::<i32>() else {
        errors.push("Season must be a whole number".to_string());
        return None;
    };
    if season < SEASON_MIN {
        errors.push(format!("Season must be at least {SEASON_MIN}"));
        return None;
    }
    if season > SEASON_MAX {
        errors.push(format!("Season must be {SEASON_MAX} or less"));
        return None;
    }
    Some(season)
}

#[cfg(test)]
mod tests {
    use super::{check_year, ItemForm};

    #[test]
    fn year_bound_follows_injected_current_year() {
        assert_eq!(check_year("2034", "Published year", 2024), Ok(2034));
        assert_eq!(
            check_year("2035", "Published year", 2024),
            Err("Year must be 2034 or earlier".to_string())
        );
        assert_eq!(check_year("2035", "Published year", 2025), Ok(2035));
    }

    #[test]
    fn year_rejects_non_numeric_input() {
        let err = check_year("soon", "Published year", 2024).unwrap_err();
        assert_eq!(err, "Published year must be a whole number");
    }

    #[test]
    fn title_length_counts_chars_not_bytes() {
        let form = ItemForm {
            title: "é".repeat(200),
            itemtype: "Movie".to_string(),
            published_year: "1999".to_string(),
            director: Some("Wachowski".to_string()),
            ..ItemForm::default()
        };
        assert!(form.validate(2024).is_ok());
    }
}
