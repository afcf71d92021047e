//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation and repository calls into use-case APIs.
//! - Translate failures into the user-facing error taxonomy: validation
//!   messages, generic storage messages, generic unexpected messages.
//!
//! # Invariants
//! - Navigation targets are success values (`Redirect`), never errors.
//! - Storage detail is logged, never placed in user-facing messages.

use crate::model::form::FormErrors;
use crate::model::item::ItemId;
use crate::repo::item_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod backup_service;
pub mod export_service;
pub mod item_service;

/// Tagged result of data reads: the valid payload or a readable error.
pub type DataResult<T> = Result<T, String>;

/// Generic message for failures the user can only retry.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Navigation signal returned by successful item actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Target path, e.g. `/year/2024`.
    pub location: String,
    /// Item affected by the action.
    pub item_id: ItemId,
}

impl Redirect {
    pub fn to_year(year: i32, item_id: impl Into<ItemId>) -> Self {
        Self {
            location: format!("/year/{year}"),
            item_id: item_id.into(),
        }
    }
}

/// Mutating item action, used to pick user-facing wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Create,
    Update,
    Delete,
}

impl ItemAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    fn user_verb(self) -> &'static str {
        match self {
            Self::Create => "save",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Failure of a create/update/delete action.
#[derive(Debug)]
pub enum ActionError {
    /// User-correctable input problems.
    Validation(FormErrors),
    /// Target item does not exist.
    NotFound(ItemId),
    /// Persistence-layer failure.
    Storage {
        action: ItemAction,
        source: RepoError,
    },
    /// Internal inconsistency detected at the action boundary.
    Unexpected {
        action: ItemAction,
        details: String,
    },
}

impl ActionError {
    /// Message safe to show to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.to_string(),
            Self::NotFound(_) => "Item not found.".to_string(),
            Self::Storage { action, .. } => format!(
                "Unable to {} your item. Please try again.",
                action.user_verb()
            ),
            Self::Unexpected { .. } => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl Display for ActionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "validation failed: {errors}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::Storage { action, source } => {
                write!(f, "item {} failed: {source}", action.as_str())
            }
            Self::Unexpected { action, details } => {
                write!(f, "item {} failed unexpectedly: {details}", action.as_str())
            }
        }
    }
}

impl Error for ActionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Storage { source, .. } => Some(source),
            _ => None,
        }
    }
}
