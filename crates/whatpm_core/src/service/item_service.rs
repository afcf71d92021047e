//! Item use-case service.
//!
//! # Responsibility
//! - Provide create/update/delete actions over validated form input.
//! - Fetch items through the raw-record validator.
//! - Run substring search and compute statistics.
//!
//! # Invariants
//! - Creation assigns `belongs_to_year = current_year`.
//! - The item type is fixed after creation.
//! - Rows rejected by the validator are dropped and logged, never returned.
//! - No retries: one failed storage call fails the whole request.

use crate::model::form::{FormErrors, ItemForm};
use crate::model::item::{new_item_id, Item, ItemType};
use crate::model::validate::{validate_raw_item, validate_raw_items, RawRecord};
use crate::repo::item_repo::{ItemListQuery, ItemRepository, RepoError};
use crate::search::query::{escape_like_term, normalize_query, SearchState, MAX_RESULTS};
use crate::service::{ActionError, DataResult, ItemAction, Redirect, GENERIC_FAILURE_MESSAGE};
use crate::stats::{compute_stats, StatsSnapshot};
use log::{error, info, warn};
use serde_json::Value;

/// Validated items plus the number of stored rows they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedItems {
    pub items: Vec<Item>,
    /// Rows read from storage before validation.
    pub stored_rows: usize,
}

/// Item service facade over repository implementations.
pub struct ItemService<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates a creation form and persists a new item.
    ///
    /// Redirects to the current year's page on success.
    pub fn create_item(&self, form: &ItemForm, current_year: i32) -> Result<Redirect, ActionError> {
        let draft = form.validate(current_year).map_err(|errors| {
            warn!(
                "event=item_create module=service status=rejected error_count={}",
                errors.messages().len()
            );
            ActionError::Validation(errors)
        })?;

        let id = new_item_id();
        self.repo
            .create_item(&id, &draft, current_year)
            .map_err(|err| storage_failure(ItemAction::Create, err))?;

        info!(
            "event=item_create module=service status=ok itemtype={} year={current_year}",
            draft.kind.item_type()
        );
        Ok(Redirect::to_year(current_year, id))
    }

    /// Validates an update form and replaces the editable fields of `id`.
    ///
    /// When the form carries no year-logged, the stored value is kept.
    pub fn update_item(
        &self,
        id: &str,
        form: &ItemForm,
        current_year: i32,
    ) -> Result<Redirect, ActionError> {
        let stored = self
            .repo
            .get_raw_item(id)
            .map_err(|err| storage_failure(ItemAction::Update, err))?
            .ok_or_else(|| ActionError::NotFound(id.to_string()))?;

        let Some(stored_type) = stored
            .get("itemtype")
            .and_then(Value::as_str)
            .and_then(ItemType::from_literal)
        else {
            error!("event=item_update module=service status=error error_code=stored_type_invalid");
            return Err(ActionError::Unexpected {
                action: ItemAction::Update,
                details: format!("stored item `{id}` has no valid itemtype"),
            });
        };

        let draft = form.validate(current_year).map_err(|errors| {
            warn!(
                "event=item_update module=service status=rejected error_count={}",
                errors.messages().len()
            );
            ActionError::Validation(errors)
        })?;

        if draft.kind.item_type() != stored_type {
            warn!("event=item_update module=service status=rejected error_code=type_change");
            return Err(ActionError::Validation(FormErrors::new(vec![
                "Item type cannot be changed".to_string(),
            ])));
        }

        let belongs_to_year = draft
            .belongs_to_year
            .or_else(|| stored_year(&stored))
            .unwrap_or(current_year);

        self.repo
            .update_item(id, &draft, belongs_to_year)
            .map_err(|err| match err {
                RepoError::NotFound(id) => ActionError::NotFound(id),
                other => storage_failure(ItemAction::Update, other),
            })?;

        info!("event=item_update module=service status=ok year={belongs_to_year}");
        Ok(Redirect::to_year(belongs_to_year, id))
    }

    /// Deletes one item permanently and redirects to its year page.
    pub fn delete_item(&self, id: &str) -> Result<Redirect, ActionError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ActionError::Validation(FormErrors::new(vec![
                "Item ID is required for deletion.".to_string(),
            ])));
        }

        let stored = self
            .repo
            .get_raw_item(id)
            .map_err(|err| storage_failure(ItemAction::Delete, err))?
            .ok_or_else(|| ActionError::NotFound(id.to_string()))?;

        self.repo.delete_item(id).map_err(|err| match err {
            RepoError::NotFound(id) => ActionError::NotFound(id),
            other => storage_failure(ItemAction::Delete, other),
        })?;

        info!("event=item_delete module=service status=ok");
        Ok(match stored_year(&stored) {
            Some(year) => Redirect::to_year(year, id),
            None => Redirect {
                location: "/".to_string(),
                item_id: id.to_string(),
            },
        })
    }

    /// Gets one item by id. Rows failing validation read as absent.
    pub fn get_item(&self, id: &str) -> DataResult<Option<Item>> {
        let raw = self.repo.get_raw_item(id).map_err(|err| {
            error!("event=item_get module=service status=error error={err}");
            format!("Failed to fetch item: {err}")
        })?;

        Ok(raw.and_then(|row| match validate_raw_item(&row) {
            Ok(item) => Some(item),
            Err(reason) => {
                warn!("event=item_get module=service status=rejected reason=\"{reason}\"");
                None
            }
        }))
    }

    /// Fetches validated items logged in `year`, oldest first.
    ///
    /// Invalid rows are dropped; only their count and reasons are logged.
    pub fn items_for_year(&self, year: i32) -> DataResult<Vec<Item>> {
        self.fetch_validated(&ItemListQuery::for_year(year), "items_fetch")
            .map(|fetched| fetched.items)
    }

    /// Fetches all validated items, optionally restricted to one year.
    pub fn all_items(&self, year: Option<i32>) -> DataResult<Vec<Item>> {
        self.fetch_all_counted(year).map(|fetched| fetched.items)
    }

    /// Like [`Self::all_items`], also reporting how many rows were stored.
    pub fn fetch_all_counted(&self, year: Option<i32>) -> DataResult<FetchedItems> {
        self.fetch_validated(&ItemListQuery { year }, "items_fetch_all")
    }

    /// Distinct logged years, newest first.
    pub fn logged_years(&self) -> DataResult<Vec<i32>> {
        self.repo.list_logged_years().map_err(|err| {
            error!("event=years_fetch module=service status=error error={err}");
            format!("Failed to fetch years: {err}")
        })
    }

    /// Case-insensitive substring search over title, author and director.
    ///
    /// Never fails: storage errors are logged and reported through
    /// `SearchState::message` with an empty result set.
    pub fn search(&self, query: &str) -> SearchState {
        if query.is_empty() {
            return SearchState::empty("");
        }
        let Some(term) = normalize_query(query) else {
            return SearchState::empty(query);
        };

        let rows = match self.repo.search_raw_items(&escape_like_term(term), MAX_RESULTS) {
            Ok(rows) => rows,
            Err(err) => {
                error!("event=item_search module=service status=error error={err}");
                return SearchState {
                    message: Some(GENERIC_FAILURE_MESSAGE.to_string()),
                    ..SearchState::empty(query)
                };
            }
        };

        let results = keep_valid(&rows, "item_search");
        info!(
            "event=item_search module=service status=ok result_count={}",
            results.len()
        );
        SearchState {
            results,
            ..SearchState::empty(query)
        }
    }

    /// Aggregate counts over all validated items.
    pub fn stats(&self, current_year: i32) -> DataResult<StatsSnapshot> {
        let items = self.all_items(None)?;
        Ok(compute_stats(&items, current_year))
    }

    fn fetch_validated(&self, query: &ItemListQuery, event: &str) -> DataResult<FetchedItems> {
        let rows = self.repo.list_raw_items(query).map_err(|err| {
            error!(
                "event={event} module=service status=error year={} error={err}",
                display_year(query.year)
            );
            format!("Failed to fetch items: {err}")
        })?;

        let items = keep_valid(&rows, event);
        info!(
            "event={event} module=service status=ok year={} count={}",
            display_year(query.year),
            items.len()
        );
        Ok(FetchedItems {
            items,
            stored_rows: rows.len(),
        })
    }
}

fn keep_valid(rows: &[RawRecord], event: &str) -> Vec<Item> {
    let (items, rejected) = validate_raw_items(rows);
    if !rejected.is_empty() {
        warn!(
            "event={event} module=service status=partial total={} valid={} dropped={}",
            rows.len(),
            items.len(),
            rejected.len()
        );
        for reason in &rejected {
            warn!("event={event} module=service status=rejected reason=\"{reason}\"");
        }
    }
    items
}

fn storage_failure(action: ItemAction, source: RepoError) -> ActionError {
    error!(
        "event=item_{} module=service status=error error={source}",
        action.as_str()
    );
    ActionError::Storage { action, source }
}

fn stored_year(row: &RawRecord) -> Option<i32> {
    row.get("belongs_to_year")
        .and_then(Value::as_i64)
        .and_then(|year| i32::try_from(year).ok())
}

fn display_year(year: Option<i32>) -> String {
    year.map_or_else(|| "all".to_string(), |year| year.to_string())
}
