//! Scheduled backup use-case.
//!
//! # Responsibility
//! - Authenticate the trigger with a shared-secret bearer header.
//! - Export the full collection as CSV and JSON into an object store.
//!
//! # Invariants
//! - An unset or empty secret rejects every call.
//! - Reruns on the same day overwrite the same keys.
//! - Only a collection with no stored rows uploads nothing; rows that all
//!   fail validation still produce (empty) backup files.

use crate::backup::store::{ObjectStore, StoreError};
use crate::export::csv::{items_to_csv, EMPTY_EXPORT_SENTINEL};
use crate::export::json::items_to_json;
use crate::export::{export_filename, ExportFormat};
use crate::repo::item_repo::ItemRepository;
use crate::service::item_service::ItemService;
use chrono::{DateTime, Utc};
use constant_time_eq::constant_time_eq;
use log::{error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

const BACKUP_PREFIX: &str = "whatpm-backup";
const BACKUP_ROOT_KEY: &str = "backups";

/// Failure of a backup run.
#[derive(Debug)]
pub enum BackupError {
    Unauthorized,
    Fetch(String),
    Encode(serde_json::Error),
    Store(StoreError),
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Fetch(message) => write!(f, "{message}"),
            Self::Encode(err) => write!(f, "failed to encode backup: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for BackupError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Object keys written by one backup run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupFiles {
    pub csv: String,
    pub json: String,
}

/// Outcome summary of a backup run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSummary {
    /// `YYYY-MM-DD` date stamp of the run.
    pub timestamp: String,
    pub items_exported: usize,
    pub files: Option<BackupFiles>,
    pub message: String,
}

/// Backup job writing full exports to an object store.
pub struct BackupService<'s, R: ItemRepository, S: ObjectStore> {
    items: &'s ItemService<R>,
    store: &'s S,
    secret: Option<String>,
}

impl<'s, R: ItemRepository, S: ObjectStore> BackupService<'s, R, S> {
    pub fn new(items: &'s ItemService<R>, store: &'s S, secret: Option<String>) -> Self {
        Self {
            items,
            store,
            secret,
        }
    }

    /// Runs one backup if `authorization` equals `Bearer <secret>`.
    pub fn run(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<BackupSummary, BackupError> {
        if !is_authorized(authorization, self.secret.as_deref()) {
            warn!("event=backup_run module=service status=rejected error_code=unauthorized");
            return Err(BackupError::Unauthorized);
        }

        let date = now.date_naive();
        let timestamp = date.format("%Y-%m-%d").to_string();
        let fetched = self
            .items
            .fetch_all_counted(None)
            .map_err(BackupError::Fetch)?;

        if fetched.stored_rows == 0 {
            info!("event=backup_run module=service status=ok count=0");
            return Ok(BackupSummary {
                timestamp,
                items_exported: 0,
                files: None,
                message: EMPTY_EXPORT_SENTINEL.to_string(),
            });
        }

        let items = fetched.items;
        let csv_body = items_to_csv(&items);
        let json_body = items_to_json(&items, now).map_err(BackupError::Encode)?;

        let csv_key = format!(
            "{BACKUP_ROOT_KEY}/{timestamp}/{}",
            export_filename(BACKUP_PREFIX, ExportFormat::Csv, date)
        );
        let json_key = format!(
            "{BACKUP_ROOT_KEY}/{timestamp}/{}",
            export_filename(BACKUP_PREFIX, ExportFormat::Json, date)
        );

        for (key, body, format) in [
            (&csv_key, &csv_body, ExportFormat::Csv),
            (&json_key, &json_body, ExportFormat::Json),
        ] {
            self.store
                .put_object(key, body.as_bytes(), format.content_type())
                .map_err(|err| {
                    error!("event=backup_run module=service status=error key={key} error={err}");
                    BackupError::Store(err)
                })?;
        }

        info!(
            "event=backup_run module=service status=ok count={}",
            items.len()
        );
        Ok(BackupSummary {
            timestamp,
            items_exported: items.len(),
            files: Some(BackupFiles {
                csv: csv_key,
                json: json_key,
            }),
            message: format!("Exported {} item(s).", items.len()),
        })
    }
}

fn is_authorized(authorization: Option<&str>, secret: Option<&str>) -> bool {
    let (Some(header), Some(secret)) = (authorization, secret.filter(|value| !value.is_empty()))
    else {
        return false;
    };
    let expected = format!("Bearer {secret}");
    constant_time_eq(header.as_bytes(), expected.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::is_authorized;

    #[test]
    fn bearer_header_must_match_configured_secret() {
        assert!(is_authorized(Some("Bearer s3cret"), Some("s3cret")));
        assert!(!is_authorized(Some("Bearer wrong"), Some("s3cret")));
        assert!(!is_authorized(Some("Bearer s3cret2"), Some("s3cret")));
        assert!(!is_authorized(Some("Bearer s3cre"), Some("s3cret")));
        assert!(!is_authorized(Some("s3cret"), Some("s3cret")));
        assert!(!is_authorized(None, Some("s3cret")));
    }

    #[test]
    fn empty_or_missing_secret_rejects_everything() {
        assert!(!is_authorized(Some("Bearer "), Some("")));
        assert!(!is_authorized(Some("Bearer x"), None));
    }
}
