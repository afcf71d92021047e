//! Export download use-case.
//!
//! # Responsibility
//! - Parse download parameters (`format`, optional `year`).
//! - Fetch validated items and encode them with a dated filename.

use crate::export::csv::items_to_csv;
use crate::export::json::items_to_json;
use crate::export::{export_filename, ExportFormat};
use crate::model::item::Item;
use crate::repo::item_repo::ItemRepository;
use crate::service::item_service::ItemService;
use chrono::{DateTime, Utc};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DOWNLOAD_PREFIX: &str = "whatpm";

/// Failure of an export download request.
#[derive(Debug)]
pub enum ExportError {
    InvalidFormat(String),
    InvalidYear(String),
    Fetch(String),
    Encode(serde_json::Error),
}

impl ExportError {
    /// Whether the caller sent bad parameters (as opposed to a server fault).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidFormat(_) | Self::InvalidYear(_))
    }

    /// Message safe to show to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidFormat(_) => "Invalid format. Use 'csv' or 'json'".to_string(),
            Self::InvalidYear(value) => format!("Invalid year `{value}`"),
            Self::Fetch(_) => "Failed to fetch items for export".to_string(),
            Self::Encode(_) => "Internal server error".to_string(),
        }
    }
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(value) => write!(f, "invalid export format `{value}`"),
            Self::InvalidYear(value) => write!(f, "invalid export year `{value}`"),
            Self::Fetch(message) => write!(f, "{message}"),
            Self::Encode(err) => write!(f, "failed to encode export: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

/// Encoded export ready to be sent to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDownload {
    pub body: String,
    pub content_type: &'static str,
    pub filename: String,
    pub item_count: usize,
}

impl ExportDownload {
    /// `Content-Disposition` header value for attachment downloads.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// Export service borrowing the item service for data access.
pub struct ExportService<'s, R: ItemRepository> {
    items: &'s ItemService<R>,
}

impl<'s, R: ItemRepository> ExportService<'s, R> {
    pub fn new(items: &'s ItemService<R>) -> Self {
        Self { items }
    }

    /// Builds a download for `format` (default `json`) and optional `year`.
    ///
    /// # Errors
    /// - `InvalidFormat`/`InvalidYear` for bad parameters.
    /// - `Fetch` when storage fails; `Encode` when JSON encoding fails.
    pub fn download(
        &self,
        format: Option<&str>,
        year: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ExportDownload, ExportError> {
        let format = match format {
            Some(value) => value
                .parse::<ExportFormat>()
                .map_err(|_| ExportError::InvalidFormat(value.to_string()))?,
            None => ExportFormat::default(),
        };
        let year = match year.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => Some(
                value
                    .parse::<i32>()
                    .map_err(|_| ExportError::InvalidYear(value.to_string()))?,
            ),
            None => None,
        };

        let items = self.items.all_items(year).map_err(ExportError::Fetch)?;
        let body = encode(&items, format, now).map_err(|err| {
            error!("event=export_download module=service status=error error_code=encode_failed error={err}");
            ExportError::Encode(err)
        })?;

        let prefix = match year {
            Some(year) => format!("{DOWNLOAD_PREFIX}-{year}"),
            None => format!("{DOWNLOAD_PREFIX}-export"),
        };
        info!(
            "event=export_download module=service status=ok format={format} count={}",
            items.len()
        );
        Ok(ExportDownload {
            body,
            content_type: format.content_type(),
            filename: export_filename(&prefix, format, now.date_naive()),
            item_count: items.len(),
        })
    }
}

/// Encodes `items` in the requested format.
pub fn encode(
    items: &[Item],
    format: ExportFormat,
    now: DateTime<Utc>,
) -> serde_json::Result<String> {
    match format {
        ExportFormat::Csv => Ok(items_to_csv(items)),
        ExportFormat::Json => items_to_json(items, now),
    }
}
