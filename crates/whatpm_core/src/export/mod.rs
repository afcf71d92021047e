//! Export formatters for validated item collections.
//!
//! # Responsibility
//! - Serialize items to CSV or structured JSON.
//! - Generate date-stamped download/backup filenames.
//!
//! # Invariants
//! - Formatters never read the clock; timestamps and dates are injected.
//! - Empty collections keep the legacy asymmetry: CSV yields the
//!   [`csv::EMPTY_EXPORT_SENTINEL`] string, JSON yields zeroed metadata.

use chrono::NaiveDate;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub mod csv;
pub mod json;

/// Supported export encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    #[default]
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err("Invalid format. Use 'csv' or 'json'".to_string()),
        }
    }
}

/// Builds `<prefix>-<YYYY-MM-DD>.<ext>`.
pub fn export_filename(prefix: &str, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{prefix}-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::{export_filename, ExportFormat};
    use chrono::NaiveDate;

    #[test]
    fn filename_embeds_date_stamp_and_extension() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(
            export_filename("whatpm-export", ExportFormat::Csv, date),
            "whatpm-export-2024-03-07.csv"
        );
        assert_eq!(
            export_filename("whatpm-2023", ExportFormat::Json, date),
            "whatpm-2023-2024-03-07.json"
        );
    }

    #[test]
    fn format_parse_is_exact() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("CSV".parse::<ExportFormat>().is_err());
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
