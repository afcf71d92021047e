//! Core domain logic for the whatpm media log.
//! This crate is the single source of truth for item invariants.

pub mod backup;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod stats;

pub use backup::store::{FsObjectStore, ObjectStore, StoreError};
pub use config::{AppConfig, BackupConfig, ConfigError, ConfigOverrides};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use export::ExportFormat;
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::form::{FormErrors, ItemForm};
pub use model::item::{Item, ItemDraft, ItemId, ItemKind, ItemRecord, ItemType};
pub use model::validate::{validate_raw_item, validate_raw_items, ItemRejection, RawRecord};
pub use repo::item_repo::{ItemListQuery, ItemRepository, RepoError, SqliteItemRepository};
pub use search::query::SearchState;
pub use search::refine::{refine, SortOrder, TypeFilter};
pub use service::backup_service::{BackupError, BackupService, BackupSummary};
pub use service::export_service::{ExportDownload, ExportError, ExportService};
pub use service::item_service::ItemService;
pub use service::{ActionError, DataResult, Redirect};
pub use stats::{compute_stats, StatsSnapshot};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
