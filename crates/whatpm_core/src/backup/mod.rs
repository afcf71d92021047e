//! Backup destinations.
//!
//! # Responsibility
//! - Define where scheduled full exports are written.
//! - Provide a local filesystem store usable without cloud credentials.

pub mod store;
