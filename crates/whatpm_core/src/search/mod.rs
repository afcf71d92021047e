//! Item search entry points.
//!
//! # Responsibility
//! - Shape user queries for storage-level substring matching.
//! - Re-sort and re-filter fetched results locally.

pub mod query;
pub mod refine;
