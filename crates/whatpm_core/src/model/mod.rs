//! Media item domain model and its validation boundaries.
//!
//! # Responsibility
//! - Define the Book/Movie/Show sum type shared by every layer.
//! - Validate untyped storage rows (`validate`) and user forms (`form`).
//!
//! # Invariants
//! - Only validated items leave the data access layer.
//! - Year bounds are computed from an injected current year.

pub mod form;
pub mod item;
pub mod validate;
