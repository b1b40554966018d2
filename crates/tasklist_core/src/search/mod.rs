//! Read-only task queries.
//!
//! # Responsibility
//! - Derive filtered views of the task collection for display.
//! - Never mutate or persist the collection.

pub mod name_filter;
