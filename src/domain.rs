//! Domain logic
//!
//! This module contains the pagination building blocks that do no I/O:
//! - Cursor derivation from item timestamps
//! - Scoped deduplication of delivered identifiers
//! - Filters, scopes and page results

pub mod cursor;
pub mod dedup;
pub mod filters;
pub mod item;
pub mod notice;
pub mod page;
pub mod scope;
