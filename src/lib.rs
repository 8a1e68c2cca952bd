//! # Scrollfeed
//!
//! Incremental, cursor-based loading of admin console lists.
//!
//! ## Architecture Overview
//!
//! - **Domain** (`domain`): cursors, scopes, filters and the dedup registry
//! - **Model** (`model`): the list state machine and the scroll trigger
//! - **Infrastructure** (`infrastructure`): REST fetchers, config, CLI and notifiers
//! - **Integration** (`integration`): the [`IncrementalList`] controller driving it all
//!
//! ## Example Usage
//!
//! ```rust
//! use scrollfeed::{
//!     domain::page::PageResult,
//!     infrastructure::fetcher::InMemoryFetcher,
//!     IncrementalList,
//! };
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let fetcher = InMemoryFetcher::new("history");
//! fetcher.push_page(PageResult::success(
//!     vec![json!({ "id": 1, "timestamp": "2025-01-01T10:00:00Z" })],
//!     true,
//! ));
//!
//! let list = IncrementalList::new(fetcher);
//! list.load_more().await;
//! assert_eq!(list.len(), 1);
//! assert!(!list.has_more());
//! # }
//! ```

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod integration;
pub mod model;
pub mod presentation;
pub mod utils;

pub use domain::{cursor::CursorCodec, dedup::DedupRegistry, filters::Filters, scope::ScopeKey};
pub use infrastructure::fetcher::{FetchError, PageFetcher};
pub use integration::controller::{IncrementalList, LoadOutcome};

/// Result type used throughout the library
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
