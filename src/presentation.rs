//! Presentation layer
//!
//! Console rendering of loaded items.

pub mod printer;
