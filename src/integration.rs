//! Integration layer
//!
//! Wires the pure list model to fetchers, the dedup registry and notifiers.

pub mod controller;
