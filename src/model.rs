//! Pure state machines
//!
//! Each model takes messages through `update` and reports what should happen next,
//! leaving the actual work to the integration layer.

pub mod list;
pub mod scroll;
