//! Dataset loading.
//!
//! Reads the laureate CSV once and hands the pipeline an immutable,
//! validated table.

pub mod loader;

pub use loader::*;
