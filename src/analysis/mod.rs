//! Analysis modules.
//!
//! `aggregator` holds the generic grouping combinators; `pipeline` builds
//! every derived table on top of them.

pub mod aggregator;
pub mod pipeline;

pub use pipeline::*;
