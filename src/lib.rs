//! Descriptive statistics over the Nobel laureate dataset.
//!
//! The [`analysis`] pipeline turns an immutable table of
//! [`models::LaureateRecord`]s into derived tables: most awarded sex and
//! birth country, female share per decade and category, birth-country share
//! per decade, repeat winners and the gender trend. [`dataset`] loads the
//! table from CSV and [`report`] renders the results.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod models;
pub mod report;
