//! Recoverable analysis errors.
//!
//! These never abort a whole run: table operations collect them per bucket,
//! and the report renders them in place of the failed section.

use serde::Serialize;
use thiserror::Error;

/// Error raised by an aggregation when it cannot produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisError {
    /// A ratio had a zero denominator, or a selection ran over no buckets.
    #[error("empty group: {group}")]
    EmptyGroup { group: String },

    /// No record carries the field the operation depends on.
    #[error("missing field `{field}`: {context}")]
    MissingField {
        field: &'static str,
        context: String,
    },
}

impl AnalysisError {
    pub fn empty_group(group: impl Into<String>) -> Self {
        AnalysisError::EmptyGroup {
            group: group.into(),
        }
    }

    pub fn missing_field(field: &'static str, context: impl Into<String>) -> Self {
        AnalysisError::MissingField {
            field,
            context: context.into(),
        }
    }
}

/// Result alias for analysis operations.
pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
