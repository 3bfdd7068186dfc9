//! Error types.

use thiserror::Error;

use crate::rules::RuleAction;

/// A rule rejected while building a [`RuleSet`](crate::rules::RuleSet).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    /// The rule targets no fields.
    #[error("Rule {index} ({action:?}) targets no fields")]
    EmptyFields {
        /// Position of the rule in the set.
        index: usize,
        /// The rule's action.
        action: RuleAction,
    },

    /// The rule names a blank field key.
    #[error("Rule {index} ({action:?}) names a blank field key")]
    BlankField {
        /// Position of the rule in the set.
        index: usize,
        /// The rule's action.
        action: RuleAction,
    },
}

/// Errors raised while assembling forms and their validators.
#[derive(Debug, Error)]
pub enum FormError {
    /// Two controls were registered under one key.
    #[error("Field '{0}' declared more than once")]
    DuplicateField(String),

    /// A form schema could not be parsed.
    #[error("Invalid form schema: {0}")]
    Schema(#[from] serde_json::Error),

    /// A pattern validator's regex did not compile.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl FormError {
    /// Creates a new duplicate field error.
    pub fn duplicate(key: impl Into<String>) -> Self {
        Self::DuplicateField(key.into())
    }
}
