//! Error types for the rule engine

use thiserror::Error;

/// A rule string that cannot be turned into a tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidRuleExpression {
    /// A condition without a recognised comparison symbol
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    /// Two conditions with no AND/OR between them
    #[error("No operator between conditions")]
    NoOperator,

    /// Blank rule string
    #[error("Invalid rule string provided")]
    EmptyRule,
}

/// Failure of a single comparison against a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    #[error("Missing data for: {0}")]
    MissingField(String),

    #[error("Cannot compare {field} numerically: {value:?} is not a number")]
    TypeConversion { field: String, value: String },
}

/// The only error returned by [`crate::rule::evaluate`].
///
/// `condition` is the rendered comparison that failed; the underlying
/// [`ConditionError`] is kept as the error source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Error while evaluating rule `{condition}`: {source}")]
pub struct EvaluationError {
    pub condition: String,
    #[source]
    pub source: ConditionError,
}

impl EvaluationError {
    /// Name of the field the failing comparison referenced
    pub fn field(&self) -> &str {
        match &self.source {
            ConditionError::MissingField(field) => field,
            ConditionError::TypeConversion { field, .. } => field,
        }
    }
}

/// Main error type for the rule engine
#[derive(Error, Debug)]
pub enum RuleEngineError {
    #[error(transparent)]
    InvalidRule(#[from] InvalidRuleExpression),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("Rule set not found: {0}")]
    RuleSetNotFound(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

impl From<serde_json::Error> for RuleEngineError {
    fn from(err: serde_json::Error) -> Self {
        RuleEngineError::DeserializationError(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<RuleEngineError> for pyo3::PyErr {
    fn from(err: RuleEngineError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyKeyError, PyValueError};

        match err {
            RuleEngineError::InvalidRule(e) => PyValueError::new_err(e.to_string()),
            RuleEngineError::Evaluation(e) => PyValueError::new_err(e.to_string()),
            RuleEngineError::RuleSetNotFound(name) => {
                PyKeyError::new_err(format!("Rule set not found: {}", name))
            }
            RuleEngineError::DeserializationError(msg) => {
                PyValueError::new_err(format!("Deserialization error: {}", msg))
            }
        }
    }
}

/// Result type alias for the rule engine
pub type Result<T> = std::result::Result<T, RuleEngineError>;
