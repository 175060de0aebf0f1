//! Rule Engine Core - compile boolean conditions and evaluate them against records
//!
//! A rule string such as `age > 30 AND department = 'Sales'` is parsed into a
//! [`Node`] tree, optionally ANDed with other rules, and evaluated against a
//! [`Record`] of field values. Nothing is executed dynamically.
//!
//! ```
//! use rule_engine_core::{evaluate, field_map, parse, Value};
//!
//! let rule = parse("age > 30 AND department = 'Sales'").unwrap();
//! let user = field_map([("age", Value::from(35)), ("department", Value::from("sales"))]);
//! assert!(evaluate(&rule, &user).unwrap());
//! ```
//!
//! Python bindings are available with the `python` feature.

pub mod config;
pub mod error;
pub mod record;
pub mod rule;

#[cfg(feature = "python")]
mod bindings;

pub use error::{ConditionError, EvaluationError, InvalidRuleExpression, Result, RuleEngineError};
pub use record::{field_map, FieldMap, Record, Value};
pub use rule::{combine, combine_with, evaluate, evaluate_all, parse, Comparison, LogicalOp, Node, Operator};
