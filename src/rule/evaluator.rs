//! Rule evaluator
//!
//! Evaluation is post-order and never short-circuits: both sides of every
//! AND/OR are evaluated, so a failing comparison anywhere in the tree fails
//! the whole call.

use crate::error::{ConditionError, EvaluationError};
use crate::record::Record;
use crate::rule::ast::{Comparison, Node, Operator};

/// Evaluate an AST against a record
pub fn evaluate<R: Record + ?Sized>(ast: &Node, record: &R) -> Result<bool, EvaluationError> {
    ast.try_fold(
        |cmp| {
            let result = check_comparison(cmp, record).map_err(|source| EvaluationError {
                condition: cmp.to_string(),
                source,
            })?;
            tracing::trace!(condition = %cmp, result, "evaluated comparison");
            Ok(result)
        },
        |kind, left, right| {
            let result = kind.apply(left, right);
            tracing::trace!(
                op = kind.keyword(),
                left,
                right,
                result,
                "evaluated combination"
            );
            Ok(result)
        },
    )
}

/// Evaluate one AST against many records, one result per record
pub fn evaluate_all<R: Record>(ast: &Node, records: &[R]) -> Vec<Result<bool, EvaluationError>> {
    records.iter().map(|record| evaluate(ast, record)).collect()
}

fn check_comparison<R: Record + ?Sized>(
    cmp: &Comparison,
    record: &R,
) -> Result<bool, ConditionError> {
    let value = record
        .get_value(&cmp.field)
        .ok_or_else(|| ConditionError::MissingField(cmp.field.clone()))?;

    match cmp.operator {
        Operator::Greater | Operator::Less => {
            let lhs = value.as_number().ok_or_else(|| ConditionError::TypeConversion {
                field: cmp.field.clone(),
                value: value.to_string(),
            })?;
            let rhs = cmp.literal.trim().parse::<f64>().map_err(|_| {
                ConditionError::TypeConversion {
                    field: cmp.field.clone(),
                    value: cmp.literal.clone(),
                }
            })?;

            Ok(match cmp.operator {
                Operator::Greater => lhs > rhs,
                _ => lhs < rhs,
            })
        }
        Operator::Equal => Ok(value.to_string().to_lowercase() == cmp.literal.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{field_map, FieldMap, Value};
    use crate::rule::parser::parse;
    use tracing_test::traced_test;

    fn user() -> FieldMap {
        field_map([
            ("age", Value::from(35)),
            ("department", Value::from("Sales")),
            ("salary", Value::from(60000)),
            ("experience", Value::from(5)),
        ])
    }

    #[test]
    fn test_simple_comparison() {
        let record = user();

        let ast = parse("age > 30").unwrap();
        assert!(evaluate(&ast, &record).unwrap());

        let ast = parse("age < 30").unwrap();
        assert!(!evaluate(&ast, &record).unwrap());
    }

    #[test]
    fn test_matching_user() {
        let ast = parse("age > 30 AND department = 'Sales'").unwrap();
        assert!(evaluate(&ast, &user()).unwrap());
    }

    #[test]
    fn test_non_matching_user() {
        let record = field_map([
            ("age", Value::from(28)),
            ("department", Value::from("Engineering")),
            ("salary", Value::from(70000)),
            ("experience", Value::from(4)),
        ]);
        let ast = parse("age < 25 AND department = 'Marketing'").unwrap();
        assert!(!evaluate(&ast, &record).unwrap());
    }

    #[test]
    fn test_or_condition() {
        let record = user();

        let ast = parse("age < 18 OR department = 'Sales'").unwrap();
        assert!(evaluate(&ast, &record).unwrap());

        let ast = parse("age < 18 OR department = 'Marketing'").unwrap();
        assert!(!evaluate(&ast, &record).unwrap());
    }

    #[test]
    fn test_equality_is_case_insensitive() {
        let ast = parse("department = 'Sales'").unwrap();
        for dept in ["sales", "SALES", "Sales"] {
            let record = field_map([("department", dept)]);
            assert!(evaluate(&ast, &record).unwrap(), "Failed for: {}", dept);
        }
    }

    #[test]
    fn test_equality_never_coerces_numbers() {
        let ast = parse("age = 35").unwrap();
        assert!(evaluate(&ast, &field_map([("age", 35)])).unwrap());

        // 35.0 renders as "35.0", which is a different string
        assert!(!evaluate(&ast, &field_map([("age", 35.0)])).unwrap());
    }

    #[test]
    fn test_numeric_comparison_on_text_value() {
        let ast = parse("age > 30").unwrap();
        assert!(evaluate(&ast, &field_map([("age", "35")])).unwrap());
    }

    #[test]
    fn test_float_comparison() {
        let record = field_map([("score", 6)]);

        let ast = parse("score > 5.5").unwrap();
        assert!(evaluate(&ast, &record).unwrap());

        let ast = parse("score < 5.5").unwrap();
        assert!(!evaluate(&ast, &record).unwrap());
    }

    #[test]
    fn test_missing_field() {
        let record = field_map([("age", Value::from(35)), ("department", Value::from("Sales"))]);
        let ast = parse("age > 30 AND salary > 50000").unwrap();

        let err = evaluate(&ast, &record).unwrap_err();
        assert_eq!(err.source, ConditionError::MissingField("salary".to_string()));
        assert_eq!(err.condition, "salary > 50000");
        assert_eq!(err.field(), "salary");
    }

    #[test]
    fn test_missing_field_fails_without_short_circuit() {
        let record = user();

        // The left side already decides the result, the right side still fails
        let ast = parse("age > 30 OR bonus > 10").unwrap();
        let err = evaluate(&ast, &record).unwrap_err();
        assert_eq!(err.source, ConditionError::MissingField("bonus".to_string()));

        let ast = parse("age < 18 AND bonus > 10").unwrap();
        assert!(evaluate(&ast, &record).is_err());
    }

    #[test]
    fn test_type_conversion_error() {
        let ast = parse("department > 5").unwrap();
        let err = evaluate(&ast, &user()).unwrap_err();
        assert_eq!(
            err.source,
            ConditionError::TypeConversion {
                field: "department".to_string(),
                value: "Sales".to_string(),
            }
        );

        let ast = parse("age > thirty").unwrap();
        let err = evaluate(&ast, &user()).unwrap_err();
        assert_eq!(
            err.source,
            ConditionError::TypeConversion {
                field: "age".to_string(),
                value: "thirty".to_string(),
            }
        );
    }

    #[test]
    fn test_first_failure_is_reported() {
        let ast = parse("missing_a > 1 AND missing_b > 2").unwrap();
        let err = evaluate(&ast, &user()).unwrap_err();
        assert_eq!(err.field(), "missing_a");
    }

    #[test]
    fn test_evaluate_all() {
        let ast = parse("age > 30").unwrap();
        let records = vec![
            field_map([("age", 35)]),
            field_map([("age", 20)]),
            field_map([("name", "x")]),
        ];

        let results = evaluate_all(&ast, &records);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], Ok(true));
        assert_eq!(results[1], Ok(false));
        assert!(results[2].is_err());
    }

    #[test]
    fn test_std_hashmap_record() {
        let mut record = std::collections::HashMap::new();
        record.insert("age".to_string(), Value::from(40));
        let ast = parse("age > 30").unwrap();
        assert!(evaluate(&ast, &record).unwrap());
    }

    #[test]
    #[traced_test]
    fn test_evaluation_traces_each_node() {
        let ast = parse("age > 30 OR department = 'HR'").unwrap();
        assert!(evaluate(&ast, &user()).unwrap());
        assert!(logs_contain("evaluated comparison"));
        assert!(logs_contain("evaluated combination"));
    }
}
