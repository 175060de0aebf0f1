//! Python bindings via PyO3

use crate::config::{deserialize_rule_sets_from_dict, RuleRegistry};
use crate::error::RuleEngineError;
use crate::record::{FieldMap, Value};
use crate::rule::{self, Node};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use pyo3::exceptions::{PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict};
use std::sync::Arc;

// ============================================================================
// Cached Rule Sets
// ============================================================================

/// Global compiled rule sets
static RULE_SETS: OnceCell<Arc<RwLock<RuleRegistry>>> = OnceCell::new();

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert a Python scalar into a record value.
///
/// `bool` is a subclass of `int` in Python and would otherwise become `1`/`0`,
/// so it is rejected along with every other non `int`/`float`/`str` type.
fn extract_value(field: &str, obj: &Bound<'_, PyAny>) -> PyResult<Value> {
    if obj.is_instance_of::<PyBool>() {
        return Err(PyTypeError::new_err(format!(
            "Unsupported value for field {}: bool is not accepted, expected int, float or str",
            field
        )));
    }
    if let Ok(i) = obj.extract::<i64>() {
        return Ok(Value::Integer(i));
    }
    if let Ok(f) = obj.extract::<f64>() {
        return Ok(Value::Float(f));
    }
    if let Ok(s) = obj.extract::<String>() {
        return Ok(Value::Text(s));
    }
    Err(PyTypeError::new_err(format!(
        "Unsupported value for field {}: expected int, float or str",
        field
    )))
}

/// Convert a Python dict into a record
fn extract_record(dict: &Bound<'_, PyDict>) -> PyResult<FieldMap> {
    let mut record = FieldMap::with_capacity(dict.len());
    for (key, value) in dict.iter() {
        let field: String = key.extract()?;
        let value = extract_value(&field, &value)?;
        record.insert(field, value);
    }
    Ok(record)
}

// ============================================================================
// Rule PyClass
// ============================================================================

/// Compiled rule tree held on the Rust heap
#[pyclass(name = "Rule", frozen)]
pub struct PyRule {
    tree: Arc<Node>,
}

impl PyRule {
    fn new(tree: Node) -> Self {
        Self {
            tree: Arc::new(tree),
        }
    }
}

#[pymethods]
impl PyRule {
    /// Number of comparisons in the rule
    #[getter]
    fn condition_count(&self) -> usize {
        self.tree.condition_count()
    }

    /// Field names the rule reads
    #[getter]
    fn fields(&self) -> Vec<String> {
        self.tree.fields().into_iter().map(str::to_string).collect()
    }

    /// Evaluate the rule against a dict of field values
    fn evaluate(&self, data: &Bound<'_, PyDict>) -> PyResult<bool> {
        let record = extract_record(data)?;
        rule::evaluate(&self.tree, &record)
            .map_err(|e| RuleEngineError::from(e).into())
    }

    /// JSON form of the tree
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(self.tree.as_ref())
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn __str__(&self) -> String {
        self.tree.to_string()
    }

    fn __repr__(&self) -> String {
        format!("Rule({:?})", self.tree.to_string())
    }
}

// ============================================================================
// Python Functions
// ============================================================================

/// Parse a rule string into a Rule
///
/// # Raises
/// ValueError if the rule string is invalid
#[pyfunction]
fn create_rule(rule_string: &str) -> PyResult<PyRule> {
    let tree = rule::parse(rule_string).map_err(RuleEngineError::from)?;
    Ok(PyRule::new(tree))
}

/// AND several rule strings together; returns None for an empty list
#[pyfunction]
fn combine_rules(rules: Vec<String>) -> PyResult<Option<PyRule>> {
    let tree = rule::combine(&rules).map_err(RuleEngineError::from)?;
    Ok(tree.map(PyRule::new))
}

/// Evaluate a Rule against a dict of field values
///
/// # Raises
/// ValueError if a field is missing or a numeric comparison sees a non-number
#[pyfunction]
fn evaluate_rule(rule: PyRef<'_, PyRule>, data: &Bound<'_, PyDict>) -> PyResult<bool> {
    rule.evaluate(data)
}

/// Evaluate a Rule against many records on a blocking thread
///
/// # Returns
/// A Python awaitable that resolves to a list of bools, one per record
///
/// # Example (Python)
/// ```python
/// matches = await evaluate_many_async(rule, [{"age": 35}, {"age": 20}])
/// ```
#[pyfunction]
fn evaluate_many_async<'py>(
    py: Python<'py>,
    rule: PyRef<'py, PyRule>,
    records: Vec<Bound<'py, PyDict>>,
) -> PyResult<Bound<'py, PyAny>> {
    // Convert records while the GIL is held
    let records = records
        .iter()
        .map(extract_record)
        .collect::<PyResult<Vec<_>>>()?;
    let tree = Arc::clone(&rule.tree);

    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let results = tokio::task::spawn_blocking(move || {
            let matches = records
                .iter()
                .map(|record| rule::evaluate(&tree, record))
                .collect::<Result<Vec<bool>, _>>()
                .map_err(RuleEngineError::from)?;
            Ok::<Vec<bool>, PyErr>(matches)
        })
        .await
        .map_err(|e| PyRuntimeError::new_err(format!("Evaluation task panicked: {}", e)))??;

        Ok(results)
    })
}

/// Load and compile rule sets (call once at startup, again to replace them)
#[pyfunction]
fn init_rule_sets(config: &Bound<'_, PyDict>) -> PyResult<()> {
    let configs = deserialize_rule_sets_from_dict(config)?;
    let registry = RuleRegistry::from_configs(configs)?;

    if let Some(existing) = RULE_SETS.get() {
        *existing.write() = registry;
    } else {
        let _ = RULE_SETS.set(Arc::new(RwLock::new(registry)));
    }

    Ok(())
}

/// Evaluate a named rule set; None when the set has no rules
///
/// # Raises
/// RuntimeError if `init_rule_sets` was not called first, KeyError for an unknown name
#[pyfunction]
fn evaluate_rule_set(name: &str, data: &Bound<'_, PyDict>) -> PyResult<Option<bool>> {
    let registry = RULE_SETS.get().ok_or_else(|| {
        PyRuntimeError::new_err("Rule sets not initialized. Call init_rule_sets() first.")
    })?;

    let record = extract_record(data)?;
    Ok(registry.read().evaluate(name, &record)?)
}

// ============================================================================
// Python Module Definition
// ============================================================================

#[pymodule]
fn rule_engine_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(create_rule, m)?)?;
    m.add_function(wrap_pyfunction!(combine_rules, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_rule, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_many_async, m)?)?;
    m.add_function(wrap_pyfunction!(init_rule_sets, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_rule_set, m)?)?;
    m.add_class::<PyRule>()?;
    Ok(())
}
