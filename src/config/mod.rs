//! Configuration module for rule sets
//!
//! Rule sets are read from JSON documents shaped like
//! `{"rule_sets": [{"name": ..., "description": ..., "rules": [...]}]}`
//! or, with the `python` feature, from the equivalent Python dict.

mod rule_set;

pub use rule_set::*;

use crate::error::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RuleSetDocument {
    rule_sets: Vec<RuleSetConfig>,
}

/// Deserialize rule set configs from a JSON document
pub fn deserialize_rule_sets(json: &str) -> Result<Vec<RuleSetConfig>> {
    let document: RuleSetDocument = serde_json::from_str(json)?;
    Ok(document.rule_sets)
}

/// Deserialize and compile every rule set in a JSON document
pub fn load_registry(json: &str) -> Result<RuleRegistry> {
    RuleRegistry::from_configs(deserialize_rule_sets(json)?)
}

#[cfg(feature = "python")]
mod python {
    use super::RuleSetConfig;
    use crate::error::RuleEngineError;
    use pyo3::types::{PyAnyMethods, PyDict, PyDictMethods, PyList, PyListMethods};
    use pyo3::Bound;

    /// Helper to get attribute from either dict or object
    fn get_attr<'py>(
        obj: &Bound<'py, pyo3::PyAny>,
        name: &str,
    ) -> pyo3::PyResult<Bound<'py, pyo3::PyAny>> {
        if let Ok(dict) = obj.downcast::<PyDict>() {
            dict.get_item(name)?
                .ok_or_else(|| pyo3::exceptions::PyKeyError::new_err(name.to_string()))
        } else {
            obj.getattr(name)
        }
    }

    /// Helper to get optional attribute from either dict or object
    fn get_attr_opt<'py>(obj: &Bound<'py, pyo3::PyAny>, name: &str) -> Option<Bound<'py, pyo3::PyAny>> {
        if let Ok(dict) = obj.downcast::<PyDict>() {
            dict.get_item(name).ok().flatten()
        } else {
            obj.getattr(name).ok()
        }
    }

    /// Deserialize rule sets from a Python config dict
    /// Expected format: {"rule_sets": [RuleSetConfig, ...]}
    pub fn deserialize_rule_sets_from_dict(
        config: &Bound<'_, PyDict>,
    ) -> pyo3::PyResult<Vec<RuleSetConfig>> {
        let sets = config.get_item("rule_sets")?.ok_or_else(|| {
            RuleEngineError::DeserializationError("rule_sets not found".to_string())
        })?;

        let sets: Bound<'_, PyList> = sets.extract()?;
        let mut configs = Vec::with_capacity(sets.len());
        for item in sets.iter() {
            configs.push(extract_rule_set(&item)?);
        }

        Ok(configs)
    }

    fn extract_rule_set(obj: &Bound<'_, pyo3::PyAny>) -> pyo3::PyResult<RuleSetConfig> {
        let name: String = get_attr(obj, "name")?.extract()?;
        let description: Option<String> =
            get_attr_opt(obj, "description").and_then(|v| v.extract().ok());

        // A single rule string is accepted in place of a list
        let rules = match get_attr_opt(obj, "rules") {
            Some(rules_obj) if !rules_obj.is_none() => {
                if let Ok(rule) = rules_obj.extract::<String>() {
                    vec![rule]
                } else {
                    rules_obj.extract::<Vec<String>>()?
                }
            }
            _ => Vec::new(),
        };

        Ok(RuleSetConfig {
            name,
            description,
            rules,
        })
    }
}

#[cfg(feature = "python")]
pub use python::deserialize_rule_sets_from_dict;
