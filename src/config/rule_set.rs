//! Rule set configuration and compiled rule sets

use crate::error::{EvaluationError, RuleEngineError, Result};
use crate::record::Record;
use crate::rule::{combine, evaluate, Node};
use ahash::AHashMap;
use serde::Deserialize;
use std::sync::Arc;

/// A named group of rules, all of which must hold
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RuleSetConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<String>,
}

/// A rule set with its rules combined into one tree
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: String,
    description: Option<String>,
    rules: Vec<String>,
    tree: Option<Arc<Node>>,
}

impl RuleSet {
    /// Combine the configured rules once up front
    pub fn compile(config: RuleSetConfig) -> Result<Self> {
        let tree = combine(&config.rules)?.map(Arc::new);
        tracing::debug!(
            name = %config.name,
            rules = config.rules.len(),
            "compiled rule set"
        );

        Ok(Self {
            name: config.name,
            description: config.description,
            rules: config.rules,
            tree,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// Combined tree; `None` when the set has no rules
    pub fn tree(&self) -> Option<&Arc<Node>> {
        self.tree.as_ref()
    }

    /// Evaluate the set against a record.
    ///
    /// An empty set has nothing to evaluate and yields `Ok(None)`.
    pub fn evaluate<R: Record + ?Sized>(
        &self,
        record: &R,
    ) -> std::result::Result<Option<bool>, EvaluationError> {
        self.tree
            .as_deref()
            .map(|tree| evaluate(tree, record))
            .transpose()
    }
}

/// Compiled rule sets by name
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    sets: AHashMap<String, RuleSet>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every config; a later set with the same name replaces an earlier one
    pub fn from_configs(configs: impl IntoIterator<Item = RuleSetConfig>) -> Result<Self> {
        let mut registry = Self::new();
        for config in configs {
            registry.insert(RuleSet::compile(config)?);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, set: RuleSet) -> Option<RuleSet> {
        self.sets.insert(set.name.clone(), set)
    }

    pub fn get(&self, name: &str) -> Option<&RuleSet> {
        self.sets.get(name)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Evaluate a named set against a record
    pub fn evaluate<R: Record + ?Sized>(&self, name: &str, record: &R) -> Result<Option<bool>> {
        let set = self
            .get(name)
            .ok_or_else(|| RuleEngineError::RuleSetNotFound(name.to_string()))?;
        Ok(set.evaluate(record)?)
    }
}
