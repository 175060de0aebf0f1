//! Parsed rule cache

use crate::error::{InvalidRuleExpression, Result};
use crate::record::Record;
use crate::rule::ast::Node;
use crate::rule::{evaluator, parser};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

/// Upper bound on cached rules; once reached, new rules are parsed per call
pub const MAX_CACHED_RULES: usize = 4096;

/// Global rule cache keyed by the exact rule text
static RULE_CACHE: Lazy<RwLock<AHashMap<String, Arc<Node>>>> = Lazy::new(|| {
    let map = AHashMap::with_capacity(256);
    RwLock::new(map)
});

/// Get or parse a rule string. Rules that fail to parse are not cached, and
/// nothing new is cached once [`MAX_CACHED_RULES`] entries are held.
#[inline]
pub fn get_or_parse(rule: &str) -> std::result::Result<Arc<Node>, InvalidRuleExpression> {
    // Fast path: read lock only
    {
        let cache = RULE_CACHE.read();
        if let Some(ast) = cache.get(rule) {
            return Ok(Arc::clone(ast));
        }
    }

    let ast = Arc::new(parser::parse(rule)?);

    let mut cache = RULE_CACHE.write();
    Ok(insert_bounded(&mut cache, rule, ast, MAX_CACHED_RULES))
}

fn insert_bounded(
    cache: &mut AHashMap<String, Arc<Node>>,
    rule: &str,
    ast: Arc<Node>,
    capacity: usize,
) -> Arc<Node> {
    // Another thread may have parsed the same rule meanwhile
    if let Some(existing) = cache.get(rule) {
        return Arc::clone(existing);
    }
    if cache.len() >= capacity {
        tracing::debug!(rule, capacity, "rule cache full, not caching");
        return ast;
    }
    cache.insert(rule.to_string(), Arc::clone(&ast));
    ast
}

/// Check a rule against a record, using the cached AST
#[inline]
pub fn check_rule<R: Record + ?Sized>(rule: &str, record: &R) -> Result<bool> {
    let ast = get_or_parse(rule)?;
    Ok(evaluator::evaluate(&ast, record)?)
}

/// Clear the rule cache
pub fn clear_cache() {
    RULE_CACHE.write().clear();
}

/// Number of cached rules
pub fn cache_size() -> usize {
    RULE_CACHE.read().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleEngineError;
    use crate::record::field_map;

    // Distinct rule texts per test; the cache is process-wide and tests run in parallel.

    #[test]
    fn test_cache_hit_returns_same_tree() {
        let first = get_or_parse("cache_hit_field > 5").unwrap();
        let second = get_or_parse("cache_hit_field > 5").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache_size() >= 1);
    }

    #[test]
    fn test_check_rule() {
        let record = field_map([("cache_check_field", 10)]);
        assert!(check_rule("cache_check_field > 5", &record).unwrap());
        assert!(!check_rule("cache_check_field < 5", &record).unwrap());
    }

    #[test]
    fn test_invalid_rule_not_cached() {
        let err = get_or_parse("cache_invalid_field 5").unwrap_err();
        assert!(matches!(err, InvalidRuleExpression::InvalidCondition(_)));
        assert!(!RULE_CACHE.read().contains_key("cache_invalid_field 5"));
    }

    #[test]
    fn test_insert_bounded_stops_at_capacity() {
        let mut cache = AHashMap::new();
        let first = Arc::new(parser::parse("a > 1").unwrap());
        let kept = insert_bounded(&mut cache, "a > 1", Arc::clone(&first), 1);
        assert!(Arc::ptr_eq(&kept, &first));
        assert_eq!(cache.len(), 1);

        // Full: the fresh tree is returned but not stored
        let second = Arc::new(parser::parse("b > 2").unwrap());
        let returned = insert_bounded(&mut cache, "b > 2", Arc::clone(&second), 1);
        assert!(Arc::ptr_eq(&returned, &second));
        assert_eq!(cache.len(), 1);
        assert!(!cache.contains_key("b > 2"));

        // Already cached rules are still served when full
        let again = Arc::new(parser::parse("a > 1").unwrap());
        let served = insert_bounded(&mut cache, "a > 1", again, 1);
        assert!(Arc::ptr_eq(&served, &first));
    }

    #[test]
    fn test_check_rule_surfaces_evaluation_error() {
        let record = field_map([("other", 1)]);
        let err = check_rule("cache_missing_field > 5", &record).unwrap_err();
        assert!(matches!(err, RuleEngineError::Evaluation(_)));
    }
}
