//! Folding several rule strings into one tree

use crate::error::InvalidRuleExpression;
use crate::rule::ast::{LogicalOp, Node};
use crate::rule::parser;

/// Parse each rule and AND them together, left to right.
///
/// Returns `Ok(None)` for an empty sequence. The first rule that fails to
/// parse aborts the whole combination.
pub fn combine<I, S>(rules: I) -> Result<Option<Node>, InvalidRuleExpression>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    combine_with(LogicalOp::And, rules)
}

/// Like [`combine`], joining the rules with `op`
pub fn combine_with<I, S>(op: LogicalOp, rules: I) -> Result<Option<Node>, InvalidRuleExpression>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut root: Option<Node> = None;
    let mut count = 0usize;

    for rule in rules {
        let ast = parser::parse(rule.as_ref())?;
        root = Some(match root {
            None => ast,
            Some(left) => Node::combine(op, left, ast),
        });
        count += 1;
    }

    tracing::debug!(rules = count, op = op.keyword(), "combined rules");
    Ok(root)
}
