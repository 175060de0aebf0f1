//! Rule string parser
//!
//! Rules are conditions joined by the whitespace-delimited keywords `AND` and
//! `OR`. There is no precedence and no grouping: conditions are folded into a
//! left-leaning chain in the order they appear.

use crate::error::InvalidRuleExpression;
use crate::rule::ast::{Comparison, LogicalOp, Node, Operator};
use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;

/// Keyword splitter; not quote-aware
static KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s(AND|OR)\s").expect("keyword pattern is valid")
});

/// Comparison symbols in lookup priority order
const OPERATORS: [(char, Operator); 3] = [
    ('>', Operator::Greater),
    ('<', Operator::Less),
    ('=', Operator::Equal),
];

/// Parse a rule string into an AST
pub fn parse(rule: &str) -> Result<Node, InvalidRuleExpression> {
    let result = parse_rule(rule);
    match &result {
        Ok(node) => tracing::debug!(rule, conditions = node.condition_count(), "parsed rule"),
        Err(e) => tracing::debug!(rule, error = %e, "rejected rule"),
    }
    result
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Condition(&'a str),
    Keyword(LogicalOp),
}

fn parse_rule(rule: &str) -> Result<Node, InvalidRuleExpression> {
    if rule.trim().is_empty() {
        return Err(InvalidRuleExpression::EmptyRule);
    }

    let tokens = tokenize(rule);

    let mut root: Option<Node> = None;
    let mut pending: Option<LogicalOp> = None;

    for token in tokens {
        match token {
            Token::Keyword(op) => pending = Some(op),
            Token::Condition(text) => {
                let condition = parse_condition(text)?;
                root = Some(match root {
                    None => condition,
                    Some(left) => {
                        let kind = pending.take().ok_or(InvalidRuleExpression::NoOperator)?;
                        Node::combine(kind, left, condition)
                    }
                });
            }
        }
    }

    root.ok_or(InvalidRuleExpression::EmptyRule)
}

fn tokenize(rule: &str) -> SmallVec<[Token<'_>; 8]> {
    let mut tokens = SmallVec::new();
    let mut last = 0;

    for caps in KEYWORD_RE.captures_iter(rule) {
        let (Some(whole), Some(keyword)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        tokens.push(Token::Condition(&rule[last..whole.start()]));
        tokens.push(Token::Keyword(match keyword.as_str() {
            "AND" => LogicalOp::And,
            _ => LogicalOp::Or,
        }));
        last = whole.end();
    }
    tokens.push(Token::Condition(&rule[last..]));

    tokens
}

fn parse_condition(text: &str) -> Result<Node, InvalidRuleExpression> {
    let text = text.trim();

    let Some((pos, symbol, operator)) = OPERATORS
        .iter()
        .find_map(|&(symbol, op)| text.find(symbol).map(|pos| (pos, symbol, op)))
    else {
        return Err(InvalidRuleExpression::InvalidCondition(text.to_string()));
    };

    let field = text[..pos].trim();
    let rest = &text[pos + symbol.len_utf8()..];

    // A second symbol in the literal means either two conditions run together
    // (`age > 30 department = 'Sales'`) or an unsupported form like `>=`.
    if let Some(next) = rest.find(['>', '<', '=']) {
        let between = rest[..next].trim();
        if between.contains(char::is_whitespace) {
            return Err(InvalidRuleExpression::NoOperator);
        }
        return Err(InvalidRuleExpression::InvalidCondition(text.to_string()));
    }

    let literal = match operator {
        Operator::Equal => rest.trim().trim_matches(['\'', '"']),
        _ => rest.trim(),
    };

    Ok(Node::Comparison(Comparison {
        field: field.to_string(),
        operator,
        literal: literal.to_string(),
    }))
}
