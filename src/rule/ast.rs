//! Abstract Syntax Tree for rule expressions
//!
//! Parsed rules are left-leaning chains as deep as the rule has conditions,
//! so every walk over a [`Node`] (including clone, equality and drop) uses an
//! explicit stack instead of recursion.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;

/// AST node for rule expressions
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// Leaf like `age > 30`
    Comparison(Comparison),
    /// Two subtrees joined by AND/OR
    BooleanCombination {
        kind: LogicalOp,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Single field comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub field: String,
    pub operator: Operator,
    /// Raw literal text, interpreted at evaluation time
    pub literal: String,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Greater than (>)
    #[serde(rename = "GT")]
    Greater,
    /// Less than (<)
    #[serde(rename = "LT")]
    Less,
    /// Equal (=), case-insensitive text
    #[serde(rename = "EQ")]
    Equal,
}

/// Logical connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Operator::Greater => '>',
            Operator::Less => '<',
            Operator::Equal => '=',
        }
    }
}

impl LogicalOp {
    pub fn keyword(self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }

    #[inline]
    pub fn apply(self, left: bool, right: bool) -> bool {
        match self {
            LogicalOp::And => left && right,
            LogicalOp::Or => left || right,
        }
    }
}

impl Node {
    pub fn comparison(
        field: impl Into<String>,
        operator: Operator,
        literal: impl Into<String>,
    ) -> Self {
        Node::Comparison(Comparison {
            field: field.into(),
            operator,
            literal: literal.into(),
        })
    }

    pub fn combine(kind: LogicalOp, left: Node, right: Node) -> Self {
        Node::BooleanCombination {
            kind,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Node, right: Node) -> Self {
        Self::combine(LogicalOp::And, left, right)
    }

    pub fn or(left: Node, right: Node) -> Self {
        Self::combine(LogicalOp::Or, left, right)
    }

    /// Post-order fold over the tree without recursion.
    ///
    /// Comparisons are visited left to right; `join` receives the results of
    /// the left and right subtree once both are complete. The first error
    /// aborts the walk.
    pub fn try_fold<'a, T, E>(
        &'a self,
        mut leaf: impl FnMut(&'a Comparison) -> Result<T, E>,
        mut join: impl FnMut(LogicalOp, T, T) -> Result<T, E>,
    ) -> Result<T, E> {
        enum Step<'a> {
            Visit(&'a Node),
            Join(LogicalOp),
        }

        let mut work = vec![Step::Visit(self)];
        let mut values: Vec<T> = Vec::new();

        while let Some(step) = work.pop() {
            match step {
                Step::Visit(Node::Comparison(cmp)) => values.push(leaf(cmp)?),
                Step::Visit(Node::BooleanCombination { kind, left, right }) => {
                    work.push(Step::Join(*kind));
                    work.push(Step::Visit(right));
                    work.push(Step::Visit(left));
                }
                Step::Join(kind) => {
                    let (Some(right), Some(left)) = (values.pop(), values.pop()) else {
                        unreachable!("join scheduled before both subtrees");
                    };
                    values.push(join(kind, left, right)?);
                }
            }
        }

        match values.pop() {
            Some(value) => Ok(value),
            None => unreachable!("fold always yields a root value"),
        }
    }

    fn fold<'a, T>(
        &'a self,
        mut leaf: impl FnMut(&'a Comparison) -> T,
        mut join: impl FnMut(LogicalOp, T, T) -> T,
    ) -> T {
        let result: Result<T, Infallible> =
            self.try_fold(|cmp| Ok(leaf(cmp)), |kind, l, r| Ok(join(kind, l, r)));
        match result {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Number of comparison leaves in the tree
    pub fn condition_count(&self) -> usize {
        self.fold(|_| 1, |_, left, right| left + right)
    }

    /// Field names referenced by the tree, in source order, without duplicates
    pub fn fields(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        self.fold(
            |cmp| {
                if !out.contains(&cmp.field.as_str()) {
                    out.push(&cmp.field);
                }
            },
            |_, _, _| (),
        );
        out
    }

    /// Cheap leaf left behind when a subtree is detached during drop
    fn detached() -> Self {
        Node::Comparison(Comparison {
            field: String::new(),
            operator: Operator::Equal,
            literal: String::new(),
        })
    }

    /// Move combination children out into `into`, leaving leaves in place
    fn detach_subtrees(&mut self, into: &mut Vec<Node>) {
        if let Node::BooleanCombination { left, right, .. } = self {
            for child in [left, right] {
                if matches!(**child, Node::BooleanCombination { .. }) {
                    into.push(std::mem::replace(&mut **child, Node::detached()));
                }
            }
        }
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        self.fold(
            |cmp| Node::Comparison(cmp.clone()),
            |kind, left, right| Node::combine(kind, left, right),
        )
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut pairs: Vec<(&Node, &Node)> = vec![(self, other)];
        while let Some(pair) = pairs.pop() {
            match pair {
                (Node::Comparison(a), Node::Comparison(b)) => {
                    if a != b {
                        return false;
                    }
                }
                (
                    Node::BooleanCombination {
                        kind: k1,
                        left: l1,
                        right: r1,
                    },
                    Node::BooleanCombination {
                        kind: k2,
                        left: l2,
                        right: r2,
                    },
                ) => {
                    if k1 != k2 {
                        return false;
                    }
                    pairs.push((r1, r2));
                    pairs.push((l1, l2));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_subtrees(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_subtrees(&mut pending);
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Operator::Equal => write!(f, "{} = '{}'", self.field, self.literal),
            op => write!(f, "{} {} {}", self.field, op.symbol(), self.literal),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Walk the left spine; only a nested right side recurses
        let mut spine = Vec::new();
        let mut node = self;
        while let Node::BooleanCombination { kind, left, right } = node {
            spine.push((*kind, right.as_ref()));
            node = left;
        }

        if let Node::Comparison(cmp) = node {
            fmt::Display::fmt(cmp, f)?;
        }
        for (kind, right) in spine.into_iter().rev() {
            write!(f, " {} ", kind.keyword())?;
            match right {
                Node::Comparison(cmp) => fmt::Display::fmt(cmp, f)?,
                nested => write!(f, "({})", nested)?,
            }
        }
        Ok(())
    }
}
