use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::ast::{BinaryOp, UnaryOp};

/// Abstract Syntax Tree node representing a parsed TSL expression.
///
/// Leaves carry literal values or identifier names; `Array` carries the
/// operand lists of `in` and `between`; `Unary` and `Binary` carry
/// operator expressions.
///
/// # Examples
///
/// ```
/// use tsl::{BinaryOp, Node};
///
/// // spec.pages > 100
/// let tree = Node::Binary {
///     op: BinaryOp::Gt,
///     left: Box::new(Node::Identifier("spec.pages".to_string())),
///     right: Box::new(Node::Number(100.0)),
/// };
/// assert_eq!(tree.kind_name(), "BINARY_EXP");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // Literals
    /// Numeric literal
    Number(f64),

    /// String literal, unescaped (`''` already collapsed to `'`)
    Str(String),

    /// Boolean literal
    Bool(bool),

    /// Date literal (`2020-01-01`)
    Date(NaiveDate),

    /// Timestamp literal (`2020-01-01T00:00:01Z`)
    Timestamp(DateTime<FixedOffset>),

    /// Null literal
    Null,

    /// Identifier, resolved by the caller at evaluation time
    ///
    /// # Examples
    /// ```text
    /// author
    /// spec.pages
    /// ```
    Identifier(String),

    /// Ordered list of nodes; the operand of `in`, and the `[low, high]`
    /// bounds of `between`
    Array(Vec<Node>),

    /// Unary operation
    Unary { op: UnaryOp, operand: Box<Node> },

    /// Binary operation
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    /// Node kind name, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Number(_) => "NUMBER",
            Node::Str(_) => "STRING",
            Node::Bool(_) => "BOOLEAN",
            Node::Date(_) => "DATE",
            Node::Timestamp(_) => "TIMESTAMP",
            Node::Null => "NULL",
            Node::Identifier(_) => "IDENTIFIER",
            Node::Array(_) => "ARRAY",
            Node::Unary { .. } => "UNARY_EXP",
            Node::Binary { .. } => "BINARY_EXP",
        }
    }

    /// Whether this node is a literal leaf (no identifier, no children).
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Node::Number(_)
                | Node::Str(_)
                | Node::Bool(_)
                | Node::Date(_)
                | Node::Timestamp(_)
                | Node::Null
        )
    }
}
