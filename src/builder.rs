//! Stack-based AST construction from front-end events.
//!
//! A front end walks the source text left to right and reports two kinds
//! of event: a literal or identifier was recognized ([`TreeBuilder::push_leaf`]),
//! or an operator production was reduced over already-built operands
//! ([`TreeBuilder::reduce`]). The builder keeps an explicit operand stack
//! and knows nothing about any concrete grammar, so any front end
//! (hand-written or generated) can drive it.

use chrono::{DateTime, NaiveDate};
use thiserror::Error;

use crate::ast::{BinaryOp, Node, UnaryOp};

/// The literal kinds a front end can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    Number,
    Str,
    Bool,
    Date,
    Timestamp,
    Null,
    Identifier,
}

/// The reductions a front end can request.
///
/// `Negated*` variants build the positive form and wrap it in a `not`
/// node; this is the crate's single encoding for `not like`, `not in`,
/// `not between` and `is not null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Binary(BinaryOp),
    NegatedBinary(BinaryOp),
    Unary(UnaryOp),
    NegatedUnary(UnaryOp),
    /// Collect literal operands into an `Array` node, restoring source
    /// order.
    Array,
}

/// Errors raised while building a tree from an event stream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// A reduction was requested with too few operands on the stack, or
    /// construction finished with other than exactly one node.
    #[error("unexpected operand stack")]
    Stack,

    /// A literal could not be parsed into its declared kind, or an
    /// operand had a kind the requested reduction cannot accept.
    #[error("expected a {expected} literal, found {literal}")]
    UnexpectedLiteral {
        expected: &'static str,
        literal: String,
    },
}

/// Builds one AST from an ordered stream of `push_leaf`/`reduce` events.
///
/// A builder owns its operand stack exclusively for the duration of one
/// build and must not be shared across builds.
///
/// # Examples
///
/// ```
/// use tsl::builder::{LeafKind, Reduction, TreeBuilder};
/// use tsl::{BinaryOp, Node};
///
/// // spec.pages > 100
/// let mut builder = TreeBuilder::new();
/// builder.push_leaf(LeafKind::Identifier, "spec.pages").unwrap();
/// builder.push_leaf(LeafKind::Number, "100").unwrap();
/// builder.reduce(Reduction::Binary(BinaryOp::Gt), 2).unwrap();
///
/// let tree = builder.finish().unwrap();
/// assert_eq!(
///     tree,
///     Node::Binary {
///         op: BinaryOp::Gt,
///         left: Box::new(Node::Identifier("spec.pages".to_string())),
///         right: Box::new(Node::Number(100.0)),
///     }
/// );
/// ```
#[derive(Debug, Default)]
pub struct TreeBuilder {
    stack: Vec<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a literal's raw text and push the leaf.
    ///
    /// String literals may arrive with their surrounding quotes; the
    /// quotes are stripped and SQL-style doubled quotes collapsed
    /// (`'it''s'` becomes `it's`).
    pub fn push_leaf(&mut self, kind: LeafKind, raw: &str) -> Result<(), BuildError> {
        let node = match kind {
            LeafKind::Number => {
                let f: f64 = raw
                    .parse()
                    .map_err(|_| unexpected("number", raw))?;
                Node::Number(f)
            }
            LeafKind::Str => Node::Str(unquote(raw)),
            LeafKind::Bool => {
                if raw.eq_ignore_ascii_case("true") {
                    Node::Bool(true)
                } else if raw.eq_ignore_ascii_case("false") {
                    Node::Bool(false)
                } else {
                    return Err(unexpected("boolean", raw));
                }
            }
            LeafKind::Date => {
                let d = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| unexpected("date", raw))?;
                Node::Date(d)
            }
            LeafKind::Timestamp => {
                let ts = DateTime::parse_from_rfc3339(raw)
                    .map_err(|_| unexpected("timestamp", raw))?;
                Node::Timestamp(ts)
            }
            LeafKind::Null => Node::Null,
            LeafKind::Identifier => Node::Identifier(raw.to_string()),
        };

        self.stack.push(node);
        Ok(())
    }

    /// Pop `arity` operands (most recently pushed is the rightmost) and
    /// push the reduced node.
    pub fn reduce(&mut self, reduction: Reduction, arity: usize) -> Result<(), BuildError> {
        match reduction {
            Reduction::Binary(op) => {
                if arity != 2 {
                    return Err(BuildError::Stack);
                }
                let node = self.reduce_binary(op)?;
                self.stack.push(node);
            }
            Reduction::NegatedBinary(op) => {
                if arity != 2 {
                    return Err(BuildError::Stack);
                }
                let node = self.reduce_binary(op)?;
                self.stack.push(Node::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(node),
                });
            }
            Reduction::Unary(op) => {
                if arity != 1 {
                    return Err(BuildError::Stack);
                }
                let operand = self.pop()?;
                self.stack.push(Node::Unary {
                    op,
                    operand: Box::new(operand),
                });
            }
            Reduction::NegatedUnary(op) => {
                if arity != 1 {
                    return Err(BuildError::Stack);
                }
                let operand = self.pop()?;
                self.stack.push(Node::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(Node::Unary {
                        op,
                        operand: Box::new(operand),
                    }),
                });
            }
            Reduction::Array => {
                let mut elements = Vec::with_capacity(arity);
                for _ in 0..arity {
                    let element = self.pop()?;
                    if !element.is_literal() {
                        return Err(unexpected("literal", element.kind_name()));
                    }
                    elements.push(element);
                }
                // Popped most-recent first; restore source order.
                elements.reverse();
                self.stack.push(Node::Array(elements));
            }
        }

        Ok(())
    }

    /// The node currently on top of the operand stack, if any. Front
    /// ends use this to disambiguate a one-element list from a
    /// parenthesized array expression.
    pub fn top(&self) -> Option<&Node> {
        self.stack.last()
    }

    /// Finish the build; succeeds only with exactly one node remaining.
    pub fn finish(mut self) -> Result<Node, BuildError> {
        let root = self.pop()?;
        if !self.stack.is_empty() {
            return Err(BuildError::Stack);
        }
        Ok(root)
    }

    fn reduce_binary(&mut self, op: BinaryOp) -> Result<Node, BuildError> {
        let right = self.pop()?;
        let left = self.pop()?;

        // Shape checks the original grammar guaranteed; surfacing them
        // here keeps malformed event streams from producing trees that
        // violate the AST invariants.
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                if let Node::Str(s) = &right {
                    return Err(unexpected("number", s));
                }
            }
            BinaryOp::Like | BinaryOp::ILike | BinaryOp::RegexEq | BinaryOp::RegexNe => {
                if !matches!(right, Node::Str(_)) {
                    return Err(unexpected("string", right.kind_name()));
                }
            }
            BinaryOp::In => {
                // The right side must be able to produce an array: a
                // literal list, an identifier, or an array expression.
                if right.is_literal() {
                    return Err(unexpected("array", right.kind_name()));
                }
            }
            BinaryOp::Between => match &right {
                Node::Array(bounds) if bounds.len() == 2 => {}
                Node::Array(bounds) => {
                    return Err(unexpected("array of two bounds", &bounds.len().to_string()));
                }
                other => return Err(unexpected("array", other.kind_name())),
            },
            _ => {}
        }

        Ok(Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn pop(&mut self) -> Result<Node, BuildError> {
        self.stack.pop().ok_or(BuildError::Stack)
    }
}

fn unexpected(expected: &'static str, literal: &str) -> BuildError {
    BuildError::UnexpectedLiteral {
        expected,
        literal: literal.to_string(),
    }
}

/// Strip matching quotes and collapse SQL-style doubled quotes.
fn unquote(raw: &str) -> String {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let quote = bytes[0];
        if (quote == b'\'' || quote == b'"') && bytes[bytes.len() - 1] == quote {
            let inner = &raw[1..raw.len() - 1];
            let doubled = if quote == b'\'' { "''" } else { "\"\"" };
            let single = if quote == b'\'' { "'" } else { "\"" };
            return inner.replace(doubled, single);
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote_collapses_doubled_quotes() {
        assert_eq!(unquote("'it''s'"), "it's");
        assert_eq!(unquote("\"say \"\"hi\"\"\""), "say \"hi\"");
        assert_eq!(unquote("bare"), "bare");
    }

    #[test]
    fn test_reduce_on_short_stack_is_a_stack_error() {
        let mut builder = TreeBuilder::new();
        builder.push_leaf(LeafKind::Number, "1").unwrap();
        let err = builder
            .reduce(Reduction::Binary(BinaryOp::And), 2)
            .unwrap_err();
        assert_eq!(err, BuildError::Stack);
    }

    #[test]
    fn test_between_restores_source_order() {
        let mut builder = TreeBuilder::new();
        builder.push_leaf(LeafKind::Identifier, "price").unwrap();
        builder.push_leaf(LeafKind::Number, "20").unwrap();
        builder.push_leaf(LeafKind::Number, "30").unwrap();
        builder.reduce(Reduction::Array, 2).unwrap();
        builder
            .reduce(Reduction::Binary(BinaryOp::Between), 2)
            .unwrap();

        let tree = builder.finish().unwrap();
        match tree {
            Node::Binary { op, right, .. } => {
                assert_eq!(op, BinaryOp::Between);
                assert_eq!(
                    *right,
                    Node::Array(vec![Node::Number(20.0), Node::Number(30.0)])
                );
            }
            other => panic!("expected a binary node, got {other:?}"),
        }
    }
}
