//! Compilation of a TSL tree into a parameterized SQL boolean
//! expression.
//!
//! The output is driver-agnostic text plus a positional argument list;
//! embedding the text into a full statement and binding the arguments
//! is the caller's job. Compilation is all-or-nothing: no partial SQL
//! is ever returned.

use chrono::SecondsFormat;
use thiserror::Error;

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::value::Value;

/// Placeholder convention of the generated text.
///
/// A pure formatting switch: arguments are collected the same way for
/// both styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// `?` for every argument (MySQL, SQLite)
    #[default]
    QuestionMark,
    /// `$1, $2, ...` numbered by position (PostgreSQL)
    Numbered,
}

/// A compiled SQL fragment: boolean expression text plus the arguments
/// bound to its placeholders, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub args: Vec<Value>,
}

/// Errors raised while compiling a tree to SQL.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// An operator with no SQL encoding, such as the array reductions.
    #[error("operator {op} has no SQL form")]
    UnexpectedOperator { op: String },

    /// A `between` operand list without exactly two bounds.
    #[error("between operator: {reason}")]
    BetweenOperator { reason: String },

    /// A node kind in a position the compiler cannot encode.
    #[error("unexpected node kind {kind}")]
    UnexpectedType { kind: &'static str },
}

/// Compile a tree using `?` placeholders.
///
/// # Examples
///
/// ```
/// use tsl::{compile, parse, Value};
///
/// let tree = parse("name = 'joe' and city != 'rome'").unwrap();
/// let fragment = compile(&tree).unwrap();
/// assert_eq!(fragment.sql, "(name = ? AND city <> ?)");
/// assert_eq!(
///     fragment.args,
///     vec![
///         Value::Str("joe".to_string()),
///         Value::Str("rome".to_string()),
///     ]
/// );
/// ```
pub fn compile(node: &Node) -> Result<SqlFragment, CompileError> {
    compile_with(node, PlaceholderStyle::QuestionMark)
}

/// Compile a tree using the given placeholder style.
///
/// # Examples
///
/// ```
/// use tsl::{compile_with, parse, PlaceholderStyle};
///
/// let tree = parse("price between 20 and 30").unwrap();
/// let fragment = compile_with(&tree, PlaceholderStyle::Numbered).unwrap();
/// assert_eq!(fragment.sql, "price BETWEEN $1 AND $2");
/// ```
pub fn compile_with(node: &Node, style: PlaceholderStyle) -> Result<SqlFragment, CompileError> {
    let mut sql = String::new();
    let mut args = Vec::new();
    walk(node, &mut sql, &mut args)?;

    if style == PlaceholderStyle::Numbered {
        sql = number_placeholders(&sql);
    }
    Ok(SqlFragment { sql, args })
}

fn walk(node: &Node, sql: &mut String, args: &mut Vec<Value>) -> Result<(), CompileError> {
    match node {
        Node::Identifier(name) => {
            sql.push_str(name);
            Ok(())
        }

        Node::Number(_)
        | Node::Str(_)
        | Node::Bool(_)
        | Node::Date(_)
        | Node::Timestamp(_)
        | Node::Null => {
            sql.push('?');
            args.push(literal_arg(node));
            Ok(())
        }

        // A bare array only has meaning as an operand of IN or BETWEEN,
        // both of which encode it themselves.
        Node::Array(_) => Err(CompileError::UnexpectedType {
            kind: node.kind_name(),
        }),

        Node::Unary { op, operand } => walk_unary(*op, operand, sql, args),
        Node::Binary { op, left, right } => walk_binary(*op, left, right, sql, args),
    }
}

fn walk_unary(
    op: UnaryOp,
    operand: &Node,
    sql: &mut String,
    args: &mut Vec<Value>,
) -> Result<(), CompileError> {
    match op {
        UnaryOp::Not => {
            // `not (x is null)` reads better as IS NOT NULL.
            if let Some(tested) = null_test_operand(operand) {
                walk(tested, sql, args)?;
                sql.push_str(" IS NOT NULL");
                return Ok(());
            }
            sql.push_str("NOT (");
            walk(operand, sql, args)?;
            sql.push(')');
            Ok(())
        }
        UnaryOp::Neg => {
            sql.push_str("-(");
            walk(operand, sql, args)?;
            sql.push(')');
            Ok(())
        }
        UnaryOp::IsNull => {
            walk(operand, sql, args)?;
            sql.push_str(" IS NULL");
            Ok(())
        }
        UnaryOp::Len | UnaryOp::Any | UnaryOp::All | UnaryOp::Sum => {
            Err(CompileError::UnexpectedOperator { op: op.to_string() })
        }
    }
}

/// The operand of a null test, when `node` is one in either encoding.
fn null_test_operand(node: &Node) -> Option<&Node> {
    match node {
        Node::Unary {
            op: UnaryOp::IsNull,
            operand,
        } => Some(operand),
        Node::Binary {
            op: BinaryOp::Is,
            left,
            right,
        } if matches!(**right, Node::Null) => Some(left),
        _ => None,
    }
}

fn walk_binary(
    op: BinaryOp,
    left: &Node,
    right: &Node,
    sql: &mut String,
    args: &mut Vec<Value>,
) -> Result<(), CompileError> {
    match op {
        BinaryOp::And | BinaryOp::Or => {
            sql.push('(');
            walk(left, sql, args)?;
            sql.push_str(if op == BinaryOp::And { " AND " } else { " OR " });
            walk(right, sql, args)?;
            sql.push(')');
            Ok(())
        }

        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            let token = match op {
                BinaryOp::Add => " + ",
                BinaryOp::Sub => " - ",
                BinaryOp::Mul => " * ",
                BinaryOp::Div => " / ",
                _ => " % ",
            };
            sql.push('(');
            walk(left, sql, args)?;
            sql.push_str(token);
            walk(right, sql, args)?;
            sql.push(')');
            Ok(())
        }

        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let token = match op {
                BinaryOp::Eq => " = ",
                BinaryOp::Ne => " <> ",
                BinaryOp::Lt => " < ",
                BinaryOp::Le => " <= ",
                BinaryOp::Gt => " > ",
                _ => " >= ",
            };
            walk(left, sql, args)?;
            sql.push_str(token);
            walk(right, sql, args)?;
            Ok(())
        }

        BinaryOp::Like | BinaryOp::ILike => {
            walk(left, sql, args)?;
            sql.push_str(if op == BinaryOp::Like {
                " LIKE "
            } else {
                " ILIKE "
            });
            walk(right, sql, args)?;
            Ok(())
        }

        BinaryOp::RegexEq => {
            walk(left, sql, args)?;
            sql.push_str(" REGEXP ");
            walk(right, sql, args)?;
            Ok(())
        }
        BinaryOp::RegexNe => {
            sql.push_str("NOT (");
            walk(left, sql, args)?;
            sql.push_str(" REGEXP ");
            walk(right, sql, args)?;
            sql.push(')');
            Ok(())
        }

        BinaryOp::In => {
            let Node::Array(elements) = right else {
                return Err(CompileError::UnexpectedType {
                    kind: right.kind_name(),
                });
            };
            walk(left, sql, args)?;
            sql.push_str(" IN (");
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                walk(element, sql, args)?;
            }
            sql.push(')');
            Ok(())
        }

        BinaryOp::Between => {
            let Node::Array(bounds) = right else {
                return Err(CompileError::UnexpectedType {
                    kind: right.kind_name(),
                });
            };
            if bounds.len() != 2 {
                return Err(CompileError::BetweenOperator {
                    reason: format!("expected 2 values, got {}", bounds.len()),
                });
            }
            walk(left, sql, args)?;
            sql.push_str(" BETWEEN ");
            walk(&bounds[0], sql, args)?;
            sql.push_str(" AND ");
            walk(&bounds[1], sql, args)?;
            Ok(())
        }

        BinaryOp::Is => {
            walk(left, sql, args)?;
            if matches!(right, Node::Null) {
                sql.push_str(" IS NULL");
                return Ok(());
            }
            sql.push_str(" = ");
            walk(right, sql, args)?;
            Ok(())
        }
    }
}

/// The bound-argument form of a literal leaf: booleans encode as `1`/`0`
/// and date-typed leaves as RFC 3339 strings.
fn literal_arg(node: &Node) -> Value {
    match node {
        Node::Number(n) => Value::Number(*n),
        Node::Str(s) => Value::Str(s.clone()),
        Node::Bool(b) => Value::Number(if *b { 1.0 } else { 0.0 }),
        Node::Date(d) => Value::Str(format!("{}T00:00:00Z", d.format("%Y-%m-%d"))),
        Node::Timestamp(ts) => Value::Str(ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
        _ => Value::Null,
    }
}

/// Rewrite `?` placeholders as `$1, $2, ...` in emission order. The
/// text never carries string literals, so every `?` is a placeholder.
fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut n = 0;
    for ch in sql.chars() {
        if ch == '?' {
            n += 1;
            out.push('$');
            out.push_str(&n.to_string());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_arithmetic_groups_with_parentheses() {
        let tree = parse("(salary + bonus) * 0.3 > 20000").unwrap();
        let fragment = compile(&tree).unwrap();
        assert_eq!(fragment.sql, "((salary + bonus) * ?) > ?");
        assert_eq!(
            fragment.args,
            vec![Value::Number(0.3), Value::Number(20000.0)]
        );
    }

    #[test]
    fn test_is_not_null_has_no_placeholder() {
        let tree = parse("city is not null").unwrap();
        let fragment = compile(&tree).unwrap();
        assert_eq!(fragment.sql, "city IS NOT NULL");
        assert!(fragment.args.is_empty());
    }

    #[test]
    fn test_reductions_have_no_sql_form() {
        let tree = parse("sum tags > 3").unwrap();
        assert_eq!(
            compile(&tree),
            Err(CompileError::UnexpectedOperator {
                op: "SUM".to_string()
            })
        );
    }
}
