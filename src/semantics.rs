//! In-memory evaluation of a TSL tree against one record.
//!
//! Evaluation is pure and synchronous: the only outside contact is the
//! caller-supplied resolver, which maps identifier names to values. A
//! failed sub-expression is a hard stop for the whole evaluation; no
//! error is ever defaulted to `false`.

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use thiserror::Error;

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::value::Value;

/// Errors raised while evaluating a tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The resolver had no value for an identifier.
    #[error("key not found: {name}")]
    KeyNotFound { name: String },

    /// An operand had the wrong runtime type for its operator.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// An operator was applied in a position it has no meaning in, such
    /// as broadcasting `in` over an array.
    #[error("unexpected operator {op}")]
    UnexpectedOperator { op: String },

    /// Division or modulo by zero.
    #[error("division by zero in {op}")]
    DivisionByZero { op: BinaryOp },

    /// A `between` operand list without exactly two bounds.
    #[error("between operator: {reason}")]
    BetweenOperator { reason: String },

    /// A node kind with no evaluation rule in its position, such as an
    /// operator expression nested inside an array literal.
    #[error("unexpected node kind {kind}")]
    UnexpectedType { kind: &'static str },

    /// A regular expression operand that does not compile.
    #[error("invalid pattern: {pattern}")]
    InvalidPattern { pattern: String },
}

/// Evaluate a tree against a resolver.
///
/// The resolver answers `None` for absent keys; an absent key is an
/// error everywhere except under a null test, where absence counts as
/// null.
///
/// # Examples
///
/// ```
/// use tsl::{evaluate, parse, Value};
///
/// let tree = parse("spec.pages > 100 or author = 'Joe'")?;
/// let resolve = |name: &str| match name {
///     "spec.pages" => Some(Value::Number(14.0)),
///     "author" => Some(Value::Str("Joe".to_string())),
///     _ => None,
/// };
/// assert_eq!(evaluate(&tree, &resolve), Ok(Value::Bool(true)));
/// # Ok::<(), tsl::SyntaxError>(())
/// ```
pub fn evaluate<R>(node: &Node, resolve: &R) -> Result<Value, EvalError>
where
    R: Fn(&str) -> Option<Value>,
{
    match node {
        Node::Number(n) => Ok(Value::Number(*n)),
        Node::Str(s) => Ok(Value::Str(s.clone())),
        Node::Bool(b) => Ok(Value::Bool(*b)),
        Node::Date(d) => Ok(Value::Date(*d)),
        Node::Timestamp(ts) => Ok(Value::Timestamp(*ts)),
        Node::Null => Ok(Value::Null),
        Node::Identifier(name) => resolve(name)
            .map(normalize)
            .ok_or_else(|| EvalError::KeyNotFound { name: name.clone() }),
        Node::Array(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                if !element.is_literal() {
                    return Err(EvalError::UnexpectedType {
                        kind: element.kind_name(),
                    });
                }
                values.push(evaluate(element, resolve)?);
            }
            Ok(Value::Array(values))
        }
        Node::Unary { op, operand } => eval_unary(*op, operand, resolve),
        Node::Binary { op, left, right } => eval_binary(*op, left, right, resolve),
    }
}

/// Normalize a resolved value: strings in a recognized date or
/// timestamp form become date-typed, arrays normalize element-wise.
fn normalize(value: Value) -> Value {
    match value {
        Value::Str(s) => match parse_temporal(&s) {
            Some(temporal) => temporal,
            None => Value::Str(s),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        other => other,
    }
}

fn parse_temporal(s: &str) -> Option<Value> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(Value::Timestamp(ts));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Value::Date(d));
    }
    None
}

/// Evaluate an operand of a null test: an absent key counts as null
/// instead of erroring.
fn eval_nullable<R>(node: &Node, resolve: &R) -> Result<Value, EvalError>
where
    R: Fn(&str) -> Option<Value>,
{
    if let Node::Identifier(name) = node {
        return Ok(resolve(name).map(normalize).unwrap_or(Value::Null));
    }
    evaluate(node, resolve)
}

fn eval_unary<R>(op: UnaryOp, operand: &Node, resolve: &R) -> Result<Value, EvalError>
where
    R: Fn(&str) -> Option<Value>,
{
    if op == UnaryOp::IsNull {
        let value = eval_nullable(operand, resolve)?;
        return Ok(Value::Bool(value.is_null()));
    }

    let value = evaluate(operand, resolve)?;
    match op {
        UnaryOp::Not => match value {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            Value::Array(items) => {
                let negated = items
                    .into_iter()
                    .map(|item| match item {
                        Value::Bool(b) => Ok(Value::Bool(!b)),
                        other => Err(mismatch("boolean", &other)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(negated))
            }
            other => Err(mismatch("boolean", &other)),
        },
        UnaryOp::Neg => match value {
            Value::Number(n) => Ok(Value::Number(-n)),
            Value::Array(items) => {
                let negated = items
                    .into_iter()
                    .map(|item| match item {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        other => Err(mismatch("number", &other)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(negated))
            }
            other => Err(mismatch("number", &other)),
        },
        UnaryOp::Len => match value {
            Value::Array(items) => Ok(Value::Number(items.len() as f64)),
            other => Err(mismatch("array", &other)),
        },
        UnaryOp::Any | UnaryOp::All => match value {
            Value::Array(items) => reduce_booleans(op, &items),
            other => Err(mismatch("array", &other)),
        },
        UnaryOp::Sum => match value {
            Value::Array(items) => {
                let mut total = 0.0;
                for item in &items {
                    match item {
                        Value::Number(n) => total += n,
                        other => return Err(mismatch("number", other)),
                    }
                }
                Ok(Value::Number(total))
            }
            other => Err(mismatch("array", &other)),
        },
        UnaryOp::IsNull => unreachable!("handled above"),
    }
}

/// `any`/`all` over boolean elements; both reductions of an empty
/// array are `false`.
fn reduce_booleans(op: UnaryOp, items: &[Value]) -> Result<Value, EvalError> {
    if items.is_empty() {
        return Ok(Value::Bool(false));
    }

    let mut result = op == UnaryOp::All;
    for item in items {
        match item {
            Value::Bool(b) => {
                if op == UnaryOp::All {
                    result = result && *b;
                } else {
                    result = result || *b;
                }
            }
            other => return Err(mismatch("boolean", other)),
        }
    }
    Ok(Value::Bool(result))
}

fn eval_binary<R>(
    op: BinaryOp,
    left: &Node,
    right: &Node,
    resolve: &R,
) -> Result<Value, EvalError>
where
    R: Fn(&str) -> Option<Value>,
{
    match op {
        BinaryOp::In => eval_in(left, right, resolve),
        BinaryOp::Between => eval_between(left, right, resolve),
        BinaryOp::Is => {
            let right_value = eval_nullable(right, resolve)?;
            let left_value = eval_nullable(left, resolve)?;
            if right_value.is_null() {
                return Ok(Value::Bool(left_value.is_null()));
            }
            Ok(Value::Bool(
                value_equals(&left_value, &right_value) == Some(true),
            ))
        }
        _ => {
            let left_value = evaluate(left, resolve)?;
            let right_value = evaluate(right, resolve)?;
            apply_binary(op, left_value, right_value)
        }
    }
}

/// Apply a scalar binary operator, broadcasting element-wise when the
/// left operand is an array. Both sides being arrays is a mismatch.
fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    if let Value::Array(items) = left {
        if matches!(right, Value::Array(_)) {
            return Err(mismatch("scalar", &right));
        }
        let results = items
            .into_iter()
            .map(|item| scalar_binary(op, item, right.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Value::Array(results));
    }
    scalar_binary(op, left, right)
}

fn scalar_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::And | BinaryOp::Or => {
            let l = require_bool(&left)?;
            let r = require_bool(&right)?;
            let result = if op == BinaryOp::And { l && r } else { l || r };
            Ok(Value::Bool(result))
        }

        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(op, left, right)
        }

        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            compare(op, &left, &right).map(Value::Bool)
        }

        BinaryOp::Like | BinaryOp::ILike => {
            let value = require_str(&left)?;
            let pattern = require_str(&right)?;
            let regex = like_pattern(pattern, op == BinaryOp::ILike)?;
            Ok(Value::Bool(regex.is_match(value)))
        }

        BinaryOp::RegexEq | BinaryOp::RegexNe => {
            let value = require_str(&left)?;
            let pattern = require_str(&right)?;
            let regex = Regex::new(pattern).map_err(|_| EvalError::InvalidPattern {
                pattern: pattern.to_string(),
            })?;
            let matched = regex.is_match(value);
            Ok(Value::Bool(if op == BinaryOp::RegexEq {
                matched
            } else {
                !matched
            }))
        }

        // Broadcasting has no meaning for the structural operators.
        BinaryOp::In | BinaryOp::Between | BinaryOp::Is => Err(EvalError::UnexpectedOperator {
            op: op.to_string(),
        }),
    }
}

fn arithmetic(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    let (Value::Number(l), Value::Number(r)) = (&left, &right) else {
        let offending = if matches!(left, Value::Number(_)) {
            &right
        } else {
            &left
        };
        return Err(mismatch("number", offending));
    };

    let result = match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => {
            if *r == 0.0 {
                return Err(EvalError::DivisionByZero { op });
            }
            l / r
        }
        BinaryOp::Mod => {
            // Both operands truncate to integers before the remainder.
            if *r as i64 == 0 {
                return Err(EvalError::DivisionByZero { op });
            }
            ((*l as i64) % (*r as i64)) as f64
        }
        _ => {
            return Err(EvalError::UnexpectedOperator {
                op: op.to_string(),
            });
        }
    };
    Ok(Value::Number(result))
}

/// Type-aware comparison. Dates and timestamps compare chronologically,
/// and a string operand facing a date-typed operand is coerced when it
/// parses as a date or timestamp.
fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
    if let Some(ordering) = chronological(left, right) {
        return Ok(match op {
            BinaryOp::Eq => ordering.is_eq(),
            BinaryOp::Ne => !ordering.is_eq(),
            BinaryOp::Lt => ordering.is_lt(),
            BinaryOp::Le => ordering.is_le(),
            BinaryOp::Gt => ordering.is_gt(),
            BinaryOp::Ge => ordering.is_ge(),
            _ => false,
        });
    }

    match (left, right) {
        (Value::Str(l), Value::Str(r)) => Ok(ordered(op, l.cmp(r))),
        (Value::Number(l), Value::Number(r)) => Ok(match op {
            BinaryOp::Eq => l == r,
            BinaryOp::Ne => l != r,
            BinaryOp::Lt => l < r,
            BinaryOp::Le => l <= r,
            BinaryOp::Gt => l > r,
            BinaryOp::Ge => l >= r,
            _ => false,
        }),
        (Value::Bool(l), Value::Bool(r)) => match op {
            BinaryOp::Eq => Ok(l == r),
            BinaryOp::Ne => Ok(l != r),
            _ => Err(EvalError::TypeMismatch {
                expected: "comparable type".to_string(),
                actual: "boolean".to_string(),
            }),
        },
        (l, r) => Err(EvalError::TypeMismatch {
            expected: l.type_name().to_string(),
            actual: r.type_name().to_string(),
        }),
    }
}

fn ordered(op: BinaryOp, ordering: std::cmp::Ordering) -> bool {
    match op {
        BinaryOp::Eq => ordering.is_eq(),
        BinaryOp::Ne => !ordering.is_eq(),
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::Le => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::Ge => ordering.is_ge(),
        _ => false,
    }
}

/// Chronological ordering of two values when at least one side is
/// date-typed; `None` when neither is.
fn chronological(left: &Value, right: &Value) -> Option<std::cmp::Ordering> {
    let l = temporal_instant(left, right)?;
    let r = temporal_instant(right, left)?;
    l.partial_cmp(&r)
}

/// The instant `value` names, coercing a string when `other` is
/// date-typed.
fn temporal_instant(
    value: &Value,
    other: &Value,
) -> Option<DateTime<chrono::Utc>> {
    if let Some(instant) = value.instant() {
        return Some(instant);
    }
    if other.instant().is_some() {
        if let Value::Str(s) = value {
            return parse_temporal(s).and_then(|v| v.instant());
        }
    }
    None
}

fn eval_in<R>(left: &Node, right: &Node, resolve: &R) -> Result<Value, EvalError>
where
    R: Fn(&str) -> Option<Value>,
{
    let left_value = evaluate(left, resolve)?;
    let elements = match evaluate(right, resolve)? {
        Value::Array(items) => items,
        other => return Err(mismatch("array", &other)),
    };

    // Type-incompatible elements are skipped, not an error.
    let found = elements
        .iter()
        .any(|element| value_equals(&left_value, element) == Some(true));
    Ok(Value::Bool(found))
}

fn eval_between<R>(left: &Node, right: &Node, resolve: &R) -> Result<Value, EvalError>
where
    R: Fn(&str) -> Option<Value>,
{
    let bounds = match evaluate(right, resolve)? {
        Value::Array(items) => items,
        other => return Err(mismatch("array", &other)),
    };
    if bounds.len() != 2 {
        return Err(EvalError::BetweenOperator {
            reason: format!("expected 2 values, got {}", bounds.len()),
        });
    }

    let value = evaluate(left, resolve)?;
    let low = &bounds[0];
    let high = &bounds[1];

    // Strings test the half-open range [low, high); numbers and dates
    // the closed range [low, high].
    match &value {
        Value::Str(_) if low.instant().is_none() => Ok(Value::Bool(
            compare(BinaryOp::Ge, &value, low)? && compare(BinaryOp::Lt, &value, high)?,
        )),
        Value::Number(_) | Value::Str(_) | Value::Date(_) | Value::Timestamp(_) => Ok(Value::Bool(
            compare(BinaryOp::Ge, &value, low)? && compare(BinaryOp::Le, &value, high)?,
        )),
        other => Err(mismatch("comparable type", other)),
    }
}

/// Type-aware equality; `None` means the two types cannot be compared.
fn value_equals(left: &Value, right: &Value) -> Option<bool> {
    if let Some(ordering) = chronological(left, right) {
        return Some(ordering.is_eq());
    }
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Some(l == r),
        (Value::Str(l), Value::Str(r)) => Some(l == r),
        (Value::Bool(l), Value::Bool(r)) => Some(l == r),
        (Value::Null, Value::Null) => Some(true),
        _ => None,
    }
}

/// Translate a SQL LIKE pattern into an anchored regex: `%` matches any
/// run of characters, `_` exactly one; everything else is literal.
fn like_pattern(pattern: &str, case_insensitive: bool) -> Result<Regex, EvalError> {
    let mut regex_text = String::with_capacity(pattern.len() + 8);
    if case_insensitive {
        regex_text.push_str("(?i)");
    }
    regex_text.push('^');
    for ch in pattern.chars() {
        match ch {
            '%' => regex_text.push_str(".*"),
            '_' => regex_text.push('.'),
            ch => regex_text.push_str(&regex::escape(&ch.to_string())),
        }
    }
    regex_text.push('$');

    Regex::new(&regex_text).map_err(|_| EvalError::InvalidPattern {
        pattern: pattern.to_string(),
    })
}

fn require_bool(value: &Value) -> Result<bool, EvalError> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(mismatch("boolean", other)),
    }
}

fn require_str(value: &Value) -> Result<&str, EvalError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(mismatch("string", other)),
    }
}

fn mismatch(expected: &str, actual: &Value) -> EvalError {
    EvalError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn no_keys(_: &str) -> Option<Value> {
        None
    }

    #[test]
    fn test_modulo_truncates_to_integers() {
        let tree = parse("7.9 % 3 = 1").unwrap();
        assert_eq!(evaluate(&tree, &no_keys), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_modulo_by_zero() {
        let tree = parse("0 % 0 = 0").unwrap();
        assert_eq!(
            evaluate(&tree, &no_keys),
            Err(EvalError::DivisionByZero { op: BinaryOp::Mod })
        );
    }

    #[test]
    fn test_like_special_characters_are_literal() {
        let resolve = |name: &str| match name {
            "path" => Some(Value::Str("a.b.c".to_string())),
            _ => None,
        };
        let hit = parse("path like 'a.b%'").unwrap();
        let miss = parse("path like 'aXb%'").unwrap();
        assert_eq!(evaluate(&hit, &resolve), Ok(Value::Bool(true)));
        assert_eq!(evaluate(&miss, &resolve), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_any_and_all_of_empty_array_are_false() {
        let resolve = |name: &str| match name {
            "tags" => Some(Value::Array(vec![])),
            _ => None,
        };
        let any = parse("any (tags = 'x')").unwrap();
        let all = parse("all (tags = 'x')").unwrap();
        assert_eq!(evaluate(&any, &resolve), Ok(Value::Bool(false)));
        assert_eq!(evaluate(&all, &resolve), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_string_date_coerces_against_date_column() {
        let resolve = |name: &str| match name {
            "created_at" => Some(Value::Str("2023-06-01T10:00:00Z".to_string())),
            _ => None,
        };
        let tree = parse("created_at > '2023-01-01'").unwrap();
        assert_eq!(evaluate(&tree, &resolve), Ok(Value::Bool(true)));
    }
}
