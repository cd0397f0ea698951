//! Identifier rewriting and collection.
//!
//! `rewrite` maps user-facing field names onto the names (or
//! expressions) a backend understands, before a tree is evaluated or
//! compiled. The input tree is never touched; a rewritten copy is
//! returned, or nothing at all on the first mapping failure.

use thiserror::Error;

use crate::ast::Node;
use crate::parser::parse;

/// Errors raised while rewriting identifiers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RewriteError {
    /// The mapping callback rejected an identifier.
    #[error("unknown identifier {name}: {reason}")]
    UnknownIdentifier { name: String, reason: String },

    /// A mapped replacement did not parse as an expression.
    #[error("replacement for {name} does not parse: {replacement}")]
    InvalidReplacement { name: String, replacement: String },
}

/// Rewrite every identifier through a mapping callback.
///
/// Returns the rewritten tree together with the distinct identifier
/// names of the input, in first-encounter order. Each replacement is
/// parsed as a sub-expression, so a mapped name may expand to a
/// compound expression like `(base + bonus)`.
///
/// # Examples
///
/// ```
/// use tsl::{parse, rewrite};
///
/// let tree = parse("spec.pages > 100 and author = 'Joe'").unwrap();
/// let map = |name: &str| match name {
///     "spec.pages" => Ok("pages".to_string()),
///     "author" => Ok("author".to_string()),
///     other => Err(format!("no such column: {other}")),
/// };
///
/// let (rewritten, names) = rewrite(&tree, &map).unwrap();
/// assert_eq!(rewritten, parse("pages > 100 and author = 'Joe'").unwrap());
/// assert_eq!(names, vec!["spec.pages".to_string(), "author".to_string()]);
/// ```
pub fn rewrite<C>(node: &Node, check: &C) -> Result<(Node, Vec<String>), RewriteError>
where
    C: Fn(&str) -> Result<String, String>,
{
    let mut names = Vec::new();
    let rewritten = walk(node, check, &mut names)?;
    Ok((rewritten, names))
}

/// Collect the distinct identifier names of a tree, in first-encounter
/// order.
pub fn identifiers(node: &Node) -> Vec<String> {
    let mut names = Vec::new();
    collect(node, &mut names);
    names
}

fn walk<C>(node: &Node, check: &C, names: &mut Vec<String>) -> Result<Node, RewriteError>
where
    C: Fn(&str) -> Result<String, String>,
{
    match node {
        Node::Identifier(name) => {
            if !names.contains(name) {
                names.push(name.clone());
            }
            let replacement =
                check(name).map_err(|reason| RewriteError::UnknownIdentifier {
                    name: name.clone(),
                    reason,
                })?;
            parse(&replacement).map_err(|_| RewriteError::InvalidReplacement {
                name: name.clone(),
                replacement,
            })
        }
        Node::Array(elements) => {
            let rewritten = elements
                .iter()
                .map(|element| walk(element, check, names))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Node::Array(rewritten))
        }
        Node::Unary { op, operand } => Ok(Node::Unary {
            op: *op,
            operand: Box::new(walk(operand, check, names)?),
        }),
        Node::Binary { op, left, right } => Ok(Node::Binary {
            op: *op,
            left: Box::new(walk(left, check, names)?),
            right: Box::new(walk(right, check, names)?),
        }),
        leaf => Ok(leaf.clone()),
    }
}

fn collect(node: &Node, names: &mut Vec<String>) {
    match node {
        Node::Identifier(name) => {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        Node::Array(elements) => {
            for element in elements {
                collect(element, names);
            }
        }
        Node::Unary { operand, .. } => collect(operand, names),
        Node::Binary { left, right, .. } => {
            collect(left, names);
            collect(right, names);
        }
        _ => {}
    }
}
