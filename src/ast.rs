//! # TSL Abstract Syntax Tree
//!
//! This module defines the AST shared by every consumer of a parsed TSL
//! expression: the in-memory interpreter ([`semantics`](crate::semantics)),
//! the SQL compiler ([`sql`](crate::sql)) and the identifier walker
//! ([`ident`](crate::ident)). The AST is pure structure; all behavior
//! lives in the consumers.
//!
//! ## Organization
//!
//! - **[node]** - The [`Node`] tree itself (leaves, arrays, expressions)
//! - **[operators]** - The binary and unary operator vocabulary
//!
//! ## Shape
//!
//! A tree is built once (normally by the [`parser`](crate::parser)
//! driving the [`builder`](crate::builder)), then consumed read-only:
//!
//! ```text
//! spec.pages > 100 and author = 'Joe'
//!
//!             And
//!            /   \
//!          Gt     Eq
//!         /  \   /  \
//!   spec.pages 100  author 'Joe'
//! ```
//!
//! ## Invariants
//!
//! - A `Binary` node always has both children; a `Unary` node always has
//!   its operand.
//! - The array operand of `In`/`Between` holds only literal leaves, and
//!   a `Between` array holds exactly two: `[low, high]`.
//! - String literals are already unescaped (`''` collapsed to `'`).
//! - Each node has exactly one parent; consumers never mutate a tree,
//!   the identifier rewrite replaces whole subtrees on a fresh clone.

pub mod node;
pub mod operators;

pub use node::Node;
pub use operators::{BinaryOp, UnaryOp};
