//! TSL, a SQL-WHERE-like tree search language.
//!
//! A filter like `spec.pages > 100 and author = 'Joe'` parses into one
//! AST that two consumers share: an in-memory interpreter that tests a
//! record, and a SQL compiler that produces a parameterized `WHERE`
//! fragment.
//!
//! ```
//! use tsl::{compile, evaluate, parse, Value};
//!
//! let tree = parse("author = 'Joe' and spec.pages > 100")?;
//!
//! // In-memory evaluation against a record.
//! let doc = serde_json::json!({"author": "Joe", "spec": {"pages": 150}});
//! let resolve = tsl::resolver(&doc);
//! assert_eq!(evaluate(&tree, &resolve), Ok(Value::Bool(true)));
//!
//! // Or the same predicate as SQL.
//! let fragment = compile(&tree).unwrap();
//! assert_eq!(fragment.sql, "(author = ? AND spec.pages > ?)");
//! # Ok::<(), tsl::SyntaxError>(())
//! ```

pub mod ast;
pub mod builder;
pub mod ident;
pub mod lexer;
pub mod parser;
pub mod semantics;
pub mod sql;
pub mod value;

pub use ast::{BinaryOp, Node, UnaryOp};
pub use builder::{BuildError, LeafKind, Reduction, TreeBuilder};
pub use ident::{identifiers, rewrite, RewriteError};
pub use lexer::{Lexer, Token};
pub use parser::{parse, SyntaxError};
pub use semantics::{evaluate, EvalError};
pub use sql::{compile, compile_with, CompileError, PlaceholderStyle, SqlFragment};
pub use value::{resolver, Value};
