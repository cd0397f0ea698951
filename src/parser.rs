//! Recursive descent front end for the TSL surface syntax.
//!
//! The parser never builds nodes itself: it walks the token stream and
//! drives a [`TreeBuilder`] with `push_leaf`/`reduce` events, so the
//! tree shape is owned entirely by the builder.
//!
//! Precedence, loosest to tightest: `or`, `and`, `not`, predicates
//! (comparison, `like`, `in`, `between`, `is`), `+ -`, `* / %`, unary
//! (`-`, `len`, `any`, `all`, `sum`).

use thiserror::Error;

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::builder::{BuildError, LeafKind, Reduction, TreeBuilder};
use crate::lexer::{Lexer, Token};

/// A syntax error, positioned by character offset into the input.
///
/// `context` carries the offending input with a pointer line:
///
/// ```text
/// name ~ 'joe'
///      ^
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("syntax error at position {position}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub position: usize,
    pub context: String,
}

/// Parse one TSL expression into an AST.
///
/// # Examples
///
/// ```
/// use tsl::{parse, BinaryOp, Node};
///
/// let tree = parse("spec.pages > 100")?;
/// assert_eq!(
///     tree,
///     Node::Binary {
///         op: BinaryOp::Gt,
///         left: Box::new(Node::Identifier("spec.pages".to_string())),
///         right: Box::new(Node::Number(100.0)),
///     }
/// );
/// # Ok::<(), tsl::SyntaxError>(())
/// ```
pub fn parse(input: &str) -> Result<Node, SyntaxError> {
    parse_events(input).map_err(|mut err| {
        err.context = render_context(input, err.position);
        err
    })
}

fn parse_events(input: &str) -> Result<Node, SyntaxError> {
    let mut parser = Parser::new(Lexer::new(input))?;
    parser.parse_or()?;
    parser.expect_eof()?;

    let position = parser.position();
    parser
        .builder
        .finish()
        .map_err(|err| build_error(err, position))
}

/// The input with a pointer line under the offending position.
fn render_context(input: &str, position: usize) -> String {
    let mut out = String::with_capacity(input.len() + position + 2);
    out.push_str(input);
    out.push('\n');
    for _ in 0..position {
        out.push(' ');
    }
    out.push('^');
    out
}

struct Parser {
    lexer: Lexer,
    current_token: Token,
    builder: TreeBuilder,
}

impl Parser {
    fn new(mut lexer: Lexer) -> Result<Self, SyntaxError> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
            builder: TreeBuilder::new(),
        })
    }

    fn position(&self) -> usize {
        self.lexer.token_start()
    }

    fn advance(&mut self) -> Result<(), SyntaxError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            message: message.into(),
            position: self.position(),
            context: String::new(),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), SyntaxError> {
        if self.current_token != expected {
            return Err(self.error(format!(
                "expected {expected:?}, got {:?}",
                self.current_token
            )));
        }
        self.advance()
    }

    fn expect_eof(&self) -> Result<(), SyntaxError> {
        if self.current_token != Token::Eof {
            return Err(self.error(format!(
                "unexpected {:?} after expression",
                self.current_token
            )));
        }
        Ok(())
    }

    fn push_leaf(&mut self, kind: LeafKind, raw: &str) -> Result<(), SyntaxError> {
        let position = self.position();
        self.builder
            .push_leaf(kind, raw)
            .map_err(|err| build_error(err, position))
    }

    fn reduce(&mut self, reduction: Reduction, arity: usize) -> Result<(), SyntaxError> {
        let position = self.position();
        self.builder
            .reduce(reduction, arity)
            .map_err(|err| build_error(err, position))
    }

    fn parse_or(&mut self) -> Result<(), SyntaxError> {
        self.parse_and()?;
        while self.current_token == Token::Or {
            self.advance()?;
            self.parse_and()?;
            self.reduce(Reduction::Binary(BinaryOp::Or), 2)?;
        }
        Ok(())
    }

    fn parse_and(&mut self) -> Result<(), SyntaxError> {
        self.parse_not()?;
        while self.current_token == Token::And {
            self.advance()?;
            self.parse_not()?;
            self.reduce(Reduction::Binary(BinaryOp::And), 2)?;
        }
        Ok(())
    }

    fn parse_not(&mut self) -> Result<(), SyntaxError> {
        if self.current_token == Token::Not {
            self.advance()?;
            self.parse_not()?;
            self.reduce(Reduction::Unary(UnaryOp::Not), 1)?;
            return Ok(());
        }
        self.parse_predicate()
    }

    /// A math expression optionally followed by one predicate suffix.
    /// Predicates do not chain: `a = b = c` is a syntax error.
    fn parse_predicate(&mut self) -> Result<(), SyntaxError> {
        self.parse_additive()?;

        let comparison = match &self.current_token {
            Token::Eq => Some(BinaryOp::Eq),
            Token::Ne => Some(BinaryOp::Ne),
            Token::Lt => Some(BinaryOp::Lt),
            Token::Le => Some(BinaryOp::Le),
            Token::Gt => Some(BinaryOp::Gt),
            Token::Ge => Some(BinaryOp::Ge),
            _ => None,
        };
        if let Some(op) = comparison {
            self.advance()?;
            self.parse_additive()?;
            return self.reduce(Reduction::Binary(op), 2);
        }

        match &self.current_token {
            Token::RegexEq => self.parse_pattern(BinaryOp::RegexEq, false),
            Token::RegexNe => self.parse_pattern(BinaryOp::RegexNe, false),
            Token::Like => self.parse_pattern(BinaryOp::Like, false),
            Token::ILike => self.parse_pattern(BinaryOp::ILike, false),
            Token::In => self.parse_in(false),
            Token::Between => self.parse_between(false),
            Token::Is => self.parse_is(),
            Token::Not => {
                self.advance()?;
                match &self.current_token {
                    Token::Like => self.parse_pattern(BinaryOp::Like, true),
                    Token::ILike => self.parse_pattern(BinaryOp::ILike, true),
                    Token::In => self.parse_in(true),
                    Token::Between => self.parse_between(true),
                    other => {
                        Err(self.error(format!("expected LIKE, ILIKE, IN or BETWEEN, got {other:?}")))
                    }
                }
            }
            _ => Ok(()),
        }
    }

    /// `like`/`ilike`/`~=`/`~!` with a mandatory string pattern.
    fn parse_pattern(&mut self, op: BinaryOp, negated: bool) -> Result<(), SyntaxError> {
        self.advance()?;
        match self.current_token.clone() {
            Token::Str(raw) => {
                self.advance()?;
                self.push_leaf(LeafKind::Str, &raw)?;
                let reduction = if negated {
                    Reduction::NegatedBinary(op)
                } else {
                    Reduction::Binary(op)
                };
                self.reduce(reduction, 2)
            }
            other => Err(self.error(format!("expected a string pattern, got {other:?}"))),
        }
    }

    /// `in [lit, ...]`, `in (lit, ...)`, or an array-valued expression:
    /// a bare identifier (`2 in numbers`) or a parenthesized expression
    /// (`5 in (numbers + 2)`).
    fn parse_in(&mut self, negated: bool) -> Result<(), SyntaxError> {
        self.advance()?;
        match self.current_token.clone() {
            Token::LBracket => {
                self.advance()?;
                let arity = self.parse_list(Token::RBracket)?;
                self.reduce(Reduction::Array, arity)?;
            }
            Token::LParen => {
                self.advance()?;
                let arity = self.parse_list(Token::RParen)?;
                // A single non-literal element is an array expression,
                // not a one-element list.
                let is_literal = self.builder.top().is_some_and(Node::is_literal);
                if arity != 1 || is_literal {
                    self.reduce(Reduction::Array, arity)?;
                }
            }
            Token::Identifier(name) => {
                self.advance()?;
                self.push_leaf(LeafKind::Identifier, &name)?;
            }
            other => return Err(self.error(format!("expected '(' after IN, got {other:?}"))),
        }

        let reduction = if negated {
            Reduction::NegatedBinary(BinaryOp::In)
        } else {
            Reduction::Binary(BinaryOp::In)
        };
        self.reduce(reduction, 2)
    }

    /// A comma-separated list of elements, consuming the closer.
    fn parse_list(&mut self, close: Token) -> Result<usize, SyntaxError> {
        let mut arity = 0;
        if self.current_token != close {
            self.parse_additive()?;
            arity += 1;
            while self.current_token == Token::Comma {
                self.advance()?;
                self.parse_additive()?;
                arity += 1;
            }
        }
        self.expect(close)?;
        Ok(arity)
    }

    /// `between <low> and <high>`. The two bounds are collected into an
    /// array node so `between` is an ordinary binary operator.
    fn parse_between(&mut self, negated: bool) -> Result<(), SyntaxError> {
        self.advance()?;
        self.parse_additive()?;
        self.expect(Token::And)?;
        self.parse_additive()?;
        self.reduce(Reduction::Array, 2)?;

        let reduction = if negated {
            Reduction::NegatedBinary(BinaryOp::Between)
        } else {
            Reduction::Binary(BinaryOp::Between)
        };
        self.reduce(reduction, 2)
    }

    /// `is null` / `is not null`.
    fn parse_is(&mut self) -> Result<(), SyntaxError> {
        self.advance()?;
        match self.current_token {
            Token::Null => {
                self.advance()?;
                self.reduce(Reduction::Unary(UnaryOp::IsNull), 1)
            }
            Token::Not => {
                self.advance()?;
                self.expect(Token::Null)?;
                self.reduce(Reduction::NegatedUnary(UnaryOp::IsNull), 1)
            }
            ref other => Err(self.error(format!("expected NULL after IS, got {other:?}"))),
        }
    }

    fn parse_literal(&mut self) -> Result<(), SyntaxError> {
        match self.current_token.clone() {
            Token::Number(raw) => {
                self.advance()?;
                self.push_leaf(LeafKind::Number, &raw)
            }
            Token::Str(raw) => {
                self.advance()?;
                self.push_leaf(LeafKind::Str, &raw)
            }
            Token::Date(raw) => {
                self.advance()?;
                self.push_leaf(LeafKind::Date, &raw)
            }
            Token::Timestamp(raw) => {
                self.advance()?;
                self.push_leaf(LeafKind::Timestamp, &raw)
            }
            Token::True => {
                self.advance()?;
                self.push_leaf(LeafKind::Bool, "true")
            }
            Token::False => {
                self.advance()?;
                self.push_leaf(LeafKind::Bool, "false")
            }
            Token::Null => {
                self.advance()?;
                self.push_leaf(LeafKind::Null, "null")
            }
            other => Err(self.error(format!("expected a literal, got {other:?}"))),
        }
    }

    fn parse_additive(&mut self) -> Result<(), SyntaxError> {
        self.parse_multiplicative()?;
        loop {
            let op = match self.current_token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Sub,
                _ => return Ok(()),
            };
            self.advance()?;
            self.parse_multiplicative()?;
            self.reduce(Reduction::Binary(op), 2)?;
        }
    }

    fn parse_multiplicative(&mut self) -> Result<(), SyntaxError> {
        self.parse_unary()?;
        loop {
            let op = match self.current_token {
                Token::Star => BinaryOp::Mul,
                Token::Slash => BinaryOp::Div,
                Token::Percent => BinaryOp::Mod,
                _ => return Ok(()),
            };
            self.advance()?;
            self.parse_unary()?;
            self.reduce(Reduction::Binary(op), 2)?;
        }
    }

    fn parse_unary(&mut self) -> Result<(), SyntaxError> {
        let op = match self.current_token {
            Token::Minus => {
                self.advance()?;
                // A minus directly on a number literal folds into it.
                if let Token::Number(raw) = self.current_token.clone() {
                    self.advance()?;
                    return self.push_leaf(LeafKind::Number, &format!("-{raw}"));
                }
                self.parse_unary()?;
                return self.reduce(Reduction::Unary(UnaryOp::Neg), 1);
            }
            Token::Len => UnaryOp::Len,
            Token::Any => UnaryOp::Any,
            Token::All => UnaryOp::All,
            Token::Sum => UnaryOp::Sum,
            _ => return self.parse_primary(),
        };
        self.advance()?;
        self.parse_unary()?;
        self.reduce(Reduction::Unary(op), 1)
    }

    fn parse_primary(&mut self) -> Result<(), SyntaxError> {
        match self.current_token.clone() {
            Token::Identifier(name) => {
                self.advance()?;
                self.push_leaf(LeafKind::Identifier, &name)
            }
            Token::LParen => {
                self.advance()?;
                self.parse_or()?;
                self.expect(Token::RParen)
            }
            Token::LBracket => {
                self.advance()?;
                let arity = self.parse_list(Token::RBracket)?;
                self.reduce(Reduction::Array, arity)
            }
            _ => self.parse_literal(),
        }
    }
}

fn build_error(err: BuildError, position: usize) -> SyntaxError {
    SyntaxError {
        message: err.to_string(),
        position,
        context: String::new(),
    }
}
