use crate::parser::SyntaxError;

/// A lexical token.
///
/// Literal tokens carry their raw source text, quotes included; literal
/// parsing (quote stripping, date parsing, float parsing) happens in the
/// [`builder`](crate::builder), which owns the leaf format.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(String),
    Str(String),
    Date(String),
    Timestamp(String),
    Identifier(String),

    // Keywords (matched case-insensitively)
    And,
    Or,
    Not,
    Like,
    ILike,
    In,
    Between,
    Is,
    Null,
    True,
    False,
    Len,
    Any,
    All,
    Sum,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    RegexEq,
    RegexNe,

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,

    Eof,
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    token_start: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            token_start: 0,
        }
    }

    /// Start position (in characters) of the most recent token.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        SyntaxError {
            message: message.into(),
            position: self.position,
            context: String::new(),
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Read a quoted string, returning the raw text with its quotes.
    /// A doubled quote of the delimiting style is an escape, not an end.
    fn read_string(&mut self, quote: char) -> Result<Token, SyntaxError> {
        let mut result = String::new();
        result.push(quote);
        self.advance();

        while let Some(ch) = self.current_char() {
            if ch == quote {
                if self.peek_char(1) == Some(quote) {
                    result.push(quote);
                    result.push(quote);
                    self.advance();
                    self.advance();
                } else {
                    result.push(quote);
                    self.advance();
                    return Ok(Token::Str(result));
                }
            } else {
                result.push(ch);
                self.advance();
            }
        }

        Err(self.error("unterminated string, missing closing quote"))
    }

    /// Whether the text at the current position starts with `YYYY-MM-DD`.
    fn at_date(&self) -> bool {
        let digit = |o: usize| self.peek_char(o).is_some_and(|c| c.is_ascii_digit());
        let dash = |o: usize| self.peek_char(o) == Some('-');
        (0..4).all(digit) && dash(4) && (5..7).all(digit) && dash(7) && (8..10).all(digit)
    }

    /// Read a bare `YYYY-MM-DD` date, greedily extended to an RFC 3339
    /// timestamp when a time part follows.
    fn read_date(&mut self) -> Token {
        let mut result = String::new();
        for _ in 0..10 {
            if let Some(ch) = self.current_char() {
                result.push(ch);
                self.advance();
            }
        }

        let has_time =
            self.current_char() == Some('T') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit());
        if !has_time {
            return Token::Date(result);
        }

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() || matches!(ch, 'T' | 'Z' | 'z' | ':' | '.' | '+' | '-') {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Token::Timestamp(result)
    }

    fn read_number(&mut self) -> Token {
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::Number(number)
    }

    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.skip_whitespace();
        self.token_start = self.position;

        let token = match self.current_char() {
            None => Token::Eof,
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some('+') => {
                self.advance();
                Token::Plus
            }
            Some('-') => {
                self.advance();
                Token::Minus
            }
            Some('*') => {
                self.advance();
                Token::Star
            }
            Some('/') => {
                self.advance();
                Token::Slash
            }
            Some('%') => {
                self.advance();
                Token::Percent
            }
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some('[') => {
                self.advance();
                Token::LBracket
            }
            Some(']') => {
                self.advance();
                Token::RBracket
            }
            Some('=') => {
                self.advance();
                Token::Eq
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::Ne
                } else {
                    return Err(self.error("unexpected '!' (did you mean '!='?)"));
                }
            }
            Some('<') => match self.peek_char(1) {
                Some('=') => {
                    self.advance();
                    self.advance();
                    Token::Le
                }
                Some('>') => {
                    self.advance();
                    self.advance();
                    Token::Ne
                }
                _ => {
                    self.advance();
                    Token::Lt
                }
            },
            Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::Ge
                } else {
                    self.advance();
                    Token::Gt
                }
            }
            Some('~') => match self.peek_char(1) {
                Some('=') => {
                    self.advance();
                    self.advance();
                    Token::RegexEq
                }
                Some('!') => {
                    self.advance();
                    self.advance();
                    Token::RegexNe
                }
                _ => return Err(self.error("unexpected '~' (did you mean '~=' or '~!'?)")),
            },
            Some(quote @ ('\'' | '"')) => return self.read_string(quote),
            Some(ch) if ch.is_ascii_digit() => {
                if self.at_date() {
                    self.read_date()
                } else {
                    self.read_number()
                }
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                match ident.to_ascii_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "like" => Token::Like,
                    "ilike" => Token::ILike,
                    "in" => Token::In,
                    "between" => Token::Between,
                    "is" => Token::Is,
                    "null" => Token::Null,
                    "true" => Token::True,
                    "false" => Token::False,
                    "len" => Token::Len,
                    "any" => Token::Any,
                    "all" => Token::All,
                    "sum" => Token::Sum,
                    _ => Token::Identifier(ident),
                }
            }
            Some(ch) => return Err(self.error(format!("unexpected character '{ch}'"))),
        };

        Ok(token)
    }
}
