use pretty_assertions::assert_eq;
use tsl::lexer::{Lexer, Token};

fn tokens(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut out = vec![];
    loop {
        let token = lexer.next_token().expect("lexing failed");
        if token == Token::Eof {
            return out;
        }
        out.push(token);
    }
}

// ============================================================================
// Operators and delimiters
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("+", Token::Plus),
        ("-", Token::Minus),
        ("*", Token::Star),
        ("/", Token::Slash),
        ("%", Token::Percent),
        ("(", Token::LParen),
        (")", Token::RParen),
        ("[", Token::LBracket),
        ("]", Token::RBracket),
        (",", Token::Comma),
        ("=", Token::Eq),
        ("<", Token::Lt),
        (">", Token::Gt),
    ];

    for (input, expected) in test_cases {
        assert_eq!(tokens(input), vec![expected], "input: {input}");
    }
}

#[test]
fn test_two_char_operators() {
    let test_cases = vec![
        ("!=", Token::Ne),
        ("<>", Token::Ne),
        ("<=", Token::Le),
        (">=", Token::Ge),
        ("~=", Token::RegexEq),
        ("~!", Token::RegexNe),
    ];

    for (input, expected) in test_cases {
        assert_eq!(tokens(input), vec![expected], "input: {input}");
    }
}

// ============================================================================
// Keywords
// ============================================================================

#[test]
fn test_keywords() {
    assert_eq!(
        tokens("and or not like ilike in between is null true false len any all sum"),
        vec![
            Token::And,
            Token::Or,
            Token::Not,
            Token::Like,
            Token::ILike,
            Token::In,
            Token::Between,
            Token::Is,
            Token::Null,
            Token::True,
            Token::False,
            Token::Len,
            Token::Any,
            Token::All,
            Token::Sum,
        ]
    );
}

#[test]
fn test_keywords_are_case_insensitive() {
    assert_eq!(
        tokens("AND Or NOT Between TRUE"),
        vec![
            Token::And,
            Token::Or,
            Token::Not,
            Token::Between,
            Token::True
        ]
    );
}

#[test]
fn test_keyword_prefix_is_an_identifier() {
    assert_eq!(
        tokens("android inbox"),
        vec![
            Token::Identifier("android".to_string()),
            Token::Identifier("inbox".to_string())
        ]
    );
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numbers() {
    assert_eq!(
        tokens("0 42 3.14"),
        vec![
            Token::Number("0".to_string()),
            Token::Number("42".to_string()),
            Token::Number("3.14".to_string())
        ]
    );
}

#[test]
fn test_strings_keep_raw_quotes() {
    assert_eq!(
        tokens("'joe' \"rome\" 'it''s'"),
        vec![
            Token::Str("'joe'".to_string()),
            Token::Str("\"rome\"".to_string()),
            Token::Str("'it''s'".to_string())
        ]
    );
}

#[test]
fn test_bare_date() {
    assert_eq!(
        tokens("date = 2020-01-01"),
        vec![
            Token::Identifier("date".to_string()),
            Token::Eq,
            Token::Date("2020-01-01".to_string())
        ]
    );
}

#[test]
fn test_bare_timestamp() {
    assert_eq!(
        tokens("2020-01-01T00:00:01Z"),
        vec![Token::Timestamp("2020-01-01T00:00:01Z".to_string())]
    );
}

#[test]
fn test_short_number_minus_is_subtraction() {
    assert_eq!(
        tokens("20-1"),
        vec![
            Token::Number("20".to_string()),
            Token::Minus,
            Token::Number("1".to_string())
        ]
    );
}

#[test]
fn test_dotted_identifiers() {
    assert_eq!(
        tokens("spec.pages spec.rating"),
        vec![
            Token::Identifier("spec.pages".to_string()),
            Token::Identifier("spec.rating".to_string())
        ]
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unterminated_string() {
    let mut lexer = Lexer::new("name = 'joe");
    assert!(lexer.next_token().is_ok());
    assert!(lexer.next_token().is_ok());
    assert!(lexer.next_token().is_err());
}

#[test]
fn test_unexpected_character() {
    let mut lexer = Lexer::new("#");
    let err = lexer.next_token().unwrap_err();
    assert_eq!(err.position, 0);
}

#[test]
fn test_error_position_points_at_offender() {
    let mut lexer = Lexer::new("abc !");
    assert!(lexer.next_token().is_ok());
    let err = lexer.next_token().unwrap_err();
    assert_eq!(err.position, 4);
}
