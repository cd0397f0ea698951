use pretty_assertions::assert_eq;
use tsl::{parse, BinaryOp, Node, UnaryOp};

fn ident(name: &str) -> Box<Node> {
    Box::new(Node::Identifier(name.to_string()))
}

fn number(n: f64) -> Box<Node> {
    Box::new(Node::Number(n))
}

fn binary(op: BinaryOp, left: Box<Node>, right: Box<Node>) -> Box<Node> {
    Box::new(Node::Binary { op, left, right })
}

// ============================================================================
// Shapes
// ============================================================================

#[test]
fn test_simple_comparison() {
    assert_eq!(
        parse("spec.pages > 100").unwrap(),
        *binary(BinaryOp::Gt, ident("spec.pages"), number(100.0))
    );
}

#[test]
fn test_string_comparison_unescapes_quotes() {
    assert_eq!(
        parse("title = 'it''s a book'").unwrap(),
        *binary(
            BinaryOp::Eq,
            ident("title"),
            Box::new(Node::Str("it's a book".to_string()))
        )
    );
}

#[test]
fn test_in_list_keeps_source_order() {
    assert_eq!(
        parse("city in ('paris', 'rome', 'milan')").unwrap(),
        *binary(
            BinaryOp::In,
            ident("city"),
            Box::new(Node::Array(vec![
                Node::Str("paris".to_string()),
                Node::Str("rome".to_string()),
                Node::Str("milan".to_string()),
            ]))
        )
    );
}

#[test]
fn test_between_bounds_in_source_order() {
    assert_eq!(
        parse("price between 20 and 30").unwrap(),
        *binary(
            BinaryOp::Between,
            ident("price"),
            Box::new(Node::Array(vec![Node::Number(20.0), Node::Number(30.0)]))
        )
    );
}

#[test]
fn test_in_over_bare_identifier() {
    assert_eq!(
        parse("2 in numbers").unwrap(),
        *binary(BinaryOp::In, number(2.0), ident("numbers"))
    );
}

#[test]
fn test_in_over_array_expression() {
    assert_eq!(
        parse("5 in (numbers + 2)").unwrap(),
        *binary(
            BinaryOp::In,
            number(5.0),
            binary(BinaryOp::Add, ident("numbers"), number(2.0))
        )
    );
}

#[test]
fn test_in_single_literal_is_a_one_element_list() {
    assert_eq!(
        parse("x in (5)").unwrap(),
        *binary(
            BinaryOp::In,
            ident("x"),
            Box::new(Node::Array(vec![Node::Number(5.0)]))
        )
    );
}

#[test]
fn test_is_null_and_is_not_null() {
    assert_eq!(
        parse("city is null").unwrap(),
        Node::Unary {
            op: UnaryOp::IsNull,
            operand: ident("city"),
        }
    );
    assert_eq!(
        parse("city is not null").unwrap(),
        Node::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Node::Unary {
                op: UnaryOp::IsNull,
                operand: ident("city"),
            }),
        }
    );
}

#[test]
fn test_negated_forms_wrap_in_not() {
    for input in ["name not like 'j%'", "city not in ('rome')", "x not between 1 and 2"] {
        let tree = parse(input).unwrap();
        assert!(
            matches!(
                tree,
                Node::Unary {
                    op: UnaryOp::Not,
                    ..
                }
            ),
            "input: {input}"
        );
    }
}

#[test]
fn test_negative_number_folds_into_literal() {
    assert_eq!(
        parse("x = -5").unwrap(),
        *binary(BinaryOp::Eq, ident("x"), number(-5.0))
    );
}

#[test]
fn test_unary_minus_on_identifier() {
    assert_eq!(
        parse("-x < 0").unwrap(),
        *binary(
            BinaryOp::Lt,
            Box::new(Node::Unary {
                op: UnaryOp::Neg,
                operand: ident("x"),
            }),
            number(0.0)
        )
    );
}

#[test]
fn test_array_literal_in_expression_position() {
    assert_eq!(
        parse("[1, 2, 3] + 4").unwrap(),
        *binary(
            BinaryOp::Add,
            Box::new(Node::Array(vec![
                Node::Number(1.0),
                Node::Number(2.0),
                Node::Number(3.0),
            ])),
            number(4.0)
        )
    );
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_and_binds_tighter_than_or() {
    let tree = parse("a = 1 or b = 2 and c = 3").unwrap();
    let Node::Binary { op, left, right } = tree else {
        panic!("expected a binary root");
    };
    assert_eq!(op, BinaryOp::Or);
    assert!(matches!(
        *left,
        Node::Binary {
            op: BinaryOp::Eq,
            ..
        }
    ));
    assert!(matches!(
        *right,
        Node::Binary {
            op: BinaryOp::And,
            ..
        }
    ));
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    assert_eq!(
        parse("a + b * c = 0").unwrap(),
        *binary(
            BinaryOp::Eq,
            binary(
                BinaryOp::Add,
                ident("a"),
                binary(BinaryOp::Mul, ident("b"), ident("c"))
            ),
            number(0.0)
        )
    );
}

#[test]
fn test_parentheses_override_precedence() {
    assert_eq!(
        parse("(a + b) * c = 0").unwrap(),
        *binary(
            BinaryOp::Eq,
            binary(
                BinaryOp::Mul,
                binary(BinaryOp::Add, ident("a"), ident("b")),
                ident("c")
            ),
            number(0.0)
        )
    );
}

#[test]
fn test_not_applies_to_the_nearest_predicate() {
    let tree = parse("not a = 1 and b = 2").unwrap();
    let Node::Binary { op, left, .. } = tree else {
        panic!("expected a binary root");
    };
    assert_eq!(op, BinaryOp::And);
    assert!(matches!(
        *left,
        Node::Unary {
            op: UnaryOp::Not,
            ..
        }
    ));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_syntax_errors() {
    let bad_inputs = vec![
        "",
        "a =",
        "a = 1 b",
        "a like 5",
        "a in",
        "a between 1",
        "a is",
        "a = 1 and",
        "(a = 1",
        "a = 'oops",
        "a not 1",
    ];

    for input in bad_inputs {
        assert!(parse(input).is_err(), "input should not parse: {input}");
    }
}

#[test]
fn test_chained_comparison_is_rejected() {
    assert!(parse("a = b = c").is_err());
}

#[test]
fn test_error_carries_position() {
    let err = parse("a = 1 b").unwrap_err();
    assert_eq!(err.position, 6);
}

#[test]
fn test_error_context_points_into_the_source() {
    let err = parse("a = 1 b").unwrap_err();
    assert_eq!(err.context, "a = 1 b\n      ^");
}
