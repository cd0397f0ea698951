use pretty_assertions::assert_eq;
use tsl::{compile, evaluate, parse, resolver, rewrite, Value};

// ============================================================================
// Full pipeline over a JSON document
// ============================================================================

#[test]
fn test_filter_a_json_document() {
    let doc = serde_json::json!({
        "title": "A good book",
        "author": "Joe",
        "spec": {"pages": 14, "rating": 5},
        "tags": ["fiction", "bestseller"],
        "loaned": true,
    });
    let resolve = resolver(&doc);

    let accepted = vec![
        "author = 'Joe'",
        "spec.pages < 100 and spec.rating = 5",
        "title like '%good%'",
        "any (tags = 'fiction')",
        "loaned and len tags = 2",
        "missing is null",
    ];
    for input in accepted {
        let tree = parse(input).unwrap();
        assert_eq!(
            evaluate(&tree, &resolve),
            Ok(Value::Bool(true)),
            "input: {input}"
        );
    }

    let rejected = vec![
        "author = 'Jane'",
        "spec.pages > 100",
        "all (tags like '%fic%')",
    ];
    for input in rejected {
        let tree = parse(input).unwrap();
        assert_eq!(
            evaluate(&tree, &resolve),
            Ok(Value::Bool(false)),
            "input: {input}"
        );
    }
}

#[test]
fn test_dates_resolved_from_json_strings() {
    let doc = serde_json::json!({"created_at": "2023-06-01T10:00:00Z"});
    let resolve = resolver(&doc);

    let tree = parse("created_at > 2023-01-01 and created_at < 2024-01-01").unwrap();
    assert_eq!(evaluate(&tree, &resolve), Ok(Value::Bool(true)));
}

#[test]
fn test_rewrite_then_evaluate() {
    let doc = serde_json::json!({"pages": 150, "author": "Joe"});
    let resolve = resolver(&doc);

    let tree = parse("spec.pages > 100 and author = 'Joe'").unwrap();
    let map = |name: &str| match name {
        "spec.pages" => Ok("pages".to_string()),
        "author" => Ok("author".to_string()),
        other => Err(format!("no such column: {other}")),
    };
    let (rewritten, _) = rewrite(&tree, &map).unwrap();

    assert_eq!(evaluate(&rewritten, &resolve), Ok(Value::Bool(true)));
}

// ============================================================================
// SQL round trip
// ============================================================================

// Compiling `field = <literal>` emits one placeholder and one argument;
// a record holding exactly that argument value must satisfy the same
// predicate in memory.
#[test]
fn test_sql_arguments_agree_with_direct_interpretation() {
    let cases = vec![
        ("x = 5", "x"),
        ("x = 'joe'", "x"),
        ("price = 29.99", "price"),
        ("name = 'it''s'", "name"),
    ];

    for (input, field) in cases {
        let tree = parse(input).unwrap();
        let fragment = compile(&tree).unwrap();
        assert_eq!(fragment.args.len(), 1, "input: {input}");

        let bound = fragment.args[0].clone();
        let resolve = |name: &str| {
            if name == field {
                Some(bound.clone())
            } else {
                None
            }
        };
        assert_eq!(
            evaluate(&tree, &resolve),
            Ok(Value::Bool(true)),
            "input: {input}"
        );
    }
}

#[test]
fn test_argument_order_matches_placeholder_order() {
    let tree =
        parse("a = 1 and (b between 2 and 3 or c in (4, 5)) and d like '6%'").unwrap();
    let fragment = compile(&tree).unwrap();

    assert_eq!(
        fragment.sql,
        "((a = ? AND (b BETWEEN ? AND ? OR c IN (?, ?))) AND d LIKE ?)"
    );
    assert_eq!(
        fragment.args,
        vec![
            Value::Number(1.0),
            Value::Number(2.0),
            Value::Number(3.0),
            Value::Number(4.0),
            Value::Number(5.0),
            Value::Str("6%".to_string()),
        ]
    );
}
