use super::{parse_expression, BinaryOp, Expression, Literal, UnaryOp};
use rstest::rstest;

fn ident(name: &str) -> Expression {
    Expression::Identifier {
        name: name.to_string(),
    }
}

fn number(n: f64) -> Expression {
    Expression::Literal {
        value: Literal::Number(n),
    }
}

fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
    Expression::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[rstest]
#[case("count", "identifier")]
#[case("user.name", "property_access")]
#[case("format(date)", "call")]
#[case("a + b", "binary")]
#[case("!visible", "unary")]
#[case("ok ? 'yes' : 'no'", "conditional")]
#[case("'hello'", "literal")]
#[case("42", "literal")]
#[case("true", "literal")]
#[case("@@@", "unknown")]
fn test_dispatch(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(parse_expression(source).type_name(), expected);
}

#[test]
fn test_empty_is_unknown() {
    assert_eq!(
        parse_expression("   "),
        Expression::Unknown { raw: String::new() }
    );
}

#[test]
fn test_nested_ternary_splits_at_first_question_mark() {
    let expr = parse_expression("a ? b : c ? d : e");
    let Expression::Conditional {
        condition,
        consequent,
        alternate,
    } = expr
    else {
        panic!("expected conditional");
    };
    assert_eq!(*condition, ident("a"));
    assert_eq!(*consequent, ident("b"));
    assert_eq!(
        *alternate,
        Expression::Conditional {
            condition: Box::new(ident("c")),
            consequent: Box::new(ident("d")),
            alternate: Box::new(ident("e")),
        }
    );
}

#[test]
fn test_bracket_depth_keeps_nested_call_intact() {
    let expr = parse_expression("f(a, g(b, c)) > 0");
    let expected = binary(
        BinaryOp::Gt,
        Expression::Call {
            callee: Box::new(ident("f")),
            args: vec![
                ident("a"),
                Expression::Call {
                    callee: Box::new(ident("g")),
                    args: vec![ident("b"), ident("c")],
                },
            ],
        },
        number(0.0),
    );
    assert_eq!(expr, expected);
}

#[test]
fn test_same_precedence_chain_groups_to_the_right() {
    let expr = parse_expression("a - b - c");
    let expected = binary(
        BinaryOp::Sub,
        ident("a"),
        binary(BinaryOp::Sub, ident("b"), ident("c")),
    );
    assert_eq!(expr, expected);
}

#[test]
fn test_loosest_group_splits_first() {
    let expr = parse_expression("a + b * c > d && e");
    let Expression::Binary { op, left, right } = expr else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::And);
    assert_eq!(*right, ident("e"));
    assert!(matches!(*left, Expression::Binary { op: BinaryOp::Gt, .. }));
}

#[rstest]
#[case("a >= b", BinaryOp::Ge)]
#[case("a <= b", BinaryOp::Le)]
#[case("a === b", BinaryOp::StrictEq)]
#[case("a !== b", BinaryOp::StrictNe)]
#[case("a == b", BinaryOp::Eq)]
#[case("a != b", BinaryOp::Ne)]
#[case("a > b", BinaryOp::Gt)]
#[case("a || b", BinaryOp::Or)]
#[case("a % b", BinaryOp::Rem)]
fn test_multi_character_operators(#[case] source: &str, #[case] expected: BinaryOp) {
    assert_eq!(
        parse_expression(source),
        binary(expected, ident("a"), ident("b"))
    );
}

#[test]
fn test_negative_number_is_literal() {
    assert_eq!(parse_expression("-5"), number(-5.0));
}

#[test]
fn test_minus_before_identifier_is_unary() {
    assert_eq!(
        parse_expression("-offset"),
        Expression::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(ident("offset")),
        }
    );
}

#[test]
fn test_subtracting_negative_literal() {
    assert_eq!(
        parse_expression("a - -1"),
        binary(BinaryOp::Sub, ident("a"), number(-1.0))
    );
}

#[test]
fn test_operators_inside_strings_are_ignored() {
    assert_eq!(
        parse_expression("'a + b'"),
        Expression::Literal {
            value: Literal::String("a + b".to_string()),
        }
    );
}

#[test]
fn test_parenthesised_group() {
    let expr = parse_expression("(a + b) * c");
    assert_eq!(
        expr,
        binary(
            BinaryOp::Mul,
            binary(BinaryOp::Add, ident("a"), ident("b")),
            ident("c"),
        )
    );
}

#[test]
fn test_method_call_on_property() {
    let expr = parse_expression("user.profile.getName()");
    assert_eq!(
        expr,
        Expression::Call {
            callee: Box::new(Expression::PropertyAccess {
                object: Box::new(Expression::PropertyAccess {
                    object: Box::new(ident("user")),
                    property: "profile".to_string(),
                }),
                property: "getName".to_string(),
            }),
            args: Vec::new(),
        }
    );
}

#[test]
fn test_decimal_is_not_property_access() {
    assert_eq!(parse_expression("2.5"), number(2.5));
}

#[test]
fn test_display_round_trips_normalised_source() {
    let expr = parse_expression("items.length>0?format( items[0] ):'none'");
    assert_eq!(
        expr.to_string(),
        "items.length > 0 ? format(items[0]) : \"none\""
    );
}
