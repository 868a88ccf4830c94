use super::{find_placeholders, placeholder, Directive, DirectiveKind};
use crate::expression::Expression;

#[test]
fn test_placeholder_format() {
    assert_eq!(placeholder("IF_DIRECTIVE", 3), "<!-- IF_DIRECTIVE_3 -->");
}

#[test]
fn test_directive_placeholder_uses_marker_and_index() {
    let directive = Directive {
        index: 7,
        kind: DirectiveKind::Interpolation {
            expression: "name".to_string(),
            parsed: Expression::parse("name"),
        },
        start: 0,
        end: 8,
        original: "{{name}}".to_string(),
    };
    assert_eq!(directive.placeholder(), "<!-- INTERPOLATION_7 -->");
}

#[test]
fn test_find_placeholders_skips_ordinary_comments() {
    let text = "<!-- note --><p><!-- EACH_DIRECTIVE_12 --></p><!-- lower_1 --><!-- RAW_HTML_0 -->";
    let found = find_placeholders(text);

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].marker, "EACH_DIRECTIVE");
    assert_eq!(found[0].index, 12);
    assert_eq!(&text[found[0].start..found[0].end], "<!-- EACH_DIRECTIVE_12 -->");
    assert_eq!(found[1].marker, "RAW_HTML");
    assert_eq!(found[1].index, 0);
}

#[test]
fn test_find_placeholders_requires_numeric_index() {
    assert!(find_placeholders("<!-- IF_DIRECTIVE_x -->").is_empty());
    assert!(find_placeholders("<!-- IF_DIRECTIVE -->").is_empty());
}

#[test]
fn test_each_serialises_index_name_separately() {
    let directive = Directive {
        index: 0,
        kind: DirectiveKind::Each {
            iterable: "items".to_string(),
            parsed_iterable: Expression::parse("items"),
            item: "item".to_string(),
            index: Some("i".to_string()),
            body: String::new(),
            processed_body: String::new(),
        },
        start: 0,
        end: 0,
        original: String::new(),
    };
    let json = serde_json::to_value(&directive).unwrap();
    assert_eq!(json["type"], "each");
    assert_eq!(json["index"], 0);
    assert_eq!(json["index_name"], "i");
    assert_eq!(json["parsed_iterable"]["type"], "identifier");
}
