use super::component::parse_attributes;
use super::{parse_loop_header, preprocess, PreprocessedTemplate};
use crate::config::Config;
use crate::directive::{AttributeValue, BranchKind, DirectiveKind};
use crate::expression::Expression;

fn run(template: &str) -> PreprocessedTemplate {
    preprocess(template, &Config::default())
}

fn markers(template: &PreprocessedTemplate) -> Vec<&'static str> {
    template
        .directives
        .iter()
        .map(|directive| directive.kind.marker())
        .collect()
}

#[test]
fn test_interpolation() {
    let result = run("<p>Hello {{ user.name }}!</p>");

    assert_eq!(result.processed_content, "<p>Hello <!-- INTERPOLATION_0 -->!</p>");
    let DirectiveKind::Interpolation { expression, parsed } = &result.directives[0].kind else {
        panic!("expected interpolation");
    };
    assert_eq!(expression, "user.name");
    assert_eq!(parsed.type_name(), "property_access");
    assert_eq!(result.directives[0].original, "{{ user.name }}");
    assert_eq!(result.directives[0].start, 9);
}

#[test]
fn test_empty_interpolation_is_left_alone() {
    let result = run("<p>{{ }}</p>");
    assert!(result.directives.is_empty());
    assert_eq!(result.processed_content, "<p>{{ }}</p>");
}

#[test]
fn test_each_with_index_and_nested_interpolation() {
    let result = run("{{@each items as item, idx}}<li>{{item}}</li>{{/each}}");

    assert_eq!(markers(&result), ["INTERPOLATION", "EACH_DIRECTIVE"]);
    assert_eq!(result.processed_content, "<!-- EACH_DIRECTIVE_1 -->");

    let DirectiveKind::Each {
        iterable,
        item,
        index,
        body,
        processed_body,
        ..
    } = &result.directives[1].kind
    else {
        panic!("expected each");
    };
    assert_eq!(iterable, "items");
    assert_eq!(item, "item");
    assert_eq!(index.as_deref(), Some("idx"));
    assert_eq!(body, "<li>{{item}}</li>");
    assert_eq!(processed_body, "<li><!-- INTERPOLATION_0 --></li>");
}

#[test]
fn test_nested_if_lands_in_outer_processed_body() {
    let result = run("{{@if a}}<p>{{@if b}}x{{/if}}</p>{{/if}}");

    assert_eq!(markers(&result), ["IF_DIRECTIVE", "IF_DIRECTIVE"]);
    assert_eq!(result.processed_content, "<!-- IF_DIRECTIVE_1 -->");

    let DirectiveKind::If {
        condition,
        branches,
        ..
    } = &result.directives[1].kind
    else {
        panic!("expected if");
    };
    assert_eq!(condition, "a");
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0].processed_body, "<p><!-- IF_DIRECTIVE_0 --></p>");
    assert!(!result.processed_content.contains("IF_DIRECTIVE_0"));
}

#[test]
fn test_else_if_chain() {
    let result = run("{{@if a}} A {{:else if b}} B {{:elseif c}} C {{:else}} D {{/if}}");

    let DirectiveKind::If { branches, .. } = &result.directives[0].kind else {
        panic!("expected if");
    };
    let bodies: Vec<&str> = branches.iter().map(|b| b.body.as_str()).collect();
    assert_eq!(bodies, ["A", "B", "C", "D"]);
    assert_eq!(branches[0].kind, BranchKind::Primary);
    assert!(matches!(
        &branches[1].kind,
        BranchKind::ElseIf { condition, .. } if condition == "b"
    ));
    assert!(matches!(
        &branches[2].kind,
        BranchKind::ElseIf { condition, .. } if condition == "c"
    ));
    assert_eq!(branches[3].kind, BranchKind::Else);
}

#[test]
fn test_else_markers_attach_to_innermost_if() {
    let result = run("{{@if a}}{{@if b}}x{{:else}}y{{/if}}{{/if}}");

    let DirectiveKind::If { branches, .. } = &result.directives[1].kind else {
        panic!("expected outer if");
    };
    assert_eq!(branches.len(), 1);

    let DirectiveKind::If { branches, .. } = &result.directives[0].kind else {
        panic!("expected inner if");
    };
    assert_eq!(branches.len(), 2);
}

#[test]
fn test_blank_if_condition_is_still_extracted() {
    let result = run("{{@if }}x{{/if}}");
    let DirectiveKind::If {
        condition,
        parsed_condition,
        ..
    } = &result.directives[0].kind
    else {
        panic!("expected if");
    };
    assert!(condition.is_empty());
    assert_eq!(*parsed_condition, Expression::Unknown { raw: String::new() });
}

#[test]
fn test_unclosed_if_is_left_as_text() {
    let result = run("{{@if a}}<p>open</p>");
    assert!(result.directives.is_empty());
    assert_eq!(result.processed_content, "{{@if a}}<p>open</p>");
}

#[test]
fn test_stray_close_is_ignored() {
    let result = run("{{/if}}{{@if a}}x{{/if}}");
    assert_eq!(result.directives.len(), 1);
    assert_eq!(result.processed_content, "{{/if}}<!-- IF_DIRECTIVE_0 -->");
}

#[test]
fn test_nested_loops_extract_innermost_first() {
    let result =
        run("{{@each rows as row}}<tr>{{@each row.cells as cell}}<td>{{cell}}</td>{{/each}}</tr>{{/each}}");

    assert_eq!(
        markers(&result),
        ["INTERPOLATION", "EACH_DIRECTIVE", "EACH_DIRECTIVE"]
    );
    let DirectiveKind::Each {
        iterable,
        processed_body,
        ..
    } = &result.directives[2].kind
    else {
        panic!("expected outer each");
    };
    assert_eq!(iterable, "rows");
    assert_eq!(processed_body, "<tr><!-- EACH_DIRECTIVE_1 --></tr>");
}

#[test]
fn test_iteration_cap_leaves_outer_loop_raw() {
    let config = Config {
        max_preprocess_iterations: 1,
        ..Config::default()
    };
    let result = preprocess(
        "{{@each rows as row}}{{@each row as cell}}x{{/each}}{{/each}}",
        &config,
    );

    assert_eq!(markers(&result), ["EACH_DIRECTIVE"]);
    assert_eq!(
        result.processed_content,
        "{{@each rows as row}}<!-- EACH_DIRECTIVE_0 -->{{/each}}"
    );
}

#[test]
fn test_loop_header_without_binding() {
    assert_eq!(
        parse_loop_header(" items "),
        ("items".to_string(), String::new(), None)
    );
    assert_eq!(
        parse_loop_header("user.posts as post ,  i"),
        ("user.posts".to_string(), "post".to_string(), Some("i".to_string()))
    );
    assert_eq!(
        parse_loop_header("aliases as alias"),
        ("aliases".to_string(), "alias".to_string(), None)
    );
}

#[test]
fn test_raw_markup() {
    let result = run("<div>{{@html post.body}}</div>");

    assert_eq!(result.processed_content, "<div><!-- RAW_HTML_0 --></div>");
    let DirectiveKind::RawMarkup { content, .. } = &result.directives[0].kind else {
        panic!("expected raw markup");
    };
    assert_eq!(content, "post.body");
}

#[test]
fn test_self_closing_component() {
    let result = run(r#"<Counter client="react" label="{{ title }}" disabled />"#);

    assert_eq!(markers(&result), ["INTERPOLATION", "CLIENT_COMPONENT"]);
    assert_eq!(result.processed_content, "<!-- CLIENT_COMPONENT_1 -->");
    let DirectiveKind::EmbeddedComponent {
        tag,
        target_runtime,
        attributes,
        children,
    } = &result.directives[1].kind
    else {
        panic!("expected component");
    };
    assert_eq!(tag, "Counter");
    assert_eq!(target_runtime, "react");
    assert!(children.is_empty());
    assert_eq!(
        attributes.get("label"),
        Some(&AttributeValue::Text("<!-- INTERPOLATION_0 -->".to_string()))
    );
    assert_eq!(attributes.get("disabled"), Some(&AttributeValue::Flag(true)));
}

#[test]
fn test_component_with_children() {
    let result = run("<section><Chart client=\"vue\">\n  {{ data }}\n</Chart></section>");

    assert_eq!(
        result.processed_content,
        "<section><!-- CLIENT_COMPONENT_1 --></section>"
    );
    let DirectiveKind::EmbeddedComponent { children, .. } = &result.directives[1].kind else {
        panic!("expected component");
    };
    assert_eq!(children, "<!-- INTERPOLATION_0 -->");
}

#[test]
fn test_tags_without_runtime_are_plain_markup() {
    let template = r#"<Widget size="2" /><div client="react"></div><Empty client="" />"#;
    let result = run(template);
    assert!(result.directives.is_empty());
    assert_eq!(result.processed_content, template);
}

#[test]
fn test_custom_runtime_attribute() {
    let config = Config {
        runtime_attribute: "runtime".to_string(),
        ..Config::default()
    };
    let result = preprocess(r#"<Map runtime="svelte" /><Map client="react" />"#, &config);
    assert_eq!(result.directives.len(), 1);
    assert_eq!(
        result.processed_content,
        r#"<!-- CLIENT_COMPONENT_0 --><Map client="react" />"#
    );
}

#[test]
fn test_parse_attributes() {
    let attributes = parse_attributes(r#" a="1" b='two words' c=3 d e = "" "#);

    assert_eq!(attributes.get("a"), Some(&AttributeValue::Text("1".to_string())));
    assert_eq!(
        attributes.get("b"),
        Some(&AttributeValue::Text("two words".to_string()))
    );
    assert_eq!(attributes.get("c"), Some(&AttributeValue::Text("3".to_string())));
    assert_eq!(attributes.get("d"), Some(&AttributeValue::Flag(true)));
    assert_eq!(attributes.get("e"), Some(&AttributeValue::Text(String::new())));
}

#[test]
fn test_every_placeholder_resolves() {
    let result = run(concat!(
        "<ul>{{@each items as item}}<li>{{@if item.done}}<s>{{item.title}}</s>",
        "{{:else}}{{@html item.title}}{{/if}}</li>{{/each}}</ul>",
        "<Badge client=\"react\">{{ count }}</Badge>",
    ));

    let placeholders = result.placeholders();
    assert_eq!(placeholders.len(), result.directives.len());
    for reference in &placeholders {
        let directive = result.resolve(reference).expect("placeholder resolves");
        assert_eq!(directive.index, reference.index);
    }
}
