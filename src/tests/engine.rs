use super::{AnalyzerSet, Engine};
use crate::analyzer::{Analysis, AnalyzerError, SectionAnalyzer};
use crate::config::Config;
use crate::diagnostic::{ErrorKind, ParseError, Position, Severity};
use crate::section::SectionKind;
use std::cell::RefCell;
use std::rc::Rc;

const COMPONENT: &str = "---
async fn get_server_side_props(req: Request) -> Response {
    Response::json(())
}
---

<script>
interface Props { items: string[] }
const props = defineProps<Props>();
</script>

<template>
  <ul>
    {{@each props.items as item, idx}}<li>{{item}}</li>{{/each}}
  </ul>
</template>

<style>
ul { margin: 0; }
</style>
";

/// Records every text it is given and reports nothing.
struct Recorder(Rc<RefCell<Vec<String>>>);

impl SectionAnalyzer for Recorder {
    fn analyze(&mut self, text: &str) -> Result<Analysis, AnalyzerError> {
        self.0.borrow_mut().push(text.to_string());
        Ok(Analysis::default())
    }
}

struct Failing;

impl SectionAnalyzer for Failing {
    fn analyze(&mut self, _text: &str) -> Result<Analysis, AnalyzerError> {
        Err(AnalyzerError::Failed("analyzer crashed".to_string()))
    }
}

/// Reports one syntax error for any input.
struct Complaining;

impl SectionAnalyzer for Complaining {
    fn analyze(&mut self, _text: &str) -> Result<Analysis, AnalyzerError> {
        Ok(Analysis {
            tree: None,
            diagnostics: vec![ParseError::new(
                ErrorKind::SyntaxError,
                Severity::Error,
                "Syntax error",
            )],
        })
    }
}

fn quiet() -> Box<dyn SectionAnalyzer> {
    Box::new(Recorder(Rc::default()))
}

#[test]
fn test_tree_sitter_engine_parses_clean_component() {
    let mut engine = Engine::new(Config::default()).unwrap();
    let document = engine.parse(COMPONENT);

    assert_eq!(document.sections.len(), 4);
    assert!(document.sections.iter().all(|s| s.syntax_tree.is_some()));
    assert!(document.errors.is_empty(), "{:?}", document.errors);
    assert_eq!(document.directives().len(), 2);
}

#[test]
fn test_tree_sitter_reports_broken_backend() {
    let mut engine = Engine::new(Config::default()).unwrap();
    let document = engine.parse("---\nasync fn get_server_side_props( -> Response {\n---\n");

    let backend = document.section(SectionKind::Backend).unwrap();
    assert!(!backend.errors.is_empty());
    assert!(backend
        .errors
        .iter()
        .all(|e| e.section == Some(SectionKind::Backend)));
    assert!(document
        .errors
        .iter()
        .any(|e| matches!(e.kind, ErrorKind::SyntaxError | ErrorKind::MissingNode)));
}

#[test]
fn test_template_analyzer_sees_rewritten_text() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let analyzers = AnalyzerSet {
        backend: quiet(),
        ui_logic: quiet(),
        template: Box::new(Recorder(Rc::clone(&seen))),
        style: quiet(),
    };
    let mut engine = Engine::with_analyzers(Config::default(), analyzers);
    let document = engine.parse(COMPONENT);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], "<ul>\n    <!-- EACH_DIRECTIVE_1 -->\n  </ul>");
    assert_eq!(document.template().unwrap().processed_content, seen[0]);
}

#[test]
fn test_failing_analyzer_keeps_section_and_records_error() {
    let analyzers = AnalyzerSet {
        backend: quiet(),
        ui_logic: quiet(),
        template: quiet(),
        style: Box::new(Failing),
    };
    let mut engine = Engine::with_analyzers(Config::default(), analyzers);
    let document = engine.parse(COMPONENT);

    assert_eq!(document.sections.len(), 4);
    let style = document.section(SectionKind::Style).unwrap();
    assert!(style.syntax_tree.is_none());
    assert_eq!(style.content.trim(), "ul { margin: 0; }");

    let failures: Vec<&ParseError> = document
        .errors
        .iter()
        .filter(|e| e.kind == ErrorKind::StyleParseError)
        .collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].position, Some(Position::Byte(style.start)));
    assert!(failures[0].message.contains("analyzer crashed"));
}

#[test]
fn test_analyzer_diagnostics_are_tagged_with_their_section() {
    let analyzers = AnalyzerSet {
        backend: quiet(),
        ui_logic: Box::new(Complaining),
        template: quiet(),
        style: quiet(),
    };
    let mut engine = Engine::with_analyzers(Config::default(), analyzers);
    let document = engine.parse(COMPONENT);

    let ui = document.section(SectionKind::UiLogic).unwrap();
    assert_eq!(ui.errors.len(), 1);
    assert_eq!(ui.errors[0].section, Some(SectionKind::UiLogic));
    assert_eq!(document.errors, ui.errors);
}

#[test]
fn test_parse_is_deterministic() {
    let mut engine = Engine::new(Config::default()).unwrap();
    let first = serde_json::to_value(engine.parse(COMPONENT)).unwrap();
    let second = serde_json::to_value(engine.parse(COMPONENT)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_input() {
    let mut engine = Engine::with_analyzers(
        Config::default(),
        AnalyzerSet {
            backend: Box::new(Failing),
            ui_logic: Box::new(Failing),
            template: Box::new(Failing),
            style: Box::new(Failing),
        },
    );
    let document = engine.parse("");
    assert!(document.sections.is_empty());
    assert!(document.errors.is_empty());
}
