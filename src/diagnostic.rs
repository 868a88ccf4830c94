//! Diagnostics produced while parsing and validating an RSX document.
//!
//! Diagnostics come from three places: structural rules checked by the validator, syntax
//! diagnostics delegated from the per-section analyzers, and synthetic entries recorded when an
//! analyzer fails outright. All of them share the [`ParseError`] shape.

use crate::section::SectionKind;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
/// How serious a diagnostic is.
pub enum Severity {
    /// The document is malformed.
    Error,
    /// Likely mistake; the document is still usable.
    Warning,
    /// Suggestion only.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
/// Machine-readable diagnostic category.
pub enum ErrorKind {
    /// A section's delimiters occur more than once.
    DuplicateSection,
    /// A `<template>`, `<script>` or `<style>` tag inside the template.
    ForbiddenTag,
    /// An inline `on*` handler on a standard HTML tag.
    ForbiddenEventAttribute,
    /// The backend block lacks the entry function.
    MissingServerProps,
    /// The entry function exists but has the wrong shape.
    InvalidFunctionSignature,
    /// The UI-logic block never declares its props.
    MissingDefineProps,
    /// An `interface` block without any field.
    EmptyInterface,
    /// Style block with unequal `{` and `}` counts.
    UnmatchedBraces,
    /// `if` or `else if` directive with a blank condition.
    EmptyCondition,
    /// `each` directive without an iterable or item name.
    InvalidEachDirective,
    /// Embedded component naming an unsupported runtime.
    InvalidTargetRuntime,
    /// ERROR node reported by an analyzer.
    SyntaxError,
    /// MISSING node reported by an analyzer.
    MissingNode,
    /// The backend analyzer failed.
    BackendParseError,
    /// The UI-logic analyzer failed.
    UiLogicParseError,
    /// The template analyzer failed.
    TemplateParseError,
    /// The style analyzer failed.
    StyleParseError,
}

impl ErrorKind {
    #[must_use]
    /// The synthetic kind recorded when the analyzer for `section` fails.
    pub fn analyzer_failure(section: SectionKind) -> Self {
        match section {
            SectionKind::Backend => Self::BackendParseError,
            SectionKind::UiLogic => Self::UiLogicParseError,
            SectionKind::Template => Self::TemplateParseError,
            SectionKind::Style => Self::StyleParseError,
        }
    }

    #[must_use]
    /// Stable snake-case name, identical to the serialised form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateSection => "duplicate_section",
            Self::ForbiddenTag => "forbidden_tag",
            Self::ForbiddenEventAttribute => "forbidden_event_attribute",
            Self::MissingServerProps => "missing_server_props",
            Self::InvalidFunctionSignature => "invalid_function_signature",
            Self::MissingDefineProps => "missing_define_props",
            Self::EmptyInterface => "empty_interface",
            Self::UnmatchedBraces => "unmatched_braces",
            Self::EmptyCondition => "empty_condition",
            Self::InvalidEachDirective => "invalid_each_directive",
            Self::InvalidTargetRuntime => "invalid_target_runtime",
            Self::SyntaxError => "syntax_error",
            Self::MissingNode => "missing_node",
            Self::BackendParseError => "backend_parse_error",
            Self::UiLogicParseError => "ui_logic_parse_error",
            Self::TemplateParseError => "template_parse_error",
            Self::StyleParseError => "style_parse_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
/// Zero-based row and column within a section's text.
pub struct Point {
    /// Line number, starting at 0.
    pub row: usize,
    /// Byte column within the line, starting at 0.
    pub column: usize,
}

impl From<tree_sitter::Point> for Point {
    fn from(point: tree_sitter::Point) -> Self {
        Self {
            row: point.row,
            column: point.column,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Where a diagnostic applies.
pub enum Position {
    /// A byte offset into the whole document.
    Byte(usize),
    /// A row/column range within a section.
    Span {
        /// Inclusive start.
        start: Point,
        /// Exclusive end.
        end: Point,
    },
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Byte(offset) => write!(f, "Byte {offset}"),
            Self::Span { start, .. } => {
                write!(f, "Line {}, Column {}", start.row + 1, start.column + 1)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// A single diagnostic.
pub struct ParseError {
    /// Category of the problem.
    pub kind: ErrorKind,
    /// Human-readable explanation.
    pub message: String,
    /// Location, when one is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Seriousness.
    pub severity: Severity,
    /// Section the diagnostic belongs to, when it is section-specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionKind>,
}

impl ParseError {
    /// Creates a diagnostic without position or section.
    pub fn new(kind: ErrorKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: None,
            severity,
            section: None,
        }
    }

    #[must_use]
    /// Attaches the section this diagnostic is about.
    pub fn in_section(mut self, section: SectionKind) -> Self {
        self.section = Some(section);
        self
    }

    #[must_use]
    /// Attaches a location.
    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}
