//! Section representation for RSX component files.
//!
//! An RSX file is divided into up to four blocks: backend logic between `---` fences, UI logic in
//! `<script>`, markup in `<template>` and styling in `<style>`. Sections track precise byte
//! coordinates in the original file so that diagnostics and editors can map back to the source.

use crate::diagnostic::ParseError;
use crate::preprocess::PreprocessedTemplate;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
/// The four block types an RSX file can contain, in canonical order.
pub enum SectionKind {
    /// Server-side Rust code between `---` fences.
    Backend,
    /// Client-side TypeScript inside `<script>`.
    UiLogic,
    /// Markup with directives inside `<template>`.
    Template,
    /// SCSS inside `<style>`.
    Style,
}

impl SectionKind {
    /// Every kind in document order.
    pub const ALL: [Self; 4] = [Self::Backend, Self::UiLogic, Self::Template, Self::Style];

    #[must_use]
    /// Stable snake-case name used in diagnostics and statistics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Backend => "backend",
            Self::UiLogic => "ui_logic",
            Self::Template => "template",
            Self::Style => "style",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Raw block located by the extractor, before any analysis.
pub struct ExtractedSection {
    /// Inner text between the delimiters.
    pub content: String,
    /// Byte offset of the opening delimiter.
    pub start: usize,
    /// Byte offset just past the closing delimiter.
    pub end: usize,
    /// How many times this block's delimiters were matched in the file.
    pub occurrences: usize,
}

#[derive(Clone, Debug, Serialize)]
/// Analysed block of an RSX document.
pub struct Section {
    /// Which block this is.
    pub kind: SectionKind,
    /// Inner text between the delimiters.
    pub content: String,
    /// Byte offset of the opening delimiter.
    pub start: usize,
    /// Byte offset just past the closing delimiter.
    pub end: usize,
    /// Tree produced by the external analyzer, opaque to this crate.
    #[serde(skip)]
    pub syntax_tree: Option<tree_sitter::Tree>,
    /// Diagnostics reported by the external analyzer for this block.
    pub errors: Vec<ParseError>,
    /// Rewritten text and directive list, present only for the template block.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub template: Option<PreprocessedTemplate>,
}

impl Section {
    #[must_use]
    /// Creates an unanalysed section from an extracted block.
    pub fn new(kind: SectionKind, extracted: &ExtractedSection) -> Self {
        Self {
            kind,
            content: extracted.content.clone(),
            start: extracted.start,
            end: extracted.end,
            syntax_tree: None,
            errors: Vec::new(),
            template: None,
        }
    }
}
