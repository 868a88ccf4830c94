//! Grammar trait and the tree-sitter grammars used for each RSX block.
//!
//! This module defines the `Grammar` trait which abstracts over the languages embedded in an RSX
//! file, so that the analyzer can be built once and pointed at any of them.

use crate::section::SectionKind;

/// A tree-sitter language that can analyse one kind of block.
pub trait Grammar {
    /// The compiled tree-sitter language.
    fn language(&self) -> tree_sitter::Language;
    /// Human-readable language name used in error messages.
    fn name(&self) -> &'static str;
}

/// Rust, for the backend block.
pub struct RustGrammar;

impl Grammar for RustGrammar {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_rust::LANGUAGE.into()
    }

    fn name(&self) -> &'static str {
        "rust"
    }
}

/// TypeScript, for the `<script>` block.
pub struct TypeScriptGrammar;

impl Grammar for TypeScriptGrammar {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
    }

    fn name(&self) -> &'static str {
        "typescript"
    }
}

/// HTML, for the rewritten `<template>` block.
pub struct HtmlGrammar;

impl Grammar for HtmlGrammar {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_html::LANGUAGE.into()
    }

    fn name(&self) -> &'static str {
        "html"
    }
}

/// CSS, for the `<style>` block. SCSS nesting is reported as syntax diagnostics rather than
/// failing the analysis.
pub struct CssGrammar;

impl Grammar for CssGrammar {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_css::LANGUAGE.into()
    }

    fn name(&self) -> &'static str {
        "css"
    }
}

#[must_use]
/// The grammar used for `kind`.
pub fn for_section(kind: SectionKind) -> Box<dyn Grammar> {
    match kind {
        SectionKind::Backend => Box::new(RustGrammar),
        SectionKind::UiLogic => Box::new(TypeScriptGrammar),
        SectionKind::Template => Box::new(HtmlGrammar),
        SectionKind::Style => Box::new(CssGrammar),
    }
}
