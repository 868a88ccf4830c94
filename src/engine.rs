//! The parsing engine: extraction, preprocessing, per-block analysis and validation in one call.

use crate::analyzer::{AnalyzerError, SectionAnalyzer, TreeSitterAnalyzer};
use crate::config::Config;
use crate::diagnostic::{ErrorKind, ParseError, Position, Severity};
use crate::document::Document;
use crate::extract::extract;
use crate::grammars;
use crate::preprocess::preprocess;
use crate::section::{Section, SectionKind};
use crate::validate::validate;

/// One analyzer per block kind.
pub struct AnalyzerSet {
    /// Analyzer for the backend block.
    pub backend: Box<dyn SectionAnalyzer>,
    /// Analyzer for the `<script>` block.
    pub ui_logic: Box<dyn SectionAnalyzer>,
    /// Analyzer for the rewritten template.
    pub template: Box<dyn SectionAnalyzer>,
    /// Analyzer for the `<style>` block.
    pub style: Box<dyn SectionAnalyzer>,
}

impl AnalyzerSet {
    /// Tree-sitter analyzers for Rust, TypeScript, HTML and CSS.
    ///
    /// # Errors
    ///
    /// Fails if any grammar cannot be loaded.
    pub fn tree_sitter() -> Result<Self, AnalyzerError> {
        let build = |kind| -> Result<Box<dyn SectionAnalyzer>, AnalyzerError> {
            Ok(Box::new(TreeSitterAnalyzer::new(
                grammars::for_section(kind).as_ref(),
            )?))
        };
        Ok(Self {
            backend: build(SectionKind::Backend)?,
            ui_logic: build(SectionKind::UiLogic)?,
            template: build(SectionKind::Template)?,
            style: build(SectionKind::Style)?,
        })
    }

    fn get_mut(&mut self, kind: SectionKind) -> &mut dyn SectionAnalyzer {
        match kind {
            SectionKind::Backend => self.backend.as_mut(),
            SectionKind::UiLogic => self.ui_logic.as_mut(),
            SectionKind::Template => self.template.as_mut(),
            SectionKind::Style => self.style.as_mut(),
        }
    }
}

/// Parser for RSX documents.
///
/// The engine owns stateful analyzers, so concurrent callers each need their own engine.
pub struct Engine {
    config: Config,
    analyzers: AnalyzerSet,
}

impl Engine {
    /// Creates an engine with the tree-sitter analyzers.
    ///
    /// # Errors
    ///
    /// Fails if any grammar cannot be loaded.
    pub fn new(config: Config) -> Result<Self, AnalyzerError> {
        Ok(Self::with_analyzers(config, AnalyzerSet::tree_sitter()?))
    }

    #[must_use]
    /// Creates an engine with caller-supplied analyzers.
    pub fn with_analyzers(config: Config, analyzers: AnalyzerSet) -> Self {
        Self { config, analyzers }
    }

    #[must_use]
    /// The configuration this engine validates against.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse `text` into a [`Document`].
    ///
    /// This always returns a document. A block whose analyzer fails is kept without a syntax tree
    /// and a `{kind}_parse_error` entry is added to the document's errors.
    pub fn parse(&mut self, text: &str) -> Document {
        let extraction = extract(text);
        let mut sections = Vec::new();
        let mut errors = Vec::new();

        for (kind, extracted) in extraction.present() {
            let mut section = Section::new(kind, extracted);

            let analysed = if kind == SectionKind::Template {
                let template = preprocess(&section.content, &self.config);
                let rewritten = template.processed_content.clone();
                section.template = Some(template);
                rewritten
            } else {
                section.content.clone()
            };

            match self.analyzers.get_mut(kind).analyze(&analysed) {
                Ok(analysis) => {
                    section.syntax_tree = analysis.tree;
                    section.errors = analysis
                        .diagnostics
                        .into_iter()
                        .map(|diagnostic| diagnostic.in_section(kind))
                        .collect();
                    errors.extend(section.errors.iter().cloned());
                }
                Err(err) => errors.push(
                    ParseError::new(
                        ErrorKind::analyzer_failure(kind),
                        Severity::Error,
                        format!("Failed to analyse {kind} section: {err}"),
                    )
                    .in_section(kind)
                    .at(Position::Byte(section.start)),
                ),
            }

            sections.push(section);
        }

        let template = sections.iter().find_map(|section| section.template.as_ref());
        errors.extend(validate(text, &extraction, template, &self.config));

        Document {
            source: text.to_string(),
            sections,
            errors,
        }
    }
}

#[cfg(test)]
#[path = "tests/engine.rs"]
mod tests;
