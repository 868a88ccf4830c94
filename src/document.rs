//! The result of parsing one RSX file.

use crate::diagnostic::{ParseError, Severity};
use crate::directive::Directive;
use crate::preprocess::PreprocessedTemplate;
use crate::report::Statistics;
use crate::section::{Section, SectionKind};
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
/// Sections and diagnostics of one parsed file.
pub struct Document {
    /// The text that was parsed.
    #[serde(skip)]
    pub source: String,
    /// Present blocks in canonical order, at most one per kind.
    pub sections: Vec<Section>,
    /// Analyzer diagnostics, analyzer failures and validation findings, in that order per block.
    pub errors: Vec<ParseError>,
}

impl Document {
    #[must_use]
    /// The block of the given kind.
    pub fn section(&self, kind: SectionKind) -> Option<&Section> {
        self.sections.iter().find(|section| section.kind == kind)
    }

    #[must_use]
    /// The preprocessed template, if the file has a template block.
    pub fn template(&self) -> Option<&PreprocessedTemplate> {
        self.section(SectionKind::Template)
            .and_then(|section| section.template.as_ref())
    }

    #[must_use]
    /// The template's directives; empty without a template.
    pub fn directives(&self) -> &[Directive] {
        self.template()
            .map_or(&[], |template| template.directives.as_slice())
    }

    #[must_use]
    /// Whether any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|error| error.severity == Severity::Error)
    }

    #[must_use]
    /// Summary counts over sections, errors and directives.
    pub fn statistics(&self) -> Statistics {
        Statistics::of(self)
    }
}
