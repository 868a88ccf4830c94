//! Statistics and human-readable reports for parsed documents.

use crate::diagnostic::ParseError;
use crate::document::Document;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
/// Counts derived from a [`Document`].
pub struct Statistics {
    /// Number of present blocks.
    pub total_sections: usize,
    /// Blocks per kind name.
    pub section_type_counts: BTreeMap<String, usize>,
    /// Number of diagnostics of any severity.
    pub total_errors: usize,
    /// Diagnostics per kind name.
    pub error_type_counts: BTreeMap<String, usize>,
    /// Number of template directives.
    pub directive_count: usize,
    /// Directives per type name.
    pub directive_type_counts: BTreeMap<String, usize>,
}

impl Statistics {
    #[must_use]
    /// Count everything in `document`.
    pub fn of(document: &Document) -> Self {
        let mut stats = Self {
            total_sections: document.sections.len(),
            total_errors: document.errors.len(),
            directive_count: document.directives().len(),
            ..Self::default()
        };

        for section in &document.sections {
            *stats
                .section_type_counts
                .entry(section.kind.name().to_string())
                .or_default() += 1;
        }
        for error in &document.errors {
            *stats
                .error_type_counts
                .entry(error.kind.as_str().to_string())
                .or_default() += 1;
        }
        for directive in document.directives() {
            *stats
                .directive_type_counts
                .entry(directive.kind.type_name().to_string())
                .or_default() += 1;
        }

        stats
    }
}

#[must_use]
/// Multi-line report: structure, directive counts, error counts and numbered error details.
pub fn generate_report(document: &Document) -> String {
    let stats = Statistics::of(document);
    let mut report = String::from("=== RSX Parse Report ===\n\n");

    report.push_str("Structure:\n");
    let _ = writeln!(report, "- Total sections: {}", stats.total_sections);
    for (kind, count) in &stats.section_type_counts {
        let _ = writeln!(report, "- {kind}: {count}");
    }

    if stats.directive_count > 0 {
        report.push_str("\nTemplate directives:\n");
        let _ = writeln!(report, "- Total directives: {}", stats.directive_count);
        for (kind, count) in &stats.directive_type_counts {
            let _ = writeln!(report, "- {kind}: {count}");
        }
    }

    if stats.total_errors == 0 {
        report.push_str("\nNo errors found\n");
        return report;
    }

    report.push_str("\nErrors:\n");
    let _ = writeln!(report, "- Total errors: {}", stats.total_errors);
    for (kind, count) in &stats.error_type_counts {
        let _ = writeln!(report, "- {kind}: {count}");
    }

    report.push_str("\nDetails:\n");
    for (i, error) in document.errors.iter().enumerate() {
        let _ = writeln!(
            report,
            "{}. [{}] {}: {}",
            i + 1,
            error.severity,
            error.kind,
            error.message
        );
        if let Some(section) = error.section {
            let _ = writeln!(report, "   Section: {section}");
        }
    }

    report
}

#[must_use]
/// One line per error: `kind: message (position)`.
pub fn format_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|error| {
            let position = error
                .position
                .map_or_else(|| "Unknown position".to_string(), |p| p.to_string());
            format!("{}: {} ({position})", error.kind, error.message)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "tests/report.rs"]
mod tests;
