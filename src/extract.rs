//! Splitting a raw RSX file into its four blocks.
//!
//! Backend, UI-logic and style blocks take the first delimited match and count the rest. The
//! template block instead spans from the first `<template>` to the last `</template>`, so markup
//! inside it that happens to contain template tags cannot cut it short.

use crate::section::{ExtractedSection, SectionKind};
use once_cell::sync::Lazy;
use regex::Regex;

static BACKEND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^---[ \t]*\r?\n((?s:.*?))\r?\n---[ \t]*\r?$").unwrap());
static UI_LOGIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<script>\s*?\n?(.*?)\n?\s*</script>").unwrap());
static STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<style>\s*?\n?(.*?)\n?\s*</style>").unwrap());

const TEMPLATE_OPEN: &str = "<template>";
const TEMPLATE_CLOSE: &str = "</template>";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// The blocks found in one file.
pub struct Extraction {
    /// Content between the `---` fences.
    pub backend: Option<ExtractedSection>,
    /// Content of the first `<script>` block.
    pub ui_logic: Option<ExtractedSection>,
    /// Content between the first `<template>` and the last `</template>`.
    pub template: Option<ExtractedSection>,
    /// Content of the first `<style>` block.
    pub style: Option<ExtractedSection>,
}

impl Extraction {
    #[must_use]
    /// The block of the given kind, if present.
    pub fn get(&self, kind: SectionKind) -> Option<&ExtractedSection> {
        match kind {
            SectionKind::Backend => self.backend.as_ref(),
            SectionKind::UiLogic => self.ui_logic.as_ref(),
            SectionKind::Template => self.template.as_ref(),
            SectionKind::Style => self.style.as_ref(),
        }
    }

    /// Present blocks in canonical order.
    pub fn present(&self) -> impl Iterator<Item = (SectionKind, &ExtractedSection)> {
        SectionKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|section| (kind, section)))
    }
}

#[must_use]
/// Locate every block in `text`. Missing blocks are `None`; this never fails.
pub fn extract(text: &str) -> Extraction {
    Extraction {
        backend: first_match(&BACKEND, text),
        ui_logic: first_match(&UI_LOGIC, text),
        template: template_span(text),
        style: first_match(&STYLE, text),
    }
}

fn first_match(pattern: &Regex, text: &str) -> Option<ExtractedSection> {
    let captures = pattern.captures(text)?;
    let whole = captures.get(0)?;
    let inner = captures.get(1)?;
    Some(ExtractedSection {
        content: inner.as_str().to_string(),
        start: whole.start(),
        end: whole.end(),
        occurrences: pattern.find_iter(text).count(),
    })
}

fn template_span(text: &str) -> Option<ExtractedSection> {
    let start = text.find(TEMPLATE_OPEN)?;
    let close = text.rfind(TEMPLATE_CLOSE)?;
    let content_start = start + TEMPLATE_OPEN.len();
    if close < content_start {
        return None;
    }
    Some(ExtractedSection {
        content: text[content_start..close].trim().to_string(),
        start,
        end: close + TEMPLATE_CLOSE.len(),
        occurrences: text.matches(TEMPLATE_OPEN).count(),
    })
}

#[cfg(test)]
#[path = "tests/extract.rs"]
mod tests;
