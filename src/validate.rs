//! Structural rules checked over the extracted blocks and the template's directives.
//!
//! Rules never stop at the first failure; every finding becomes a [`ParseError`]. Duplicate
//! blocks are reported first, then each present block's rules run in canonical order.

use crate::config::Config;
use crate::diagnostic::{ErrorKind, ParseError, Position, Severity};
use crate::directive::{BranchKind, DirectiveKind};
use crate::extract::Extraction;
use crate::preprocess::PreprocessedTemplate;
use crate::section::{ExtractedSection, SectionKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Literal occurrences of a whole template block, used for duplicate detection.
static TEMPLATE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<template>.*?</template>").unwrap());
static FORBIDDEN_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(template|script|style)(\s[^>]*)?/?>").unwrap());
static STANDARD_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"<({})(\s[^>]*?)?/?>", HTML_TAGS.join("|"))).unwrap()
});
static EVENT_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s(on[a-z]+)\s*=").unwrap());
static INTERFACE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"interface\s+\w+\s*\{[\s\S]*?\}").unwrap());

/// Standard HTML element names. Matching is case-sensitive, so capitalised component tags never
/// count as standard tags.
const HTML_TAGS: &[&str] = &[
    "a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi", "bdo",
    "blockquote", "body", "br", "button", "canvas", "caption", "cite", "code", "col", "colgroup",
    "data", "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt", "em", "embed",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "head", "header", "hr", "html", "i", "iframe", "img", "input", "ins", "kbd", "label", "legend",
    "li", "link", "main", "map", "mark", "menu", "meta", "meter", "nav", "noscript", "object",
    "ol", "optgroup", "option", "output", "p", "picture", "pre", "progress", "q", "rp", "rt",
    "ruby", "s", "samp", "script", "section", "select", "slot", "small", "source", "span",
    "strong", "style", "sub", "summary", "sup", "table", "tbody", "td", "template", "textarea",
    "tfoot", "th", "thead", "time", "title", "tr", "track", "u", "ul", "var", "video", "wbr",
];

#[must_use]
/// Run every structural rule.
///
/// `source` is the whole file, `extraction` its blocks and `template` the preprocessed template,
/// when there is one.
pub fn validate(
    source: &str,
    extraction: &Extraction,
    template: Option<&PreprocessedTemplate>,
    config: &Config,
) -> Vec<ParseError> {
    let mut errors = duplicate_sections(source, extraction);

    for (kind, section) in extraction.present() {
        let base = content_offset(source, section);
        match kind {
            SectionKind::Backend => errors.extend(check_backend(&section.content, config)),
            SectionKind::UiLogic => errors.extend(check_ui_logic(&section.content, base, config)),
            SectionKind::Template => {
                errors.extend(check_markup(&section.content, base));
                if let Some(template) = template {
                    errors.extend(check_directives(template, config));
                }
            }
            SectionKind::Style => errors.extend(check_style(&section.content)),
        }
    }

    errors
}

/// Byte offset in `source` where `section`'s content begins.
fn content_offset(source: &str, section: &ExtractedSection) -> usize {
    source
        .get(section.start..section.end)
        .and_then(|block| block.find(section.content.as_str()))
        .map_or(section.start, |offset| section.start + offset)
}

fn duplicate_sections(source: &str, extraction: &Extraction) -> Vec<ParseError> {
    SectionKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let count = match kind {
                SectionKind::Template => TEMPLATE_BLOCK.find_iter(source).count(),
                _ => extraction.get(kind).map_or(0, |section| section.occurrences),
            };
            (count > 1).then(|| {
                ParseError::new(
                    ErrorKind::DuplicateSection,
                    Severity::Error,
                    format!("Each block may appear only once, found {count} {kind} sections"),
                )
                .in_section(kind)
            })
        })
        .collect()
}

fn check_backend(content: &str, config: &Config) -> Vec<ParseError> {
    let name = &config.entry_function;
    if !content.contains(name.as_str()) {
        return vec![ParseError::new(
            ErrorKind::MissingServerProps,
            Severity::Warning,
            format!("Backend section should define a {name} function"),
        )
        .in_section(SectionKind::Backend)];
    }

    let signature = format!(
        r"async\s+fn\s+{}\s*\([^)]*\)\s*->\s*Response",
        regex::escape(name)
    );
    if Regex::new(&signature).is_ok_and(|pattern| pattern.is_match(content)) {
        return Vec::new();
    }
    vec![ParseError::new(
        ErrorKind::InvalidFunctionSignature,
        Severity::Error,
        format!("{name} must be declared as `async fn {name}(…) -> Response`"),
    )
    .in_section(SectionKind::Backend)]
}

fn check_ui_logic(content: &str, base: usize, config: &Config) -> Vec<ParseError> {
    let mut errors = Vec::new();

    if !content.contains(config.props_marker.as_str()) {
        errors.push(
            ParseError::new(
                ErrorKind::MissingDefineProps,
                Severity::Info,
                format!("Script section should declare its props with {}", config.props_marker),
            )
            .in_section(SectionKind::UiLogic),
        );
    }

    for block in INTERFACE_BLOCK.find_iter(content) {
        if !block.as_str().contains(':') {
            errors.push(
                ParseError::new(
                    ErrorKind::EmptyInterface,
                    Severity::Warning,
                    "Interface declares no fields",
                )
                .in_section(SectionKind::UiLogic)
                .at(Position::Byte(base + block.start())),
            );
        }
    }

    errors
}

/// Forbidden nested block tags and inline event handlers on standard tags.
fn check_markup(content: &str, base: usize) -> Vec<ParseError> {
    let mut errors = Vec::new();

    let mut seen_tags = BTreeSet::new();
    for captures in FORBIDDEN_TAG.captures_iter(content) {
        let (Some(whole), Some(tag)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let tag = tag.as_str().to_ascii_lowercase();
        if seen_tags.insert(tag.clone()) {
            errors.push(
                ParseError::new(
                    ErrorKind::ForbiddenTag,
                    Severity::Error,
                    format!("<{tag}> is not allowed inside the template"),
                )
                .in_section(SectionKind::Template)
                .at(Position::Byte(base + whole.start())),
            );
        }
    }

    let mut seen_events = BTreeSet::new();
    for captures in STANDARD_TAG.captures_iter(content) {
        let (Some(whole), Some(tag)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let Some(attributes) = captures.get(2) else {
            continue;
        };
        for event in EVENT_ATTRIBUTE.captures_iter(attributes.as_str()) {
            let Some(name) = event.get(1) else {
                continue;
            };
            let name = name.as_str().to_ascii_lowercase();
            if seen_events.insert(name.clone()) {
                errors.push(
                    ParseError::new(
                        ErrorKind::ForbiddenEventAttribute,
                        Severity::Error,
                        format!("Event attribute {name} is not allowed on <{}>", tag.as_str()),
                    )
                    .in_section(SectionKind::Template)
                    .at(Position::Byte(base + whole.start())),
                );
            }
        }
    }

    errors
}

fn check_directives(template: &PreprocessedTemplate, config: &Config) -> Vec<ParseError> {
    let template_error = |kind, message: String| {
        ParseError::new(kind, Severity::Error, message).in_section(SectionKind::Template)
    };
    let mut errors = Vec::new();

    for directive in &template.directives {
        match &directive.kind {
            DirectiveKind::If {
                condition,
                branches,
                ..
            } => {
                if condition.trim().is_empty() {
                    errors.push(template_error(
                        ErrorKind::EmptyCondition,
                        format!("if directive {} has an empty condition", directive.index),
                    ));
                }
                let blank_else_ifs = branches.iter().filter(|branch| {
                    matches!(&branch.kind, BranchKind::ElseIf { condition, .. } if condition.trim().is_empty())
                });
                for _ in blank_else_ifs {
                    errors.push(template_error(
                        ErrorKind::EmptyCondition,
                        format!("else-if branch of directive {} has an empty condition", directive.index),
                    ));
                }
            }
            DirectiveKind::Each { iterable, item, .. } => {
                if iterable.trim().is_empty() || item.trim().is_empty() {
                    errors.push(template_error(
                        ErrorKind::InvalidEachDirective,
                        format!(
                            "each directive {} needs both an iterable and an item name",
                            directive.index
                        ),
                    ));
                }
            }
            DirectiveKind::EmbeddedComponent {
                tag,
                target_runtime,
                ..
            } => {
                if !config.supports_runtime(target_runtime) {
                    errors.push(template_error(
                        ErrorKind::InvalidTargetRuntime,
                        format!(
                            "<{tag}> targets unsupported runtime {target_runtime}; supported: {}",
                            config.supported_runtimes.join(", ")
                        ),
                    ));
                }
            }
            DirectiveKind::Interpolation { .. } | DirectiveKind::RawMarkup { .. } => {}
        }
    }

    errors
}

fn check_style(content: &str) -> Vec<ParseError> {
    let opening = content.matches('{').count();
    let closing = content.matches('}').count();
    if opening == closing {
        return Vec::new();
    }
    vec![ParseError::new(
        ErrorKind::UnmatchedBraces,
        Severity::Error,
        format!("Style has {opening} opening and {closing} closing braces"),
    )
    .in_section(SectionKind::Style)]
}

#[cfg(test)]
#[path = "tests/validate.rs"]
mod tests;
