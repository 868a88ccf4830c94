//! Directive preprocessing for template blocks.
//!
//! The template block mixes HTML with `{{ … }}` directives. Before the HTML analyzer sees it, every
//! directive is cut out, recorded in a flat [`Directive`] list and replaced by a placeholder
//! comment carrying its index. The result is plain HTML plus a list that tooling can resolve the
//! placeholders against.
//!
//! A fragment is rewritten in two phases:
//!
//! - conditionals, loops and raw-markup escapes are extracted repeatedly until a pass finds
//!   nothing new or the configured pass limit is reached;
//! - remaining `{{ expr }}` interpolations are then extracted in one sweep.
//!
//! Every conditional branch body and loop body is itself rewritten as a fragment before it is
//! stored, so directives at any nesting depth end up in the list with their placeholders inside
//! the enclosing body. Embedded components are extracted once, over the whole rewritten
//! template, after everything else.

mod component;
mod conditional;

use crate::config::Config;
use crate::directive::{find_placeholders, AttributeValue, Directive, DirectiveKind, PlaceholderRef};
use crate::expression::parse_expression;
use serde::Serialize;

const EACH_OPEN: &str = "{{@each";
const EACH_CLOSE: &str = "{{/each}}";
const RAW_OPEN: &str = "{{@html";
const INTERPOLATION_OPEN: &str = "{{";
const DIRECTIVE_CLOSE: &str = "}}";

#[derive(Clone, Debug, PartialEq, Serialize)]
/// Template text with directives replaced by placeholders, plus the directives themselves.
pub struct PreprocessedTemplate {
    /// The rewritten template.
    pub processed_content: String,
    /// Every directive found, indexed by position.
    pub directives: Vec<Directive>,
}

impl PreprocessedTemplate {
    #[must_use]
    /// The directive a placeholder refers to, if its index exists and its marker agrees.
    pub fn resolve(&self, reference: &PlaceholderRef) -> Option<&Directive> {
        self.directives
            .get(reference.index)
            .filter(|directive| directive.kind.marker() == reference.marker)
    }

    /// Every text that can hold placeholders: the rewritten template, processed bodies, component
    /// children and component attribute values.
    pub fn placeholder_hosts(&self) -> impl Iterator<Item = &str> {
        let nested = self.directives.iter().flat_map(|directive| {
            let texts: Vec<&str> = match &directive.kind {
                DirectiveKind::If { branches, .. } => branches
                    .iter()
                    .map(|branch| branch.processed_body.as_str())
                    .collect(),
                DirectiveKind::Each { processed_body, .. } => vec![processed_body.as_str()],
                DirectiveKind::EmbeddedComponent {
                    attributes,
                    children,
                    ..
                } => std::iter::once(children.as_str())
                    .chain(attributes.values().filter_map(|value| match value {
                        AttributeValue::Text(text) => Some(text.as_str()),
                        AttributeValue::Flag(_) => None,
                    }))
                    .collect(),
                DirectiveKind::Interpolation { .. } | DirectiveKind::RawMarkup { .. } => Vec::new(),
            };
            texts
        });
        std::iter::once(self.processed_content.as_str()).chain(nested)
    }

    #[must_use]
    /// All placeholders across [`Self::placeholder_hosts`].
    pub fn placeholders(&self) -> Vec<PlaceholderRef> {
        self.placeholder_hosts().flat_map(find_placeholders).collect()
    }
}

#[must_use]
/// Rewrite `template`, extracting every directive.
pub fn preprocess(template: &str, config: &Config) -> PreprocessedTemplate {
    Preprocessor::new(config).run(template)
}

/// Single-use rewriter that accumulates directives while it walks a template.
pub struct Preprocessor<'a> {
    config: &'a Config,
    directives: Vec<Directive>,
}

impl<'a> Preprocessor<'a> {
    #[must_use]
    /// Creates a preprocessor honouring `config`'s runtime attribute and pass limit.
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            directives: Vec::new(),
        }
    }

    #[must_use]
    /// Rewrite `template` and hand back the text and directive list.
    pub fn run(mut self, template: &str) -> PreprocessedTemplate {
        let rewritten = self.rewrite_fragment(template);
        let processed_content = self.extract_components(&rewritten);
        PreprocessedTemplate {
            processed_content,
            directives: self.directives,
        }
    }

    /// Append a directive and return its placeholder.
    fn register(&mut self, kind: DirectiveKind, start: usize, end: usize, original: &str) -> String {
        let directive = Directive {
            index: self.directives.len(),
            kind,
            start,
            end,
            original: original.to_string(),
        };
        let placeholder = directive.placeholder();
        self.directives.push(directive);
        placeholder
    }

    /// Everything except component extraction. Also used for branch and loop bodies.
    fn rewrite_fragment(&mut self, text: &str) -> String {
        let mut current = text.to_string();

        for _ in 0..self.config.max_preprocess_iterations {
            let before = self.directives.len();
            current = self.extract_conditionals(&current);
            current = self.extract_loops(&current);
            current = self.extract_raw_markup(&current);
            if self.directives.len() == before {
                break;
            }
        }

        self.extract_interpolations(&current)
    }

    /// One pass over `{{@each …}} … {{/each}}`.
    ///
    /// Each closer pairs with the nearest opener before it that the pass has not already copied
    /// past, so the innermost loop of a nest is taken first and its parent waits for the next pass.
    fn extract_loops(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;

        while let Some(offset) = text[cursor..].find(EACH_CLOSE) {
            let close_start = cursor + offset;
            let close_end = close_start + EACH_CLOSE.len();

            let opener = text[cursor..close_start]
                .rfind(EACH_OPEN)
                .and_then(|o| directive_header(text, cursor + o, EACH_OPEN, close_start));

            if let Some((open, body_start, header)) = opener {
                out.push_str(&text[cursor..open]);
                let (iterable, item, index) = parse_loop_header(header);
                let body = text[body_start..close_start].trim().to_string();
                let processed_body = self.rewrite_fragment(&body);
                let kind = DirectiveKind::Each {
                    parsed_iterable: parse_expression(&iterable),
                    iterable,
                    item,
                    index,
                    body,
                    processed_body,
                };
                let placeholder = self.register(kind, open, close_end, &text[open..close_end]);
                out.push_str(&placeholder);
            } else {
                out.push_str(&text[cursor..close_end]);
            }
            cursor = close_end;
        }

        out.push_str(&text[cursor..]);
        out
    }

    /// One pass over `{{@html expr}}`.
    fn extract_raw_markup(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        let mut pos = 0;

        while let Some(offset) = text[pos..].find(RAW_OPEN) {
            let start = pos + offset;
            pos = start + RAW_OPEN.len();

            let Some((_, end, content)) = directive_header(text, start, RAW_OPEN, text.len()) else {
                continue;
            };
            let content = content.trim();
            if content.is_empty() {
                continue;
            }

            out.push_str(&text[cursor..start]);
            let kind = DirectiveKind::RawMarkup {
                content: content.to_string(),
                parsed: parse_expression(content),
            };
            let placeholder = self.register(kind, start, end, &text[start..end]);
            out.push_str(&placeholder);
            cursor = end;
            pos = end;
        }

        out.push_str(&text[cursor..]);
        out
    }

    /// Replace `{{ expr }}` whose expression is non-empty and does not start with a directive
    /// sigil (`@`, `/`, `:`).
    fn extract_interpolations(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        let mut pos = 0;

        while let Some(offset) = text[pos..].find(INTERPOLATION_OPEN) {
            let start = pos + offset;
            let inner_start = start + INTERPOLATION_OPEN.len();
            let Some(inner_len) = text[inner_start..].find(DIRECTIVE_CLOSE) else {
                break;
            };
            let inner = &text[inner_start..inner_start + inner_len];
            let expression = inner.trim();

            if expression.is_empty() || expression.starts_with(['@', '/', ':']) || inner.contains('}')
            {
                pos = inner_start;
                continue;
            }

            let end = inner_start + inner_len + DIRECTIVE_CLOSE.len();
            out.push_str(&text[cursor..start]);
            let kind = DirectiveKind::Interpolation {
                expression: expression.to_string(),
                parsed: parse_expression(expression),
            };
            let placeholder = self.register(kind, start, end, &text[start..end]);
            out.push_str(&placeholder);
            cursor = end;
            pos = end;
        }

        out.push_str(&text[cursor..]);
        out
    }
}

/// Locate the header of a `{{<keyword> … }}` token starting at `open`.
///
/// The keyword must be followed by whitespace or the closing `}}`, and the closing `}}` must
/// start before `limit`. Returns the opener offset, the offset just past `}}`, and the header.
fn directive_header<'t>(
    text: &'t str,
    open: usize,
    keyword: &str,
    limit: usize,
) -> Option<(usize, usize, &'t str)> {
    let after = open + keyword.len();
    let next = *text.as_bytes().get(after)?;
    if !(next.is_ascii_whitespace() || next == b'}') {
        return None;
    }
    let header_len = text[after..limit].find(DIRECTIVE_CLOSE)?;
    let header_end = after + header_len;
    Some((open, header_end + DIRECTIVE_CLOSE.len(), &text[after..header_end]))
}

/// Split `iterable as item, index`. A header without `as` keeps everything as the iterable and
/// leaves the item empty.
fn parse_loop_header(header: &str) -> (String, String, Option<String>) {
    let header = header.trim();
    let Some((iterable, binding)) = split_keyword(header, "as") else {
        return (header.to_string(), String::new(), None);
    };

    let (item, index) = match binding.split_once(',') {
        Some((item, index)) => (item.trim(), Some(index.trim()).filter(|i| !i.is_empty())),
        None => (binding.trim(), None),
    };
    (
        iterable.trim().to_string(),
        item.to_string(),
        index.map(str::to_string),
    )
}

/// Split at the first occurrence of `keyword` standing alone between whitespace.
fn split_keyword<'t>(text: &'t str, keyword: &str) -> Option<(&'t str, &'t str)> {
    let bytes = text.as_bytes();
    text.match_indices(keyword).find_map(|(i, _)| {
        let end = i + keyword.len();
        let spaced_before = i > 0 && bytes[i - 1].is_ascii_whitespace();
        let spaced_after = bytes.get(end).is_none_or(u8::is_ascii_whitespace);
        (spaced_before && spaced_after).then(|| (&text[..i], &text[end..]))
    })
}

#[cfg(test)]
#[path = "tests/preprocess.rs"]
mod tests;
