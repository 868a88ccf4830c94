//! Structured records for template directives and the placeholders that stand in for them.
//!
//! Directives live in one flat list per template. A directive's `index` is its position in that
//! list; the rewritten text refers to it only through a placeholder comment such as
//! `<!-- IF_DIRECTIVE_3 -->`, never through ownership, so nested directives are siblings in the
//! list and their placeholders sit inside the enclosing directive's processed body.

use crate::expression::Expression;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
/// Value of a component attribute.
pub enum AttributeValue {
    /// `name="value"` or `name=value`.
    Text(String),
    /// A bare `name`, recorded as `true`.
    Flag(bool),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// One arm of an `if` directive.
pub enum BranchKind {
    /// The leading `{{@if cond}}` arm; its condition lives on the directive.
    Primary,
    /// A `{{:else if cond}}` arm.
    ElseIf {
        /// Raw condition text.
        condition: String,
        /// Parsed condition.
        parsed_condition: Expression,
    },
    /// The trailing `{{:else}}` arm.
    Else,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// Body of one `if` arm.
pub struct Branch {
    /// Which arm this is.
    #[serde(flatten)]
    pub kind: BranchKind,
    /// Trimmed text between this arm's marker and the next marker.
    pub body: String,
    /// `body` with its own directives replaced by placeholders.
    pub processed_body: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// The payload of a directive.
pub enum DirectiveKind {
    /// `{{ expr }}`.
    Interpolation {
        /// Trimmed expression text.
        expression: String,
        /// Parsed expression.
        parsed: Expression,
    },
    /// `{{@if cond}} … {{:else if cond}} … {{:else}} … {{/if}}`.
    If {
        /// Raw condition of the primary arm.
        condition: String,
        /// Parsed condition of the primary arm.
        parsed_condition: Expression,
        /// Arms in source order, primary first.
        branches: Vec<Branch>,
    },
    /// `{{@each iterable as item, index}} … {{/each}}`.
    Each {
        /// Raw iterable expression, empty when missing.
        iterable: String,
        /// Parsed iterable.
        parsed_iterable: Expression,
        /// Loop variable name, empty when missing.
        item: String,
        /// Optional index variable name.
        #[serde(rename = "index_name")]
        index: Option<String>,
        /// Trimmed loop body.
        body: String,
        /// `body` with its own directives replaced by placeholders.
        processed_body: String,
    },
    /// `{{@html expr}}`.
    RawMarkup {
        /// Raw expression text.
        content: String,
        /// Parsed expression.
        parsed: Expression,
    },
    /// A capitalised tag rendered by an external UI runtime.
    EmbeddedComponent {
        /// Tag name, e.g. `Counter`.
        tag: String,
        /// Runtime named by the runtime attribute.
        target_runtime: String,
        /// Every attribute on the opening tag.
        attributes: BTreeMap<String, AttributeValue>,
        /// Trimmed children between the opening and closing tags.
        children: String,
    },
}

impl DirectiveKind {
    #[must_use]
    /// Marker embedded in this directive's placeholder.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Interpolation { .. } => "INTERPOLATION",
            Self::If { .. } => "IF_DIRECTIVE",
            Self::Each { .. } => "EACH_DIRECTIVE",
            Self::RawMarkup { .. } => "RAW_HTML",
            Self::EmbeddedComponent { .. } => "CLIENT_COMPONENT",
        }
    }

    #[must_use]
    /// Snake-case type name, matching the serialised `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Interpolation { .. } => "interpolation",
            Self::If { .. } => "if",
            Self::Each { .. } => "each",
            Self::RawMarkup { .. } => "raw_markup",
            Self::EmbeddedComponent { .. } => "embedded_component",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// A directive extracted from template text.
pub struct Directive {
    /// Position in the flat directive list.
    pub index: usize,
    /// What was recognised.
    #[serde(flatten)]
    pub kind: DirectiveKind,
    /// Byte offset of the match in the text it was found in.
    pub start: usize,
    /// Byte offset just past the match.
    pub end: usize,
    /// The matched source text.
    pub original: String,
}

impl Directive {
    #[must_use]
    /// The placeholder that replaced this directive.
    pub fn placeholder(&self) -> String {
        placeholder(self.kind.marker(), self.index)
    }
}

#[must_use]
/// Render the placeholder comment for a directive.
pub fn placeholder(marker: &str, index: usize) -> String {
    format!("<!-- {marker}_{index} -->")
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A placeholder found in rewritten text.
pub struct PlaceholderRef {
    /// Marker naming the directive type.
    pub marker: String,
    /// Index into the directive list.
    pub index: usize,
    /// Byte offset of `<!--`.
    pub start: usize,
    /// Byte offset just past `-->`.
    pub end: usize,
}

const OPEN: &str = "<!-- ";
const CLOSE: &str = " -->";

#[must_use]
/// Scan `text` for directive placeholders, in order.
///
/// Ordinary HTML comments are skipped; only comments of the exact form `<!-- MARKER_N -->` with
/// an upper-case marker and a decimal index are reported.
pub fn find_placeholders(text: &str) -> Vec<PlaceholderRef> {
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(OPEN) {
        let start = cursor + offset;
        let inner_start = start + OPEN.len();
        let Some(inner_len) = text[inner_start..].find(CLOSE) else {
            break;
        };
        let inner = &text[inner_start..inner_start + inner_len];

        if let Some((marker, index)) = parse_placeholder(inner) {
            let end = inner_start + inner_len + CLOSE.len();
            found.push(PlaceholderRef {
                marker: marker.to_string(),
                index,
                start,
                end,
            });
            cursor = end;
        } else {
            cursor = inner_start;
        }
    }

    found
}

fn parse_placeholder(inner: &str) -> Option<(&str, usize)> {
    let (marker, index) = inner.rsplit_once('_')?;
    let valid_marker =
        !marker.is_empty() && marker.bytes().all(|b| b.is_ascii_uppercase() || b == b'_');
    let valid_index = !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit());
    if !(valid_marker && valid_index) {
        return None;
    }
    index.parse().ok().map(|index| (marker, index))
}

#[cfg(test)]
#[path = "tests/directive.rs"]
mod tests;
