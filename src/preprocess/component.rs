//! Extraction of embedded components: capitalised tags that carry the runtime attribute.

use super::Preprocessor;
use crate::directive::{AttributeValue, DirectiveKind};
use std::collections::BTreeMap;

struct Component {
    tag: String,
    target_runtime: String,
    attributes: BTreeMap<String, AttributeValue>,
    children: String,
    end: usize,
}

impl Preprocessor<'_> {
    /// Replace every embedded component with a placeholder.
    ///
    /// Scanning resumes after each replaced span, so a component nested inside another one's
    /// children stays part of those children.
    pub(super) fn extract_components(&mut self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        let mut pos = 0;

        while let Some(offset) = text[pos..].find('<') {
            let start = pos + offset;
            let Some(component) = self.component_at(text, start) else {
                pos = start + 1;
                continue;
            };

            out.push_str(&text[cursor..start]);
            let end = component.end;
            let kind = DirectiveKind::EmbeddedComponent {
                tag: component.tag,
                target_runtime: component.target_runtime,
                attributes: component.attributes,
                children: component.children,
            };
            let placeholder = self.register(kind, start, end, &text[start..end]);
            out.push_str(&placeholder);
            cursor = end;
            pos = end;
        }

        out.push_str(&text[cursor..]);
        out
    }

    fn component_at(&self, text: &str, start: usize) -> Option<Component> {
        let name_start = start + 1;
        let rest = &text[name_start..];
        let name_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
            .unwrap_or(rest.len());
        let tag = &rest[..name_len];
        if !tag.starts_with(|c: char| c.is_ascii_uppercase()) {
            return None;
        }

        let attrs_start = name_start + name_len;
        let next = *text.as_bytes().get(attrs_start)?;
        if !(next.is_ascii_whitespace() || next == b'/' || next == b'>') {
            return None;
        }

        let tag_close = tag_end(text, attrs_start)?;
        let self_closing = tag_close > attrs_start && text.as_bytes()[tag_close - 1] == b'/';
        let attrs_end = if self_closing { tag_close - 1 } else { tag_close };
        let attributes = parse_attributes(&text[attrs_start..attrs_end]);

        let target_runtime = match attributes.get(&self.config.runtime_attribute) {
            Some(AttributeValue::Text(runtime)) if !runtime.is_empty() => runtime.clone(),
            _ => return None,
        };

        let open_end = tag_close + 1;
        let closing = format!("</{tag}>");
        let (children, end) = match text[open_end..].find(&closing) {
            Some(len) if !self_closing => (
                text[open_end..open_end + len].trim().to_string(),
                open_end + len + closing.len(),
            ),
            _ => (String::new(), open_end),
        };

        Some(Component {
            tag: tag.to_string(),
            target_runtime,
            attributes,
            children,
            end,
        })
    }
}

/// Offset of the `>` ending the opening tag, ignoring any inside quoted values.
fn tag_end(text: &str, from: usize) -> Option<usize> {
    let mut quote = None;
    for (i, byte) in text.bytes().enumerate().skip(from) {
        match (quote, byte) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(byte),
            (None, b'>') => return Some(i),
            (None, _) => {}
        }
    }
    None
}

/// Parse `name="value"`, `name='value'`, `name=value` and bare `name` attributes.
///
/// Bare names become [`AttributeValue::Flag`]; a later duplicate overrides an earlier one.
pub(super) fn parse_attributes(text: &str) -> BTreeMap<String, AttributeValue> {
    let bytes = text.as_bytes();
    let skip_space = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    };

    let mut attributes = BTreeMap::new();
    let mut i = skip_space(0);
    while i < bytes.len() {
        let name_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'/')
        {
            i += 1;
        }
        if i == name_start {
            i = skip_space(i + 1);
            continue;
        }
        let name = text[name_start..i].to_string();

        let after_name = skip_space(i);
        if bytes.get(after_name) != Some(&b'=') {
            attributes.insert(name, AttributeValue::Flag(true));
            i = after_name;
            continue;
        }

        let value_start = skip_space(after_name + 1);
        let (value, next) = match bytes.get(value_start) {
            Some(&quote @ (b'"' | b'\'')) => {
                let inner = value_start + 1;
                match text[inner..].find(char::from(quote)) {
                    Some(len) => (&text[inner..inner + len], inner + len + 1),
                    None => (&text[inner..], bytes.len()),
                }
            }
            _ => {
                let len = text[value_start..]
                    .find(|c: char| c.is_ascii_whitespace())
                    .unwrap_or(text.len() - value_start);
                (&text[value_start..value_start + len], value_start + len)
            }
        };
        attributes.insert(name, AttributeValue::Text(value.to_string()));
        i = skip_space(next);
    }

    attributes
}
