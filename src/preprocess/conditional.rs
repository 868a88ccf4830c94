//! Extraction of `{{@if}} … {{/if}}` blocks.
//!
//! A single left-to-right scan keeps a stack of open conditionals. Branch markers attach to the
//! innermost open conditional, and only a close that empties the stack yields a match, so every
//! match is an outermost conditional. Nested conditionals are handled when the branch bodies of
//! that match are rewritten in turn.

use super::{Preprocessor, DIRECTIVE_CLOSE};
use crate::directive::{Branch, BranchKind, DirectiveKind};
use crate::expression::parse_expression;

const IF_OPEN: &str = "{{@if";
const ELSEIF: &str = "{{:elseif";
const ELSE: &str = "{{:else";
const IF_CLOSE: &str = "{{/if}}";

#[derive(Debug, PartialEq, Eq)]
enum Token<'t> {
    Open { condition: &'t str },
    /// `None` for a plain `{{:else}}`.
    Branch { condition: Option<&'t str> },
    Close,
}

#[derive(Debug)]
struct Marker<'t> {
    start: usize,
    end: usize,
    condition: Option<&'t str>,
}

#[derive(Debug)]
struct Frame<'t> {
    start: usize,
    header_end: usize,
    condition: &'t str,
    markers: Vec<Marker<'t>>,
}

#[derive(Debug)]
struct Match<'t> {
    frame: Frame<'t>,
    close_start: usize,
    end: usize,
}

impl Preprocessor<'_> {
    /// One pass over outermost conditionals, replacing each with a placeholder.
    pub(super) fn extract_conditionals(&mut self, text: &str) -> String {
        let matches = scan(text);
        if matches.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for found in matches {
            out.push_str(&text[cursor..found.frame.start]);
            let branches = self.build_branches(text, &found);
            let condition = found.frame.condition.to_string();
            let kind = DirectiveKind::If {
                parsed_condition: parse_expression(&condition),
                condition,
                branches,
            };
            let original = &text[found.frame.start..found.end];
            let placeholder = self.register(kind, found.frame.start, found.end, original);
            out.push_str(&placeholder);
            cursor = found.end;
        }
        out.push_str(&text[cursor..]);
        out
    }

    fn build_branches(&mut self, text: &str, found: &Match<'_>) -> Vec<Branch> {
        let frame = &found.frame;
        let mut arms = Vec::with_capacity(frame.markers.len() + 1);
        let mut body_start = frame.header_end;
        let mut kind = BranchKind::Primary;

        for marker in &frame.markers {
            arms.push((kind, &text[body_start..marker.start]));
            kind = match marker.condition {
                Some(condition) => BranchKind::ElseIf {
                    condition: condition.to_string(),
                    parsed_condition: parse_expression(condition),
                },
                None => BranchKind::Else,
            };
            body_start = marker.end;
        }
        arms.push((kind, &text[body_start..found.close_start]));

        arms.into_iter()
            .map(|(kind, body)| {
                let body = body.trim().to_string();
                let processed_body = self.rewrite_fragment(&body);
                Branch {
                    kind,
                    body,
                    processed_body,
                }
            })
            .collect()
    }
}

/// Outermost complete conditionals in `text`, in source order.
///
/// Unmatched closes and markers outside any conditional are ignored, and conditionals still open
/// at the end of the text produce nothing, leaving that text untouched.
fn scan(text: &str) -> Vec<Match<'_>> {
    let bytes = text.as_bytes();
    let mut stack: Vec<Frame<'_>> = Vec::new();
    let mut matches = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let token = if bytes[pos] == b'{' {
            token_at(text, pos)
        } else {
            None
        };
        let Some((token, end)) = token else {
            pos += 1;
            continue;
        };

        match token {
            Token::Open { condition } => stack.push(Frame {
                start: pos,
                header_end: end,
                condition,
                markers: Vec::new(),
            }),
            Token::Branch { condition } => match stack.last_mut() {
                Some(frame) => frame.markers.push(Marker {
                    start: pos,
                    end,
                    condition,
                }),
                None => {
                    pos += 1;
                    continue;
                }
            },
            Token::Close => match stack.pop() {
                Some(frame) if stack.is_empty() => matches.push(Match {
                    frame,
                    close_start: pos,
                    end,
                }),
                Some(_) => {}
                None => {
                    pos += 1;
                    continue;
                }
            },
        }
        pos = end;
    }

    matches
}

/// Recognise a conditional token at `pos`, returning it with the offset just past it.
fn token_at(text: &str, pos: usize) -> Option<(Token<'_>, usize)> {
    let rest = &text[pos..];

    if rest.starts_with(IF_CLOSE) {
        return Some((Token::Close, pos + IF_CLOSE.len()));
    }
    if rest.starts_with(IF_OPEN) {
        let (inner, end) = header(text, pos, IF_OPEN)?;
        return Some((Token::Open { condition: inner.trim() }, end));
    }
    if rest.starts_with(ELSEIF) {
        let (inner, end) = header(text, pos, ELSEIF)?;
        let condition = Some(inner.trim());
        return Some((Token::Branch { condition }, end));
    }
    if rest.starts_with(ELSE) {
        let (inner, end) = header(text, pos, ELSE)?;
        if inner.trim().is_empty() {
            return Some((Token::Branch { condition: None }, end));
        }
        let condition = inner.trim_start().strip_prefix("if")?;
        if !condition.is_empty() && !condition.starts_with(char::is_whitespace) {
            return None;
        }
        let condition = Some(condition.trim());
        return Some((Token::Branch { condition }, end));
    }
    None
}

/// Text between `keyword` and the next `}}`, provided the keyword stands alone.
fn header<'t>(text: &'t str, pos: usize, keyword: &str) -> Option<(&'t str, usize)> {
    let after = pos + keyword.len();
    let next = *text.as_bytes().get(after)?;
    if !(next.is_ascii_whitespace() || next == b'}') {
        return None;
    }
    let len = text[after..].find(DIRECTIVE_CLOSE)?;
    Some((&text[after..after + len], after + len + DIRECTIVE_CLOSE.len()))
}
