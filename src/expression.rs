//! The small expression language used inside template directives.
//!
//! Expressions appear in interpolations (`{{ user.name }}`), `if` conditions, `each` iterables and
//! raw-markup escapes. Parsing never fails: each structural form is tried in a fixed order, and
//! text that matches none of them becomes [`Expression::Unknown`] so that editor tooling can keep
//! working over half-typed input.
//!
//! The dispatch order is:
//!
//! 1. ternary, split at the first top-level `?` and the first top-level `:` after it
//! 2. binary, tried from the loosest precedence group to the tightest
//! 3. unary `!` or `-`
//! 4. a parenthesised group
//! 5. call, matched on the trailing argument list
//! 6. property access, split on the last `.`
//! 7. string, number or boolean literal
//! 8. identifier
//!
//! "Top-level" means outside any `()`, `[]` or `{}` pair and outside string literals. A binary
//! split happens once, at the first operator of the loosest group present, and both halves are
//! parsed again from the top; `a - b - c` therefore groups as `a - (b - c)`.

use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
/// Infix operators, serialised as their source symbol.
pub enum BinaryOp {
    /// `||`
    #[serde(rename = "||")]
    Or,
    /// `&&`
    #[serde(rename = "&&")]
    And,
    /// `===`
    #[serde(rename = "===")]
    StrictEq,
    /// `!==`
    #[serde(rename = "!==")]
    StrictNe,
    /// `==`
    #[serde(rename = "==")]
    Eq,
    /// `!=`
    #[serde(rename = "!=")]
    Ne,
    /// `>=`
    #[serde(rename = ">=")]
    Ge,
    /// `<=`
    #[serde(rename = "<=")]
    Le,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `+`
    #[serde(rename = "+")]
    Add,
    /// `-`
    #[serde(rename = "-")]
    Sub,
    /// `*`
    #[serde(rename = "*")]
    Mul,
    /// `/`
    #[serde(rename = "/")]
    Div,
    /// `%`
    #[serde(rename = "%")]
    Rem,
}

/// Operator groups from loosest to tightest binding. Within a group, longer symbols come first so
/// that `>=` wins over `>` at the same position.
const PRECEDENCE: [&[BinaryOp]; 6] = [
    &[BinaryOp::Or],
    &[BinaryOp::And],
    &[
        BinaryOp::StrictEq,
        BinaryOp::StrictNe,
        BinaryOp::Eq,
        BinaryOp::Ne,
    ],
    &[BinaryOp::Ge, BinaryOp::Le, BinaryOp::Gt, BinaryOp::Lt],
    &[BinaryOp::Add, BinaryOp::Sub],
    &[BinaryOp::Mul, BinaryOp::Div, BinaryOp::Rem],
];

impl BinaryOp {
    #[must_use]
    /// Source symbol of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::StrictEq => "===",
            Self::StrictNe => "!==",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
/// Prefix operators, serialised as their source symbol.
pub enum UnaryOp {
    /// `!`
    #[serde(rename = "!")]
    Not,
    /// `-`
    #[serde(rename = "-")]
    Neg,
}

impl UnaryOp {
    #[must_use]
    /// Source symbol of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Neg => "-",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
/// Constant value written directly in an expression.
pub enum Literal {
    /// Quoted text, without its quotes.
    String(String),
    /// Decimal number, optionally negative.
    Number(f64),
    /// `true` or `false`.
    Bool(bool),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// Parsed expression tree.
pub enum Expression {
    /// A bare name such as `count`.
    Identifier {
        /// The name.
        name: String,
    },
    /// `object.property`.
    PropertyAccess {
        /// Everything before the last `.`.
        object: Box<Expression>,
        /// The final segment.
        property: String,
    },
    /// `callee(arg, ...)`.
    Call {
        /// The called expression.
        callee: Box<Expression>,
        /// Arguments in order.
        args: Vec<Expression>,
    },
    /// `left op right`.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expression>,
        /// Right operand.
        right: Box<Expression>,
    },
    /// `op operand`.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expression>,
    },
    /// `condition ? consequent : alternate`.
    Conditional {
        /// Test before `?`.
        condition: Box<Expression>,
        /// Value between `?` and `:`.
        consequent: Box<Expression>,
        /// Value after `:`.
        alternate: Box<Expression>,
    },
    /// A literal value.
    Literal {
        /// The value.
        value: Literal,
    },
    /// Text that matched no other form.
    Unknown {
        /// The trimmed source text.
        raw: String,
    },
}

impl Expression {
    #[must_use]
    /// Parse `text` into an expression. Never fails.
    pub fn parse(text: &str) -> Self {
        parse_expression(text)
    }

    #[must_use]
    /// Short name of the node type, matching its serialised `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Identifier { .. } => "identifier",
            Self::PropertyAccess { .. } => "property_access",
            Self::Call { .. } => "call",
            Self::Binary { .. } => "binary",
            Self::Unary { .. } => "unary",
            Self::Conditional { .. } => "conditional",
            Self::Literal { .. } => "literal",
            Self::Unknown { .. } => "unknown",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier { name } => f.write_str(name),
            Self::PropertyAccess { object, property } => write!(f, "{object}.{property}"),
            Self::Call { callee, args } => {
                write!(f, "{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            Self::Binary { op, left, right } => write!(f, "{left} {} {right}", op.symbol()),
            Self::Unary { op, operand } => write!(f, "{}{operand}", op.symbol()),
            Self::Conditional {
                condition,
                consequent,
                alternate,
            } => write!(f, "{condition} ? {consequent} : {alternate}"),
            Self::Literal { value } => match value {
                Literal::String(s) => write!(f, "{s:?}"),
                Literal::Number(n) => write!(f, "{n}"),
                Literal::Bool(b) => write!(f, "{b}"),
            },
            Self::Unknown { raw } => f.write_str(raw),
        }
    }
}

#[must_use]
/// Parse `text` into an expression. Never fails.
pub fn parse_expression(text: &str) -> Expression {
    let text = text.trim();
    if text.is_empty() {
        return Expression::Unknown { raw: String::new() };
    }

    if let Some((condition, consequent, alternate)) = split_ternary(text) {
        return Expression::Conditional {
            condition: Box::new(parse_expression(condition)),
            consequent: Box::new(parse_expression(consequent)),
            alternate: Box::new(parse_expression(alternate)),
        };
    }

    if let Some((op, left, right)) = split_binary(text) {
        return Expression::Binary {
            op,
            left: Box::new(parse_expression(left)),
            right: Box::new(parse_expression(right)),
        };
    }

    if let Some((op, operand)) = split_unary(text) {
        return Expression::Unary {
            op,
            operand: Box::new(parse_expression(operand)),
        };
    }

    if let Some(inner) = strip_group(text) {
        return parse_expression(inner);
    }

    if let Some((callee, args)) = split_call(text) {
        return Expression::Call {
            callee: Box::new(parse_expression(callee)),
            args: args.into_iter().map(parse_expression).collect(),
        };
    }

    if let Some((object, property)) = split_property(text) {
        return Expression::PropertyAccess {
            object: Box::new(parse_expression(object)),
            property: property.to_string(),
        };
    }

    if let Some(value) = parse_literal(text) {
        return Expression::Literal { value };
    }

    if is_identifier(text) {
        return Expression::Identifier {
            name: text.to_string(),
        };
    }

    Expression::Unknown {
        raw: text.to_string(),
    }
}

/// Byte offsets of characters that sit outside every bracket pair and string literal.
///
/// Bracket characters themselves are never reported. Depth can go negative on unbalanced input,
/// in which case nothing after the stray closer is top-level.
fn top_level(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let mut positions = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
        } else {
            match b {
                b'"' | b'\'' | b'`' => quote = Some(b),
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth -= 1,
                _ if depth == 0 => positions.push(i),
                _ => {}
            }
        }
        i += 1;
    }

    positions
}

fn split_ternary(text: &str) -> Option<(&str, &str, &str)> {
    let bytes = text.as_bytes();
    let positions = top_level(text);
    let question = positions.iter().copied().find(|&i| bytes[i] == b'?')?;
    let colon = positions
        .iter()
        .copied()
        .find(|&i| i > question && bytes[i] == b':')?;

    Some((
        text[..question].trim(),
        text[question + 1..colon].trim(),
        text[colon + 1..].trim(),
    ))
}

fn split_binary(text: &str) -> Option<(BinaryOp, &str, &str)> {
    let positions = top_level(text);

    for group in PRECEDENCE {
        for &i in &positions {
            let Some(op) = operator_at(text, i, group) else {
                continue;
            };
            let left = text[..i].trim();
            let right = text[i + op.symbol().len()..].trim();
            if !left.is_empty() && !right.is_empty() {
                return Some((op, left, right));
            }
        }
    }

    None
}

/// The operator from `group` starting at byte `i`, unless that text is only part of a longer
/// operator or a prefix sign.
fn operator_at(text: &str, i: usize, group: &[BinaryOp]) -> Option<BinaryOp> {
    let bytes = text.as_bytes();
    let before = i.checked_sub(1).map(|j| bytes[j]);

    group.iter().copied().find(|op| {
        let symbol = op.symbol().as_bytes();
        if !bytes[i..].starts_with(symbol) {
            return false;
        }
        let after = bytes.get(i + symbol.len()).copied();

        match op {
            BinaryOp::Eq | BinaryOp::StrictEq => {
                !matches!(before, Some(b'=' | b'!' | b'<' | b'>')) && after != Some(b'=')
            }
            BinaryOp::Ne | BinaryOp::StrictNe => after != Some(b'='),
            BinaryOp::Gt | BinaryOp::Lt => {
                after != Some(b'=')
                    && !matches!(before, Some(b'=' | b'<' | b'>'))
                    && !matches!(after, Some(b'<' | b'>'))
            }
            BinaryOp::Ge | BinaryOp::Le => after != Some(b'='),
            BinaryOp::Add | BinaryOp::Sub => {
                before != Some(symbol[0]) && after != Some(symbol[0]) && !is_prefix_sign(text, i)
            }
            BinaryOp::Mul => after != Some(b'*') && before != Some(b'*'),
            BinaryOp::Or | BinaryOp::And | BinaryOp::Div | BinaryOp::Rem => true,
        }
    })
}

/// A `+` or `-` with no operand before it is a sign, not an infix operator.
fn is_prefix_sign(text: &str, i: usize) -> bool {
    match text[..i].trim_end().bytes().last() {
        None => true,
        Some(b) => b"+-*/%<>=!&|?:(,[{".contains(&b),
    }
}

fn split_unary(text: &str) -> Option<(UnaryOp, &str)> {
    if let Some(rest) = text.strip_prefix('!') {
        return Some((UnaryOp::Not, rest));
    }
    let rest = text.strip_prefix('-')?;
    match rest.chars().next() {
        Some(c) if !c.is_ascii_digit() => Some((UnaryOp::Neg, rest)),
        _ => None,
    }
}

/// The inside of `( … )` when one parenthesis pair wraps the whole text.
fn strip_group(text: &str) -> Option<&str> {
    if !text.starts_with('(') || !text.ends_with(')') {
        return None;
    }
    let closer = matching_parens(text).into_iter().find(|&(open, _)| open == 0)?.1;
    (closer == text.len() - 1).then(|| &text[1..closer])
}

/// Pairs of matching `(`/`)` byte offsets, ignoring parentheses inside string literals.
fn matching_parens(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut stack = Vec::new();
    let mut pairs = Vec::new();
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' | b'`' => quote = Some(b),
                b'(' => stack.push(i),
                b')' => {
                    if let Some(open) = stack.pop() {
                        pairs.push((open, i));
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }

    pairs
}

fn split_call(text: &str) -> Option<(&str, Vec<&str>)> {
    if !text.ends_with(')') {
        return None;
    }
    let last = text.len() - 1;
    let open = matching_parens(text)
        .into_iter()
        .find(|&(_, close)| close == last)?
        .0;

    let callee = text[..open].trim();
    if callee.is_empty() {
        return None;
    }
    Some((callee, split_arguments(&text[open + 1..last])))
}

/// Split an argument list at top-level commas.
fn split_arguments(text: &str) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let bytes = text.as_bytes();
    let mut args = Vec::new();
    let mut start = 0;
    for i in top_level(text) {
        if bytes[i] == b',' {
            args.push(text[start..i].trim());
            start = i + 1;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        args.push(tail);
    }
    args
}

fn split_property(text: &str) -> Option<(&str, &str)> {
    if text.contains('(') {
        return None;
    }
    let (object, property) = text.rsplit_once('.')?;
    let object = object.trim();
    let property = property.trim();
    (!object.is_empty() && is_identifier(property)).then_some((object, property))
}

fn parse_literal(text: &str) -> Option<Literal> {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 && matches!(bytes[0], b'"' | b'\'' | b'`') && bytes[bytes.len() - 1] == bytes[0] {
        return Some(Literal::String(text[1..text.len() - 1].to_string()));
    }
    if is_number(text) {
        return text.parse().ok().map(Literal::Number);
    }
    match text {
        "true" => Some(Literal::Bool(true)),
        "false" => Some(Literal::Bool(false)),
        _ => None,
    }
}

/// `-?digits(.digits)?`
fn is_number(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    digits(whole) && fraction.is_none_or(digits)
}

/// `[A-Za-z_$][A-Za-z0-9_$]*`
pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
#[path = "tests/expression.rs"]
mod tests;
