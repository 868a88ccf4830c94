//! Per-block syntax analysis.
//!
//! The engine treats every analyzer as a black box behind [`SectionAnalyzer`]: it hands over the
//! block text and gets back an opaque tree plus any syntax diagnostics. The production analyzer
//! wraps a tree-sitter parser; tests substitute their own.

use crate::diagnostic::{ErrorKind, ParseError, Position, Severity};
use crate::grammars::Grammar;
use std::fmt;
use tree_sitter::{Parser, Tree};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Why an analyzer could not produce a result.
pub enum AnalyzerError {
    /// The grammar could not be loaded into the parser.
    Language(String),
    /// The parser returned no tree.
    NoTree,
    /// Any other failure.
    Failed(String),
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Language(msg) => write!(f, "could not load grammar: {msg}"),
            Self::NoTree => f.write_str("parser produced no tree"),
            Self::Failed(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for AnalyzerError {}

#[derive(Debug, Default)]
/// Result of analysing one block.
pub struct Analysis {
    /// Syntax tree, if the analyzer produces one.
    pub tree: Option<Tree>,
    /// Syntax diagnostics found in the block.
    pub diagnostics: Vec<ParseError>,
}

/// Something that can analyse the text of one block.
pub trait SectionAnalyzer {
    /// Analyse `text`.
    ///
    /// # Errors
    ///
    /// Returns an error when the analyzer cannot produce any result for the text.
    fn analyze(&mut self, text: &str) -> Result<Analysis, AnalyzerError>;
}

/// Tree-sitter backed analyzer for one grammar.
pub struct TreeSitterAnalyzer {
    parser: Parser,
}

impl TreeSitterAnalyzer {
    /// Creates a parser for `grammar`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Language`] if the grammar is incompatible with the linked
    /// tree-sitter runtime.
    pub fn new(grammar: &dyn Grammar) -> Result<Self, AnalyzerError> {
        let mut parser = Parser::new();
        parser
            .set_language(&grammar.language())
            .map_err(|e| AnalyzerError::Language(format!("{}: {e}", grammar.name())))?;
        Ok(Self { parser })
    }
}

impl SectionAnalyzer for TreeSitterAnalyzer {
    fn analyze(&mut self, text: &str) -> Result<Analysis, AnalyzerError> {
        let tree = self.parser.parse(text, None).ok_or(AnalyzerError::NoTree)?;
        let diagnostics = collect_diagnostics(&tree);
        Ok(Analysis {
            tree: Some(tree),
            diagnostics,
        })
    }
}

#[must_use]
/// ERROR and MISSING nodes of `tree`, in document order.
///
/// The subtree under an ERROR node is not searched further; one diagnostic per broken region is
/// enough to locate it.
pub fn collect_diagnostics(tree: &Tree) -> Vec<ParseError> {
    let mut diagnostics = Vec::new();
    if !tree.root_node().has_error() {
        return diagnostics;
    }

    let mut cursor = tree.walk();
    loop {
        let node = cursor.node();
        let position = Position::Span {
            start: node.start_position().into(),
            end: node.end_position().into(),
        };

        let descend = if node.is_error() {
            diagnostics.push(
                ParseError::new(ErrorKind::SyntaxError, Severity::Error, "Syntax error").at(position),
            );
            false
        } else if node.is_missing() {
            diagnostics.push(
                ParseError::new(
                    ErrorKind::MissingNode,
                    Severity::Error,
                    format!("Missing {}", node.kind()),
                )
                .at(position),
            );
            false
        } else {
            node.has_error()
        };

        if descend && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return diagnostics;
            }
        }
    }
}
