//! rsx: parser and structural validator for single-file RSX components.
//!
//! An RSX file holds up to four blocks: Rust backend code between `---` fences, TypeScript UI
//! logic in `<script>`, markup with `{{ … }}` directives in `<template>` and styles in `<style>`.
//! [`engine::Engine::parse`] extracts the blocks, rewrites the template's directives into
//! placeholders with a structured directive list, hands every block to its tree-sitter analyzer
//! and runs the structural rules over the result.
//!
//! ```no_run
//! use rsx::config::Config;
//! use rsx::engine::Engine;
//!
//! let mut engine = Engine::new(Config::default())?;
//! let document = engine.parse("<template><p>{{ user.name }}</p></template>");
//! println!("{}", rsx::report::generate_report(&document));
//! # Ok::<(), rsx::analyzer::AnalyzerError>(())
//! ```
#![allow(clippy::multiple_crate_versions)]

pub mod analyzer;
pub mod config;
pub mod diagnostic;
pub mod directive;
pub mod document;
pub mod engine;
pub mod expression;
pub mod extract;
pub mod grammars;
pub mod input;
pub mod preprocess;
pub mod report;
pub mod section;
pub mod validate;

#[cfg(test)]
#[path = "tests/properties.rs"]
mod properties;
