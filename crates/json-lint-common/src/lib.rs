//! Core types shared by the json-lint host and its rules.
//!
//! This crate sits between the parser and the lint host: it wraps a parsed
//! document in a queryable source model, reads inline directive comments,
//! and defines the rule and diagnostic types.
//!
//! # Modules
//!
//! - [`language`] - [`JsonLanguage`]: option validation, parsing and source creation
//! - [`source_code`] - [`JsonSourceCode`]: text, locations, traversal, token navigation
//! - [`directives`] - `eslint-disable` / `eslint` comments read from a source
//! - [`config_comment`] - parsing of directive payloads
//! - [`linter`] - [`LintRule`], [`RuleVisitor`], [`LintError`], [`Severity`], [`Fix`]
//! - [`position`] - offset to line/column conversion
//! - [`docs`] - [`RuleDoc`]
//!
//! # Quick reference
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`JsonSourceCode`] | Source model handed to rules |
//! | [`LintRule`] | Trait that every rule implements |
//! | [`RuleVisitor`] | Per-file state a rule keeps while the tree is walked |
//! | [`LintError`] | A single diagnostic with location, severity and optional fix |
//! | [`Linter`] | Holds rules and dispatches traversal steps to them |
//!
//! # Re-exports
//!
//! The [`parser`] module re-exports the entire [`json_lint_parser`] crate.

pub mod config_comment;
pub mod directives;
pub mod docs;
pub mod language;
pub mod linter;
pub mod position;
pub mod source_code;

// Re-export parser crate
pub use json_lint_parser as parser;

// Re-export commonly used types
pub use directives::{
    Directive, DirectiveKind, DisableDirectives, InlineConfig, InlineRuleConfig, Problem,
};
pub use docs::RuleDoc;
pub use language::{File, JsonLanguage, LanguageOptions, ParseOutcome, ParseProblem};
pub use linter::{
    Fix, LintError, LintRule, Linter, Listener, RULE_CATEGORIES, RuleContext, RuleInstance,
    RuleOptionsError, RuleSeverity, RuleVisitor, Severity,
};
pub use position::LineIndex;
pub use source_code::{Element, JsonSourceCode, Phase, TraversalStep};
