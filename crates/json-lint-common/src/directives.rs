//! Inline directive comments.
//!
//! Comments can suppress problems or reconfigure rules for the document:
//!
//! ```jsonc
//! /* eslint sort-keys: [warn, desc] */
//! {
//!   // eslint-disable-next-line no-empty-keys -- required by the API
//!   "": 1,
//!   "a": 2 // eslint-disable-line no-duplicate-keys
//! }
//! ```
//!
//! | Label | Effect |
//! |-------|--------|
//! | `eslint-disable` | suppress the listed rules (or all) until a matching `eslint-enable` |
//! | `eslint-enable` | end a previous `eslint-disable` |
//! | `eslint-disable-line` | suppress on the comment's own line |
//! | `eslint-disable-next-line` | suppress on the line after the comment |
//! | `eslint` | set rule severities and options |
//!
//! Malformed comments never abort the run; they are returned as [`Problem`]s
//! next to everything that did parse.

use crate::config_comment::{self, DIRECTIVE_LABEL};
use crate::source_code::JsonSourceCode;
use json_lint_parser::ast::Span;
use json_lint_parser::lexer::Token;
use serde_json::{Map, Value};
use std::fmt;

/// Suppression directive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Disable,
    Enable,
    DisableLine,
    DisableNextLine,
}

impl DirectiveKind {
    /// Map a comment label (`eslint-disable`, ...) to its kind.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "eslint-disable" => Some(DirectiveKind::Disable),
            "eslint-enable" => Some(DirectiveKind::Enable),
            "eslint-disable-line" => Some(DirectiveKind::DisableLine),
            "eslint-disable-next-line" => Some(DirectiveKind::DisableNextLine),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DirectiveKind::Disable => "disable",
            DirectiveKind::Enable => "enable",
            DirectiveKind::DisableLine => "disable-line",
            DirectiveKind::DisableNextLine => "disable-next-line",
        }
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed suppression comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    /// Comma separated rule selectors; empty means every rule.
    pub value: String,
    pub justification: String,
    pub comment: Token,
}

impl Directive {
    pub fn rule_names(&self) -> Vec<String> {
        config_comment::parse_list_config(&self.value)
    }

    pub fn applies_to_all(&self) -> bool {
        self.rule_names().is_empty()
    }
}

/// A malformed directive comment. Never attributed to a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub rule_id: Option<String>,
    pub message: String,
    pub loc: Span,
}

impl Problem {
    fn new(message: impl Into<String>, loc: Span) -> Self {
        Self {
            rule_id: None,
            message: message.into(),
            loc,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisableDirectives {
    pub directives: Vec<Directive>,
    pub problems: Vec<Problem>,
}

/// Rule settings read from one `eslint` comment.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineRuleConfig {
    pub rules: Map<String, Value>,
    pub loc: Span,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineConfig {
    pub configs: Vec<InlineRuleConfig>,
    pub problems: Vec<Problem>,
}

impl JsonSourceCode {
    /// Comments whose payload starts with a directive label, in source order.
    pub fn get_inline_config_nodes(&self) -> &[Token] {
        self.inline_config_nodes.get_or_init(|| {
            let nodes: Vec<Token> = self
                .comments()
                .iter()
                .filter(|comment| DIRECTIVE_LABEL.is_match(self.comment_value(comment)))
                .copied()
                .collect();
            tracing::debug!(count = nodes.len(), "found inline config comments");
            nodes
        })
    }

    /// Suppression directives and the problems found while reading them.
    pub fn get_disable_directives(&self) -> DisableDirectives {
        let mut result = DisableDirectives::default();

        for comment in self.get_inline_config_nodes() {
            let Some(text) = config_comment::parse_directive(self.comment_value(comment)) else {
                continue;
            };
            let Some(kind) = DirectiveKind::from_label(text.label) else {
                continue;
            };

            if kind == DirectiveKind::DisableLine
                && comment.span.start.line != comment.span.end.line
            {
                result.problems.push(Problem::new(
                    format!(
                        "{} comment should not span multiple lines.",
                        text.label
                    ),
                    comment.span,
                ));
                continue;
            }

            result.directives.push(Directive {
                kind,
                value: text.value.to_string(),
                justification: text.justification.to_string(),
                comment: *comment,
            });
        }

        result
    }

    /// Rule configurations from `eslint` comments and the problems found
    /// while reading them.
    pub fn apply_inline_config(&self) -> InlineConfig {
        let mut result = InlineConfig::default();

        for comment in self.get_inline_config_nodes() {
            let Some(text) = config_comment::parse_directive(self.comment_value(comment)) else {
                continue;
            };
            if text.label != "eslint" {
                continue;
            }

            match config_comment::parse_json_like_config(text.value) {
                Ok(rules) => result.configs.push(InlineRuleConfig {
                    rules,
                    loc: comment.span,
                }),
                Err(e) => {
                    tracing::debug!(error = %e, line = comment.span.start.line, "invalid inline config");
                    result.problems.push(Problem::new(e.to_string(), comment.span));
                }
            }
        }

        result
    }
}
