//! Suppression of lint errors by `eslint-disable` comments
//!
//! ```jsonc
//! /* eslint-disable sort-keys */
//! { "b": 1, "a": 2 }
//! /* eslint-enable sort-keys */
//!
//! // eslint-disable-next-line no-empty-keys -- required by the API
//! { "": 1 }
//! ```
//!
//! - `eslint-disable` / `eslint-enable`: block state, applied in document order
//! - `eslint-disable-line`: the comment's own line
//! - `eslint-disable-next-line`: the line after the comment ends
//!
//! Without rule names a directive applies to every rule. Errors without a
//! rule (syntax errors, directive problems) are never suppressed.

use crate::directives::{Directive, DirectiveKind};
use crate::linter::{LintError, Severity, bare_rule_name};
use std::collections::{HashMap, HashSet};

/// Category used for problems that come from directive comments
pub const INLINE_CONFIG_CATEGORY: &str = "inline-config";

/// Result of filtering errors with disable directives
#[derive(Debug)]
pub struct FilterResult {
    /// Errors that were not suppressed
    pub errors: Vec<LintError>,
    /// Number of errors that were suppressed
    pub ignored_count: usize,
    /// Warnings for directives that suppressed nothing
    pub unused_warnings: Vec<LintError>,
}

/// Rules suppressed by a directive so far
#[derive(Debug, Default)]
struct Usage {
    any: bool,
    rules: HashSet<String>,
}

/// Block disable/enable state at one point of the document.
#[derive(Debug, Default)]
struct BlockState {
    /// Directive that disabled every rule
    all: Option<usize>,
    /// Rules re-enabled while every rule is disabled
    reenabled: HashSet<String>,
    /// Rules disabled by name, with the directive that did it
    rules: HashMap<String, usize>,
}

impl BlockState {
    fn apply(&mut self, index: usize, directive: &Directive) {
        let names = directive_rules(directive);
        match directive.kind {
            DirectiveKind::Disable if names.is_empty() => {
                self.all = Some(index);
                self.reenabled.clear();
            }
            DirectiveKind::Disable => {
                for name in names {
                    self.reenabled.remove(&name);
                    self.rules.insert(name, index);
                }
            }
            DirectiveKind::Enable if names.is_empty() => {
                self.all = None;
                self.reenabled.clear();
                self.rules.clear();
            }
            DirectiveKind::Enable => {
                for name in names {
                    self.rules.remove(&name);
                    if self.all.is_some() {
                        self.reenabled.insert(name);
                    }
                }
            }
            DirectiveKind::DisableLine | DirectiveKind::DisableNextLine => {}
        }
    }

    fn suppressing(&self, rule: &str) -> Option<usize> {
        self.rules.get(rule).copied().or_else(|| {
            self.all
                .filter(|_| !self.reenabled.contains(rule))
        })
    }
}

fn directive_rules(directive: &Directive) -> Vec<String> {
    directive
        .rule_names()
        .iter()
        .map(|name| bare_rule_name(name).to_string())
        .collect()
}

/// Line a line directive applies to.
fn target_line(directive: &Directive) -> Option<usize> {
    match directive.kind {
        DirectiveKind::DisableLine => Some(directive.comment.span.start.line),
        DirectiveKind::DisableNextLine => Some(directive.comment.span.end.line + 1),
        DirectiveKind::Disable | DirectiveKind::Enable => None,
    }
}

fn position(error: &LintError) -> (usize, usize) {
    (error.line.unwrap_or(0), error.column.unwrap_or(0))
}

/// Filter errors using the directives of one document, in document order
pub fn filter_errors(
    mut errors: Vec<LintError>,
    directives: &[Directive],
    report_unused: bool,
) -> FilterResult {
    errors.sort_by_key(position);

    let mut usage: Vec<Usage> = directives.iter().map(|_| Usage::default()).collect();
    let rule_names: Vec<Vec<String>> = directives.iter().map(directive_rules).collect();

    let block: Vec<usize> = (0..directives.len())
        .filter(|&i| target_line(&directives[i]).is_none())
        .collect();
    let mut next_block = 0;
    let mut state = BlockState::default();

    let mut remaining = Vec::new();
    let mut ignored_count = 0;

    for error in errors {
        while let Some(&index) = block.get(next_block) {
            let start = directives[index].comment.span.start;
            if (start.line, start.column) > position(&error) {
                break;
            }
            state.apply(index, &directives[index]);
            next_block += 1;
        }

        let Some(rule) = error.rule.as_deref() else {
            remaining.push(error);
            continue;
        };

        let line = error.line.unwrap_or(0);
        let by_line = (0..directives.len()).find(|&i| {
            target_line(&directives[i]) == Some(line)
                && (rule_names[i].is_empty() || rule_names[i].iter().any(|n| n == rule))
        });

        match by_line.or_else(|| state.suppressing(rule)) {
            Some(index) => {
                usage[index].any = true;
                usage[index].rules.insert(rule.to_string());
                ignored_count += 1;
            }
            None => remaining.push(error),
        }
    }

    tracing::debug!(ignored = ignored_count, "applied disable directives");

    let unused_warnings = if report_unused {
        unused_directive_warnings(directives, &rule_names, &usage)
    } else {
        Vec::new()
    };

    FilterResult {
        errors: remaining,
        ignored_count,
        unused_warnings,
    }
}

fn unused_directive_warnings(
    directives: &[Directive],
    rule_names: &[Vec<String>],
    usage: &[Usage],
) -> Vec<LintError> {
    let mut warnings = Vec::new();

    for ((directive, names), used) in directives.iter().zip(rule_names).zip(usage) {
        if directive.kind == DirectiveKind::Enable {
            continue;
        }
        let label = format!("eslint-{}", directive.kind);
        let messages: Vec<String> = if names.is_empty() {
            if used.any {
                continue;
            }
            vec![format!(
                "Unused {} directive (no problems were reported).",
                label
            )]
        } else {
            names
                .iter()
                .filter(|name| !used.rules.contains(*name))
                .map(|name| {
                    format!(
                        "Unused {} directive (no problems were reported from '{}').",
                        label, name
                    )
                })
                .collect()
        };

        for message in messages {
            warnings.push(
                LintError::without_rule(INLINE_CONFIG_CATEGORY, &message, Severity::Warning)
                    .with_span(directive.comment.span),
            );
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{File, JsonLanguage, LanguageOptions, ParseOutcome};
    use crate::parser::LanguageMode;
    use crate::source_code::JsonSourceCode;

    fn source(text: &str) -> JsonSourceCode {
        let language = JsonLanguage::new(LanguageMode::Jsonc);
        let file = File::new("test.jsonc", text);
        let ParseOutcome::Ok(doc) = language.parse(&file, &LanguageOptions::default()) else {
            panic!("test document must parse");
        };
        language.create_source_code(&file, doc)
    }

    fn error(rule: &str, line: usize, column: usize) -> LintError {
        LintError::new(rule, "problem", "message", Severity::Error).with_location(line, column)
    }

    fn run(text: &str, errors: Vec<LintError>) -> FilterResult {
        let directives = source(text).get_disable_directives().directives;
        filter_errors(errors, &directives, true)
    }

    #[test]
    fn test_block_disable_and_enable() {
        let text = "{\n/* eslint-disable */\n\"a\": 1,\n/* eslint-enable */\n\"b\": 2\n}";
        let result = run(text, vec![error("sort-keys", 3, 1), error("sort-keys", 5, 1)]);
        assert_eq!(result.ignored_count, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, Some(5));
        assert!(result.unused_warnings.is_empty());
    }

    #[test]
    fn test_disable_specific_rule() {
        let text = "// eslint-disable json/sort-keys\n{}";
        let result = run(
            text,
            vec![error("sort-keys", 2, 1), error("no-empty-keys", 2, 2)],
        );
        assert_eq!(result.ignored_count, 1);
        assert_eq!(result.errors[0].rule.as_deref(), Some("no-empty-keys"));
    }

    #[test]
    fn test_enable_one_rule_inside_disable_all() {
        let text = "// eslint-disable\n// eslint-enable sort-keys\n{}";
        let result = run(
            text,
            vec![error("sort-keys", 3, 1), error("no-empty-keys", 3, 1)],
        );
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].rule.as_deref(), Some("sort-keys"));
    }

    #[test]
    fn test_errors_before_disable_are_kept() {
        let text = "{\"\": 1,\n/* eslint-disable */\n\"b\": 2}";
        let result = run(text, vec![error("no-empty-keys", 1, 2)]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.unused_warnings.len(), 1);
        assert_eq!(
            result.unused_warnings[0].message,
            "Unused eslint-disable directive (no problems were reported)."
        );
    }

    #[test]
    fn test_disable_line_and_next_line() {
        let text = "{\n\"\": 1, // eslint-disable-line no-empty-keys\n// eslint-disable-next-line\n\"\": 2\n}";
        let result = run(
            text,
            vec![
                error("no-empty-keys", 2, 1),
                error("no-empty-keys", 4, 1),
                error("no-duplicate-keys", 4, 1),
            ],
        );
        assert_eq!(result.ignored_count, 3);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_next_line_counts_from_comment_end() {
        let text = "{\n/* eslint-disable-next-line\n   no-empty-keys */\n\"\": 1\n}";
        let result = run(text, vec![error("no-empty-keys", 4, 1)]);
        assert_eq!(result.ignored_count, 1);
    }

    #[test]
    fn test_rule_less_errors_are_never_suppressed() {
        let text = "// eslint-disable\n{}";
        let problem = LintError::without_rule(INLINE_CONFIG_CATEGORY, "bad", Severity::Error)
            .with_location(2, 1);
        let result = run(text, vec![problem]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.ignored_count, 0);
    }

    #[test]
    fn test_unused_rule_is_named() {
        let text = "{} // eslint-disable-line sort-keys, no-empty-keys";
        let result = run(text, vec![error("sort-keys", 1, 1)]);
        assert_eq!(result.ignored_count, 1);
        assert_eq!(result.unused_warnings.len(), 1);
        let warning = &result.unused_warnings[0];
        assert_eq!(
            warning.message,
            "Unused eslint-disable-line directive (no problems were reported from 'no-empty-keys')."
        );
        assert_eq!(warning.rule, None);
        assert_eq!(warning.severity, Severity::Warning);
        assert_eq!(warning.column, Some(4));
    }

    #[test]
    fn test_unused_not_reported_when_disabled() {
        let directives = source("// eslint-disable\n{}").get_disable_directives().directives;
        let result = filter_errors(Vec::new(), &directives, false);
        assert!(result.unused_warnings.is_empty());
    }
}
