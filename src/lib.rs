//! Linter for JSON, JSONC and JSON5 documents.
//!
//! Files are parsed into the source model of [`json_lint_common`], checked by
//! the built-in [`rules`] and filtered by `eslint-disable` comments:
//!
//! ```
//! use json_lint::Linter;
//! use std::path::Path;
//!
//! let linter = Linter::with_default_rules();
//! let outcome = linter.lint_text(Path::new("settings.json"), r#"{"a": 1, "a": 2}"#);
//! assert_eq!(outcome.errors.len(), 1);
//! ```

pub mod config;
pub mod docs;
pub mod ignore;
pub mod linter;
pub mod reporter;
pub mod rules;

pub use config::{Color, ColorConfig, ColorMode, LintConfig, ValidationError};
pub use json_lint_common::{config_comment, directives, language, parser, source_code};
pub use linter::{Fix, FixOutcome, LintError, LintOutcome, Linter, Severity};
pub use reporter::{OutputFormat, Reporter};

use std::fs;
use std::path::Path;

/// Apply fixes to `content` in offset order.
///
/// A fix that overlaps one applied before it is skipped; the next lint pass
/// reports it again. Returns the new content and the number of fixes applied.
pub fn apply_fixes_to_content(content: &str, fixes: &[&Fix]) -> (String, usize) {
    let mut fixes = fixes.to_vec();
    fixes.sort_by_key(|fix| (fix.start_offset, fix.end_offset));

    let mut result = String::with_capacity(content.len());
    let mut cursor = 0;
    let mut fix_count = 0;

    for fix in fixes {
        if fix.start_offset < cursor
            || fix.start_offset > fix.end_offset
            || fix.end_offset > content.len()
            || !content.is_char_boundary(fix.start_offset)
            || !content.is_char_boundary(fix.end_offset)
        {
            continue;
        }
        result.push_str(&content[cursor..fix.start_offset]);
        result.push_str(&fix.new_text);
        cursor = fix.end_offset;
        fix_count += 1;
    }

    result.push_str(&content[cursor..]);
    (result, fix_count)
}

/// Apply fixes to a file
/// Returns the number of fixes applied
pub fn apply_fixes(path: &Path, errors: &[LintError]) -> std::io::Result<usize> {
    let content = fs::read_to_string(path)?;
    let fixes: Vec<&Fix> = errors.iter().filter_map(|e| e.fix.as_ref()).collect();

    let (fixed, fix_count) = apply_fixes_to_content(&content, &fixes);
    if fix_count > 0 {
        fs::write(path, fixed)?;
    }

    Ok(fix_count)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::{LintConfig, RuleConfig};
    use crate::language::File;
    use crate::linter::{LintError, Linter, RuleSeverity};
    use crate::parser::LanguageMode;
    use crate::rules::all_rules;
    use serde_json::Value;

    /// Linter with only `rule` enabled, at error level
    fn single_rule_linter(rule: &str, options: Value, mode: LanguageMode) -> Linter {
        let mut config = LintConfig::default();
        config.language.mode = Some(mode);
        for other in all_rules() {
            config.rules.insert(
                other.name().to_string(),
                RuleConfig {
                    severity: Some(RuleSeverity::Off),
                    options: Vec::new(),
                },
            );
        }
        config.rules.insert(
            rule.to_string(),
            RuleConfig {
                severity: Some(RuleSeverity::Error),
                options: options.as_array().cloned().unwrap_or_default(),
            },
        );
        Linter::with_config(Some(&config)).expect("test options are valid")
    }

    pub fn lint_with_options(
        rule: &str,
        options: Value,
        text: &str,
        mode: LanguageMode,
    ) -> Vec<LintError> {
        single_rule_linter(rule, options, mode)
            .lint_source(&File::new("test.json", text))
            .errors
    }

    pub fn lint_with_rule(rule: &str, text: &str, mode: LanguageMode) -> Vec<LintError> {
        lint_with_options(rule, Value::Array(Vec::new()), text, mode)
    }

    /// Fixed text and the number of errors left after fixing
    pub fn fix_with_options(
        rule: &str,
        options: Value,
        text: &str,
        mode: LanguageMode,
    ) -> (String, usize) {
        let fixed = single_rule_linter(rule, options, mode).fix_source(&File::new("test.json", text));
        (fixed.content, fixed.outcome.errors.len())
    }

    pub fn messages(errors: &[LintError]) -> Vec<&str> {
        errors.iter().map(|e| e.message.as_str()).collect()
    }
}
