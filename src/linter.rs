use crate::apply_fixes_to_content;
use crate::config::{ConfigError, LintConfig};
use crate::directives::Problem;
use crate::ignore::{INLINE_CONFIG_CATEGORY, filter_errors};
use crate::language::{File, JsonLanguage, LanguageOptions, ParseOutcome, ParseProblem};
use crate::parser::LanguageMode;
use crate::parser::ast::Span;
use crate::source_code::JsonSourceCode;
use json_lint_common::linter::Linter as Dispatcher;
use serde_json::{Map, Value};

pub use json_lint_common::linter::{
    Fix, LintError, LintRule, Listener, RULE_CATEGORIES, RULE_NAMESPACE, RuleContext,
    RuleInstance, RuleOptionsError, RuleSeverity, RuleVisitor, Severity, bare_rule_name,
    rule_matches,
};

/// Maximum number of lint-and-fix rounds run by [`Linter::fix_source`]
pub const MAX_FIX_PASSES: usize = 10;

/// Errors left in a document together with the number of suppressed ones
#[derive(Debug, Clone, Default)]
pub struct LintOutcome {
    pub errors: Vec<LintError>,
    pub suppressed_count: usize,
}

impl LintOutcome {
    pub fn has_fatal_error(&self) -> bool {
        self.errors.iter().any(|e| e.fatal)
    }
}

/// Fixed text and the lint result for it
#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub content: String,
    pub fix_count: usize,
    pub outcome: LintOutcome,
}

#[derive(Debug, Clone)]
struct RuleSetting {
    severity: RuleSeverity,
    options: Vec<Value>,
}

/// One configuration of a rule, active from `start` up to `end` (byte offsets).
struct Segment {
    rule: usize,
    start: usize,
    end: usize,
    severity: Severity,
}

pub struct Linter {
    rules: Dispatcher,
    settings: Vec<RuleSetting>,
    language_mode: Option<LanguageMode>,
    language_options: Map<String, Value>,
    report_unused_disable_directives: bool,
}

impl Linter {
    pub fn new() -> Self {
        Self {
            rules: Dispatcher::new(),
            settings: Vec::new(),
            language_mode: None,
            language_options: Map::new(),
            report_unused_disable_directives: false,
        }
    }

    pub fn with_default_rules() -> Self {
        let mut linter = Self::new();
        for rule in crate::rules::all_rules() {
            linter.add_rule(rule);
        }
        linter
    }

    /// Register every built-in rule with the severities and options of
    /// `config`. Rules that are off stay registered so inline `eslint`
    /// comments can turn them on.
    pub fn with_config(config: Option<&LintConfig>) -> Result<Self, ConfigError> {
        let mut linter = Self::with_default_rules();
        let Some(config) = config else {
            return Ok(linter);
        };

        for index in 0..linter.settings.len() {
            let rule = &linter.rules.rules()[index];
            let severity = config.rule_severity(rule.as_ref());
            let options = config.rule_options(rule.name()).to_vec();
            rule.create(&options)
                .map_err(|e| ConfigError::InvalidRuleOptions {
                    rule: rule.name().to_string(),
                    message: e.to_string(),
                })?;
            linter.settings[index] = RuleSetting { severity, options };
        }

        linter.language_mode = config.language.mode;
        linter.language_options = config.language_options();
        linter.report_unused_disable_directives = config.linter.report_unused_disable_directives;
        Ok(linter)
    }

    /// Add a rule with its default severity and no options
    pub fn add_rule(&mut self, rule: Box<dyn LintRule>) {
        self.settings.push(RuleSetting {
            severity: rule.default_severity(),
            options: Vec::new(),
        });
        self.rules.add_rule(rule);
    }

    /// Get a reference to all rules
    pub fn rules(&self) -> &[Box<dyn LintRule>] {
        self.rules.rules()
    }

    /// Base severity of a rule, before inline configuration
    pub fn rule_severity(&self, name: &str) -> Option<RuleSeverity> {
        self.rules
            .rule_index(name)
            .map(|index| self.settings[index].severity)
    }

    pub fn set_report_unused_disable_directives(&mut self, report: bool) {
        self.report_unused_disable_directives = report;
    }

    /// Language used for `path`: the configured mode, else the extension
    pub fn language_for(&self, path: &std::path::Path) -> JsonLanguage {
        match self.language_mode {
            Some(mode) => JsonLanguage::new(mode),
            None => JsonLanguage::for_path(path),
        }
    }

    fn language_options(&self, language: &JsonLanguage) -> LanguageOptions {
        if language.mode() != LanguageMode::Jsonc {
            return LanguageOptions::default();
        }
        language
            .validate_language_options(&self.language_options)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring language options");
                LanguageOptions::default()
            })
    }

    /// Parse and lint one file
    #[tracing::instrument(level = "debug", skip_all, fields(path = %file.path.display()))]
    pub fn lint_source(&self, file: &File) -> LintOutcome {
        let language = self.language_for(&file.path);
        let options = self.language_options(&language);

        match language.parse(file, &options) {
            ParseOutcome::Ok(document) => {
                let source = language.create_source_code(file, document);
                self.lint_source_code(&source)
            }
            ParseOutcome::Err(problems) => LintOutcome {
                errors: problems.iter().map(parse_problem_error).collect(),
                suppressed_count: 0,
            },
        }
    }

    /// Lint `content` as if it were the file at `path`
    pub fn lint_text(&self, path: &std::path::Path, content: &str) -> LintOutcome {
        self.lint_source(&File::new(path, content))
    }

    /// Run every active rule over a parsed document and apply directives
    pub fn lint_source_code(&self, source: &JsonSourceCode) -> LintOutcome {
        let mut problems = Vec::new();

        let (mut instances, segments) = self.create_instances(source, &mut problems);
        self.rules.run(source, &mut instances);

        let mut errors = Vec::new();
        for (instance, segment) in instances.into_iter().zip(&segments) {
            for mut error in instance.errors {
                let offset = error.offset.unwrap_or(0);
                if offset < segment.start || offset >= segment.end {
                    continue;
                }
                error.severity = segment.severity;
                errors.push(error);
            }
        }
        tracing::debug!(
            rules = segments.len(),
            errors = errors.len(),
            "ran rules"
        );

        let disable = source.get_disable_directives();
        problems.extend(disable.problems.iter().map(directive_problem_error));
        for directive in &disable.directives {
            for name in directive.rule_names() {
                if self.rules.rule_index(&name).is_none() {
                    problems.push(unknown_rule_error(&name, directive.comment.span));
                }
            }
        }

        let result = filter_errors(
            errors,
            &disable.directives,
            self.report_unused_disable_directives,
        );

        let mut errors = result.errors;
        errors.extend(problems);
        errors.extend(result.unused_warnings);
        errors.sort_by_key(|e| (e.line, e.column));

        LintOutcome {
            errors,
            suppressed_count: result.ignored_count,
        }
    }

    /// Build one visitor per active configuration segment of every rule.
    /// Inline `eslint` comments start a new segment for the rules they name.
    fn create_instances(
        &self,
        source: &JsonSourceCode,
        problems: &mut Vec<LintError>,
    ) -> (Vec<RuleInstance>, Vec<Segment>) {
        let mut timeline: Vec<Vec<(usize, RuleSetting)>> = self
            .settings
            .iter()
            .map(|setting| vec![(0, setting.clone())])
            .collect();

        let inline = source.apply_inline_config();
        problems.extend(inline.problems.iter().map(directive_problem_error));

        for config in &inline.configs {
            for (selector, value) in &config.rules {
                let Some(index) = self.rules.rule_index(selector) else {
                    problems.push(unknown_rule_error(selector, config.loc));
                    continue;
                };
                let previous = timeline[index]
                    .last()
                    .map(|(_, setting)| setting.options.as_slice())
                    .unwrap_or_default();
                let setting = parse_inline_setting(value, previous).and_then(|setting| {
                    self.rules.rules()[index]
                        .create(&setting.options)
                        .map(|_| setting)
                        .map_err(|e| e.to_string())
                });
                match setting {
                    Ok(setting) => timeline[index].push((config.loc.start.offset, setting)),
                    Err(message) => problems.push(
                        LintError::without_rule(
                            INLINE_CONFIG_CATEGORY,
                            &format!(
                                "Inline configuration for rule \"{}\" is invalid: {}",
                                selector, message
                            ),
                            Severity::Error,
                        )
                        .with_span(config.loc),
                    ),
                }
            }
        }

        let mut instances = Vec::new();
        let mut segments = Vec::new();
        for (index, entries) in timeline.iter().enumerate() {
            let rule = &self.rules.rules()[index];
            for (i, (start, setting)) in entries.iter().enumerate() {
                let Some(severity) = setting.severity.to_severity() else {
                    continue;
                };
                let visitor = match rule.create(&setting.options) {
                    Ok(visitor) => visitor,
                    Err(e) => {
                        tracing::warn!(rule = rule.name(), error = %e, "skipping rule");
                        continue;
                    }
                };
                let end = entries.get(i + 1).map_or(usize::MAX, |(next, _)| *next);
                instances.push(RuleInstance {
                    rule: index,
                    visitor,
                    errors: Vec::new(),
                });
                segments.push(Segment {
                    rule: index,
                    start: *start,
                    end,
                    severity,
                });
            }
        }
        tracing::trace!(
            instances = instances.len(),
            inline_configs = inline.configs.len(),
            "created rule instances"
        );
        debug_assert!(instances.iter().zip(&segments).all(|(i, s)| i.rule == s.rule));

        (instances, segments)
    }

    /// Lint and fix `file` until no fix applies, at most [`MAX_FIX_PASSES`] times
    pub fn fix_source(&self, file: &File) -> FixOutcome {
        let mut content = file.body.clone();
        let mut fix_count = 0;
        let mut outcome = self.lint_text(&file.path, &content);

        for pass in 0..MAX_FIX_PASSES {
            let fixes: Vec<&Fix> = outcome.errors.iter().filter_map(|e| e.fix.as_ref()).collect();
            if fixes.is_empty() {
                break;
            }
            let (fixed, applied) = apply_fixes_to_content(&content, &fixes);
            if applied == 0 {
                break;
            }
            tracing::debug!(pass, applied, "applied fixes");
            fix_count += applied;
            content = fixed;
            outcome = self.lint_text(&file.path, &content);
        }

        FixOutcome {
            content,
            fix_count,
            outcome,
        }
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

/// Read an inline rule setting: a severity, or `[severity, ...options]`.
/// A bare severity keeps the options that were active before.
fn parse_inline_setting(value: &Value, previous: &[Value]) -> Result<RuleSetting, String> {
    let (severity, options) = match value {
        Value::Array(items) => match items.split_first() {
            Some((severity, [])) => (severity, previous.to_vec()),
            Some((severity, rest)) => (severity, rest.to_vec()),
            None => return Err("Expected a severity, got an empty array.".to_string()),
        },
        other => (other, previous.to_vec()),
    };

    let severity = RuleSeverity::from_json(severity).ok_or_else(|| {
        let passed = match severity {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        format!(
            "Expected severity of \"off\", 0, \"warn\", 1, \"error\", or 2. You passed \"{}\".",
            passed
        )
    })?;

    Ok(RuleSetting { severity, options })
}

fn parse_problem_error(problem: &ParseProblem) -> LintError {
    let error = LintError::without_rule("syntax", &problem.message, Severity::Error).fatal();
    match problem.loc {
        Some(loc) => LintError {
            offset: Some(loc.offset),
            ..error.with_location(loc.line, loc.column)
        },
        None => error,
    }
}

fn directive_problem_error(problem: &Problem) -> LintError {
    let error = LintError::without_rule(INLINE_CONFIG_CATEGORY, &problem.message, Severity::Error)
        .with_span(problem.loc);
    LintError {
        rule: problem.rule_id.clone(),
        ..error
    }
}

fn unknown_rule_error(name: &str, loc: Span) -> LintError {
    LintError::without_rule(
        INLINE_CONFIG_CATEGORY,
        &format!("Definition for rule '{}' was not found.", name),
        Severity::Error,
    )
    .with_span(loc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;
    use serde_json::json;
    use std::path::Path;

    fn config(rules: &[(&str, RuleSeverity, Value)]) -> LintConfig {
        let mut config = LintConfig::default();
        for (name, severity, options) in rules {
            config.rules.insert(
                name.to_string(),
                RuleConfig {
                    severity: Some(*severity),
                    options: options.as_array().cloned().unwrap_or_default(),
                },
            );
        }
        config
    }

    fn lint(linter: &Linter, path: &str, text: &str) -> LintOutcome {
        linter.lint_text(Path::new(path), text)
    }

    #[test]
    fn test_default_rules() {
        let linter = Linter::with_default_rules();
        let names: Vec<&str> = linter.rules().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec![
                "no-duplicate-keys",
                "no-empty-keys",
                "no-unnormalized-keys",
                "no-unsafe-values",
                "top-level-interop",
                "sort-keys"
            ]
        );
        assert_eq!(linter.rule_severity("json/sort-keys"), Some(RuleSeverity::Off));
        assert_eq!(linter.rule_severity("no-empty-keys"), Some(RuleSeverity::Error));
    }

    #[test]
    fn test_recommended_rules_report() {
        let linter = Linter::with_default_rules();
        let outcome = lint(&linter, "a.json", r#"{"": 1, "b": 1, "b": 2}"#);
        let rules: Vec<_> = outcome.errors.iter().map(|e| e.rule_name()).collect();
        assert_eq!(rules, vec!["no-empty-keys", "no-duplicate-keys"]);
        assert!(outcome.errors.iter().all(|e| e.severity == Severity::Error));
    }

    #[test]
    fn test_parse_error_is_fatal() {
        let linter = Linter::with_default_rules();
        let outcome = lint(&linter, "a.json", "{\"a\": 1,}");
        assert_eq!(outcome.errors.len(), 1);
        let error = &outcome.errors[0];
        assert!(error.fatal);
        assert_eq!(error.rule, None);
        assert_eq!(error.category, "syntax");
        assert_eq!(error.line, Some(1));
        assert!(outcome.has_fatal_error());
    }

    #[test]
    fn test_mode_follows_extension() {
        let linter = Linter::with_default_rules();
        assert!(lint(&linter, "a.json", "// c\n{}").has_fatal_error());
        assert!(lint(&linter, "a.jsonc", "// c\n{}").errors.is_empty());
    }

    #[test]
    fn test_configured_severity_and_options() {
        let linter = Linter::with_config(Some(&config(&[(
            "sort-keys",
            RuleSeverity::Warn,
            json!(["desc"]),
        )])))
        .unwrap();
        let outcome = lint(&linter, "a.json", r#"{"a": 1, "b": 2}"#);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].severity, Severity::Warning);
        assert!(outcome.errors[0].message.contains("descending"));
    }

    #[test]
    fn test_invalid_configured_options() {
        let result = Linter::with_config(Some(&config(&[(
            "sort-keys",
            RuleSeverity::Warn,
            json!(["sideways"]),
        )])));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidRuleOptions { ref rule, .. }) if rule == "sort-keys"
        ));
    }

    #[test]
    fn test_trailing_commas_option_applies_to_jsonc_only() {
        let mut cfg = LintConfig::default();
        cfg.language.allow_trailing_commas = Some(true);
        let linter = Linter::with_config(Some(&cfg)).unwrap();
        assert!(lint(&linter, "a.jsonc", "[1, 2,]").errors.is_empty());
        assert!(lint(&linter, "a.json", "[1, 2,]").has_fatal_error());
    }

    #[test]
    fn test_inline_config_enables_rule_from_comment() {
        let linter = Linter::with_default_rules();
        let text = "[{\"b\": 1, \"a\": 2},\n/* eslint sort-keys: warn */\n{\"b\": 1, \"a\": 2}]";
        let outcome = lint(&linter, "a.jsonc", text);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].line, Some(3));
        assert_eq!(outcome.errors[0].severity, Severity::Warning);
    }

    #[test]
    fn test_inline_config_disables_rule_from_comment() {
        let linter = Linter::with_default_rules();
        let text = "[{\"\": 1},\n// eslint json/no-empty-keys: 0\n{\"\": 2}]";
        let outcome = lint(&linter, "a.jsonc", text);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].line, Some(1));
    }

    #[test]
    fn test_inline_config_keeps_options_for_bare_severity() {
        let linter = Linter::with_config(Some(&config(&[(
            "sort-keys",
            RuleSeverity::Off,
            json!(["desc"]),
        )])))
        .unwrap();
        let outcome = lint(&linter, "a.jsonc", "/* eslint sort-keys: error */\n{\"a\": 1, \"b\": 2}");
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].message.contains("descending"));
    }

    #[test]
    fn test_inline_config_problems() {
        let linter = Linter::with_default_rules();
        let text = "/* eslint sort-keys: 3 */\n/* eslint no-such-rule: off */\n{}";
        let outcome = lint(&linter, "a.jsonc", text);
        let messages: Vec<&str> = outcome.errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Inline configuration for rule \"sort-keys\" is invalid: Expected severity of \"off\", 0, \"warn\", 1, \"error\", or 2. You passed \"3\".",
                "Definition for rule 'no-such-rule' was not found.",
            ]
        );
        assert!(outcome.errors.iter().all(|e| e.rule.is_none()));
    }

    #[test]
    fn test_disable_directives_suppress_and_count() {
        let linter = Linter::with_default_rules();
        let text = "{\n  // eslint-disable-next-line no-empty-keys\n  \"\": 1,\n  \"a\": 1, \"a\": 2 // eslint-disable-line\n}";
        let outcome = lint(&linter, "a.jsonc", text);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.suppressed_count, 2);
    }

    #[test]
    fn test_directive_problems_are_never_suppressed() {
        let linter = Linter::with_default_rules();
        let text = "/* eslint-disable */\n{\"a\": 1 /* eslint-disable-line\n*/}";
        let outcome = lint(&linter, "a.jsonc", text);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(
            outcome.errors[0].message,
            "eslint-disable-line comment should not span multiple lines."
        );
    }

    #[test]
    fn test_unknown_rule_in_disable_directive() {
        let linter = Linter::with_default_rules();
        let outcome = lint(&linter, "a.jsonc", "// eslint-disable-next-line json/nope\n{}");
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(
            outcome.errors[0].message,
            "Definition for rule 'json/nope' was not found."
        );
    }

    #[test]
    fn test_report_unused_disable_directives() {
        let mut linter = Linter::with_default_rules();
        linter.set_report_unused_disable_directives(true);
        let outcome = lint(&linter, "a.jsonc", "// eslint-disable-next-line no-empty-keys\n{\"a\": 1}");
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].severity, Severity::Warning);
    }

    #[test]
    fn test_fix_source_reaches_fixed_point() {
        let linter = Linter::with_config(Some(&config(&[(
            "sort-keys",
            RuleSeverity::Error,
            json!([]),
        )])))
        .unwrap();
        let file = File::new("a.json", "{\"c\": {\"z\": 1, \"y\": 2}, \"b\": 2, \"a\": 3}");
        let fixed = linter.fix_source(&file);
        assert_eq!(
            fixed.content,
            "{\"a\": 3, \"b\": 2, \"c\": {\"y\": 2, \"z\": 1}}"
        );
        assert_eq!(fixed.fix_count, 2);
        assert!(fixed.outcome.errors.is_empty());
    }

    #[test]
    fn test_parse_inline_setting() {
        let setting = parse_inline_setting(&json!(["warn", "desc"]), &[]).unwrap();
        assert_eq!(setting.severity, RuleSeverity::Warn);
        assert_eq!(setting.options, vec![json!("desc")]);

        let setting = parse_inline_setting(&json!(2), &[json!("asc")]).unwrap();
        assert_eq!(setting.severity, RuleSeverity::Error);
        assert_eq!(setting.options, vec![json!("asc")]);

        assert!(parse_inline_setting(&json!([]), &[]).is_err());
        assert!(parse_inline_setting(&json!("on"), &[]).is_err());
    }
}
