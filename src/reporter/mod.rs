mod errorformat;
mod github_actions;
mod json;

use crate::LintError;
use crate::config::ColorConfig;
use std::cmp::Ordering;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    ErrorFormat,
    Json,
    GithubActions,
}

pub struct Reporter {
    format: OutputFormat,
    colors: ColorConfig,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colors: ColorConfig::default(),
        }
    }

    pub fn with_colors(format: OutputFormat, colors: ColorConfig) -> Self {
        Self { format, colors }
    }

    pub fn report(&self, errors: &[LintError], path: &Path, ignored_count: usize) {
        match self.format {
            OutputFormat::ErrorFormat => {
                errorformat::report(errors, path, &self.colors, ignored_count)
            }
            OutputFormat::Json => json::report(errors, path, ignored_count),
            OutputFormat::GithubActions => github_actions::report(errors, path),
        }
    }
}

/// Errors ordered by line, then column. Errors without a location go last.
fn sorted(errors: &[LintError]) -> Vec<&LintError> {
    fn by_option(a: Option<usize>, b: Option<usize>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    let mut sorted: Vec<_> = errors.iter().collect();
    sorted.sort_by(|a, b| by_option(a.line, b.line).then_with(|| by_option(a.column, b.column)));
    sorted
}

#[cfg(test)]
pub(crate) fn make_error(
    rule: Option<&str>,
    category: &str,
    message: &str,
    severity: crate::Severity,
    line: Option<usize>,
    column: Option<usize>,
) -> LintError {
    let error = match rule {
        Some(rule) => LintError::new(rule, category, message, severity),
        None => LintError::without_rule(category, message, severity),
    };
    LintError {
        line,
        column,
        ..error
    }
}
