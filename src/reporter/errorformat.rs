use super::sorted;
use crate::LintError;
use crate::Severity;
use crate::config::{Color, ColorConfig};
use colored::{ColoredString, Colorize};
use std::path::Path;

pub(crate) fn report(
    errors: &[LintError],
    path: &Path,
    colors: &ColorConfig,
    ignored_count: usize,
) {
    for error in sorted(errors) {
        let color = match error.severity {
            Severity::Error => colors.error,
            Severity::Warning => colors.warning,
        };
        let label = apply_color(&label(error), color).bold();
        println!("{}: {}: {}", location(error, path), label, error.message);
    }

    if let Some(summary) = summary(errors, ignored_count) {
        println!();
        println!("{}", summary);
    }
}

fn location(error: &LintError, path: &Path) -> String {
    let path_str = path.display();
    match (error.line, error.column) {
        (Some(line), Some(col)) => format!("{}:{}:{}", path_str, line, col),
        (Some(line), None) => format!("{}:{}", path_str, line),
        _ => format!("{}", path_str),
    }
}

/// `error[category/rule]`, with `-` for errors that have no rule
fn label(error: &LintError) -> String {
    let severity = match error.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    format!("{}[{}/{}]", severity, error.category, error.rule_name())
}

fn summary(errors: &[LintError], ignored_count: usize) -> Option<String> {
    let error_count = errors
        .iter()
        .filter(|e| e.severity == Severity::Error)
        .count();
    let warning_count = errors
        .iter()
        .filter(|e| e.severity == Severity::Warning)
        .count();
    let fixable_count = errors.iter().filter(|e| e.fix.is_some()).count();

    let mut parts = Vec::new();
    if error_count > 0 {
        parts.push(format!("{} error(s)", error_count));
    }
    if warning_count > 0 {
        parts.push(format!("{} warning(s)", warning_count));
    }
    if ignored_count > 0 {
        parts.push(format!("{} ignored", ignored_count));
    }
    if parts.is_empty() {
        return None;
    }

    let mut summary = format!("Found {}", parts.join(", "));
    if fixable_count > 0 {
        summary.push_str(&format!(
            " ({} fixable with --fix)",
            fixable_count
        ));
    }
    Some(summary)
}

#[cfg(test)]
fn format_line(error: &LintError, path: &Path) -> String {
    format!("{}: {}: {}", location(error, path), label(error), error.message)
}

/// Apply a color to a string
fn apply_color(s: &str, color: Color) -> ColoredString {
    match color {
        Color::Black => s.black(),
        Color::Red => s.red(),
        Color::Green => s.green(),
        Color::Yellow => s.yellow(),
        Color::Blue => s.blue(),
        Color::Magenta => s.magenta(),
        Color::Cyan => s.cyan(),
        Color::White => s.white(),
        Color::BrightBlack => s.bright_black(),
        Color::BrightRed => s.bright_red(),
        Color::BrightGreen => s.bright_green(),
        Color::BrightYellow => s.bright_yellow(),
        Color::BrightBlue => s.bright_blue(),
        Color::BrightMagenta => s.bright_magenta(),
        Color::BrightCyan => s.bright_cyan(),
        Color::BrightWhite => s.bright_white(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linter::Fix;
    use crate::reporter::make_error;

    #[test]
    fn test_error_format_line() {
        let error = make_error(
            Some("no-duplicate-keys"),
            "problem",
            "Duplicate key \"a\" found.",
            Severity::Error,
            Some(10),
            Some(5),
        );
        let path = Path::new("package.json");
        assert_eq!(
            format_line(&error, path),
            "package.json:10:5: error[problem/no-duplicate-keys]: Duplicate key \"a\" found."
        );
    }

    #[test]
    fn test_warning_format_line() {
        let error = make_error(
            Some("sort-keys"),
            "suggestion",
            "Keys are not sorted",
            Severity::Warning,
            Some(3),
            Some(1),
        );
        let path = Path::new("tsconfig.json");
        assert_eq!(
            format_line(&error, path),
            "tsconfig.json:3:1: warning[suggestion/sort-keys]: Keys are not sorted"
        );
    }

    #[test]
    fn test_format_line_without_rule() {
        let error = make_error(
            None,
            "syntax",
            "Unexpected token",
            Severity::Error,
            Some(5),
            None,
        );
        let path = Path::new("data.json");
        assert_eq!(
            format_line(&error, path),
            "data.json:5: error[syntax/-]: Unexpected token"
        );
    }

    #[test]
    fn test_format_line_without_line_and_column() {
        let error = make_error(
            Some("top-level-interop"),
            "problem",
            "Something is wrong",
            Severity::Error,
            None,
            None,
        );
        let path = Path::new("conf/data.json");
        assert_eq!(
            format_line(&error, path),
            "conf/data.json: error[problem/top-level-interop]: Something is wrong"
        );
    }

    #[test]
    fn test_summary() {
        assert_eq!(summary(&[], 0), None);
        assert_eq!(summary(&[], 2), Some("Found 2 ignored".to_string()));

        let errors = vec![
            make_error(Some("a"), "problem", "m", Severity::Error, Some(1), None),
            make_error(Some("b"), "suggestion", "m", Severity::Warning, Some(2), None)
                .with_fix(Fix::replace_range(0, 1, "")),
        ];
        assert_eq!(
            summary(&errors, 1),
            Some("Found 1 error(s), 1 warning(s), 1 ignored (1 fixable with --fix)".to_string())
        );
    }
}
