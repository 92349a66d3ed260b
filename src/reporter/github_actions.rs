use super::sorted;
use crate::LintError;
use crate::Severity;
use std::path::Path;

pub(crate) fn report(errors: &[LintError], path: &Path) {
    for line in format(errors, path) {
        println!("{}", line);
    }
}

/// Escape workflow command data
fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a workflow command property, which also reserves `:` and `,`
fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

pub(crate) fn format(errors: &[LintError], path: &Path) -> Vec<String> {
    let path_str = escape_property(&path.display().to_string());

    let mut lines = Vec::new();
    for error in sorted(errors) {
        let level = match error.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };

        let mut params = format!("file={}", path_str);
        if let Some(line) = error.line {
            params.push_str(&format!(",line={}", line));
        }
        if let Some(col) = error.column {
            params.push_str(&format!(",col={}", col));
        }
        if let Some(end_line) = error.end_line {
            params.push_str(&format!(",endLine={}", end_line));
        }
        if let Some(end_col) = error.end_column {
            params.push_str(&format!(",endColumn={}", end_col));
        }
        params.push_str(&format!(
            ",title={}",
            escape_property(&format!("{}/{}", error.category, error.rule_name()))
        ));

        lines.push(format!("::{} {}::{}", level, params, escape_data(&error.message)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::make_error;

    #[test]
    fn test_error_format() {
        let errors = vec![make_error(
            Some("no-duplicate-keys"),
            "problem",
            "Duplicate key \"a\" found.",
            Severity::Error,
            Some(10),
            Some(5),
        )];
        let lines = format(&errors, Path::new("package.json"));
        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines[0],
            "::error file=package.json,line=10,col=5,title=problem/no-duplicate-keys::Duplicate key \"a\" found."
        );
    }

    #[test]
    fn test_warning_format_with_end_position() {
        let mut error = make_error(
            Some("sort-keys"),
            "suggestion",
            "Keys are not sorted",
            Severity::Warning,
            Some(3),
            Some(1),
        );
        error.end_line = Some(3);
        error.end_column = Some(4);
        let lines = format(&[error], Path::new("tsconfig.json"));
        assert_eq!(
            lines[0],
            "::warning file=tsconfig.json,line=3,col=1,endLine=3,endColumn=4,title=suggestion/sort-keys::Keys are not sorted"
        );
    }

    #[test]
    fn test_without_line_and_rule() {
        let errors = vec![make_error(
            None,
            "syntax",
            "Unexpected end of input",
            Severity::Error,
            None,
            None,
        )];
        let lines = format(&errors, Path::new("conf/data.json"));
        assert_eq!(
            lines[0],
            "::error file=conf/data.json,title=syntax/-::Unexpected end of input"
        );
    }

    #[test]
    fn test_escaping() {
        let errors = vec![make_error(
            Some("no-unsafe-values"),
            "problem",
            "100% broken\nsecond line",
            Severity::Error,
            Some(1),
            Some(1),
        )];
        let lines = format(&errors, Path::new("a,b:c.json"));
        assert_eq!(
            lines[0],
            "::error file=a%2Cb%3Ac.json,line=1,col=1,title=problem/no-unsafe-values::100%25 broken%0Asecond line"
        );
    }

    #[test]
    fn test_sorted_by_line_and_column() {
        let errors = vec![
            make_error(Some("r1"), "problem", "third", Severity::Error, Some(10), Some(1)),
            make_error(Some("r2"), "problem", "first", Severity::Warning, Some(1), Some(5)),
            make_error(Some("r3"), "problem", "second", Severity::Error, Some(1), Some(10)),
        ];
        let lines = format(&errors, Path::new("data.json"));
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("::first"));
        assert!(lines[1].contains("::second"));
        assert!(lines[2].contains("::third"));
    }

    #[test]
    fn test_empty_errors() {
        assert!(format(&[], Path::new("data.json")).is_empty());
    }
}
