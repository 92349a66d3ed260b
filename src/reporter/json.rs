use super::sorted;
use crate::LintError;
use crate::Severity;
use std::path::Path;

#[derive(serde::Serialize)]
struct JsonReport<'a> {
    file: String,
    errors: Vec<&'a LintError>,
    summary: Summary,
}

#[derive(serde::Serialize)]
struct Summary {
    errors: usize,
    warnings: usize,
    fixable: usize,
    ignored: usize,
}

pub(crate) fn report(errors: &[LintError], path: &Path, ignored_count: usize) {
    match format(errors, path, ignored_count) {
        Ok(output) => println!("{}", output),
        Err(e) => tracing::error!(error = %e, path = %path.display(), "failed to serialize report"),
    }
}

pub(crate) fn format(
    errors: &[LintError],
    path: &Path,
    ignored_count: usize,
) -> serde_json::Result<String> {
    let report = JsonReport {
        file: path.display().to_string(),
        errors: sorted(errors),
        summary: Summary {
            errors: errors
                .iter()
                .filter(|e| e.severity == Severity::Error)
                .count(),
            warnings: errors
                .iter()
                .filter(|e| e.severity == Severity::Warning)
                .count(),
            fixable: errors.iter().filter(|e| e.fix.is_some()).count(),
            ignored: ignored_count,
        },
    };

    serde_json::to_string_pretty(&report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linter::Fix;
    use crate::reporter::make_error;

    fn parse(errors: &[LintError], ignored: usize) -> serde_json::Value {
        let output = format(errors, Path::new("data.json"), ignored).unwrap();
        serde_json::from_str(&output).unwrap()
    }

    #[test]
    fn test_json_structure() {
        let errors = vec![
            make_error(
                Some("no-empty-keys"),
                "problem",
                "Empty key found.",
                Severity::Error,
                Some(10),
                Some(5),
            )
            .with_fix(Fix::replace_range(3, 5, "\"x\"")),
        ];
        let json = parse(&errors, 0);

        assert_eq!(json["file"], "data.json");
        assert_eq!(json["errors"].as_array().unwrap().len(), 1);
        let error = &json["errors"][0];
        assert_eq!(error["rule"], "no-empty-keys");
        assert_eq!(error["category"], "problem");
        assert_eq!(error["message"], "Empty key found.");
        assert_eq!(error["severity"], "Error");
        assert_eq!(error["line"], 10);
        assert_eq!(error["column"], 5);
        assert!(error.get("fatal").is_none());
        assert_eq!(error["fix"]["start_offset"], 3);
        assert_eq!(error["fix"]["new_text"], "\"x\"");
        assert!(error.get("offset").is_none());
        assert_eq!(json["summary"]["errors"], 1);
        assert_eq!(json["summary"]["warnings"], 0);
        assert_eq!(json["summary"]["fixable"], 1);
        assert_eq!(json["summary"]["ignored"], 0);
    }

    #[test]
    fn test_json_rule_less_error() {
        let errors = vec![
            make_error(None, "syntax", "Unexpected end", Severity::Error, Some(1), Some(2))
                .fatal(),
        ];
        let json = parse(&errors, 0);
        assert!(json["errors"][0]["rule"].is_null());
        assert_eq!(json["errors"][0]["fatal"], true);
    }

    #[test]
    fn test_json_summary_counts() {
        let errors = vec![
            make_error(Some("r1"), "problem", "err", Severity::Error, Some(1), None),
            make_error(Some("r2"), "problem", "warn1", Severity::Warning, Some(2), None),
            make_error(Some("r3"), "problem", "warn2", Severity::Warning, Some(3), None),
        ];
        let json = parse(&errors, 2);

        assert_eq!(json["summary"]["errors"], 1);
        assert_eq!(json["summary"]["warnings"], 2);
        assert_eq!(json["summary"]["ignored"], 2);
    }

    #[test]
    fn test_json_sorted_by_line_and_column() {
        let errors = vec![
            make_error(Some("r1"), "problem", "third", Severity::Error, Some(10), Some(1)),
            make_error(Some("r2"), "problem", "first", Severity::Warning, Some(1), Some(5)),
            make_error(Some("r3"), "problem", "second", Severity::Error, Some(1), Some(10)),
        ];
        let json = parse(&errors, 0);

        let errs = json["errors"].as_array().unwrap();
        assert_eq!(errs[0]["message"], "first");
        assert_eq!(errs[1]["message"], "second");
        assert_eq!(errs[2]["message"], "third");
    }

    #[test]
    fn test_json_empty_errors() {
        let json = parse(&[], 0);

        assert_eq!(json["file"], "data.json");
        assert!(json["errors"].as_array().unwrap().is_empty());
        assert_eq!(json["summary"]["errors"], 0);
        assert_eq!(json["summary"]["warnings"], 0);
    }
}
