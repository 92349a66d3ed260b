use super::Cli;
use clap::CommandFactory;
use colored::control;
use json_lint::language::File;
use json_lint::{ColorMode, LintConfig, LintError, Linter, Reporter, Severity};
use rayon::prelude::*;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Extensions picked up when a directory is given
const EXTENSIONS: &[&str] = &["json", "jsonc", "json5"];

/// Result of linting a single file
enum FileResult {
    ReadError {
        path: PathBuf,
        error: std::io::Error,
    },
    LintErrors {
        path: PathBuf,
        errors: Vec<LintError>,
        ignored_count: usize,
        fix_count: usize,
    },
}

/// Expand directories into the JSON files below them
fn collect_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for input in inputs {
        let mut found = Vec::new();
        if input.is_dir() {
            for ext in EXTENSIONS {
                let pattern = input.join("**").join(format!("*.{}", ext));
                let pattern = pattern.to_string_lossy();
                let paths = glob::glob(&pattern)
                    .map_err(|e| format!("invalid pattern {}: {}", pattern, e))?;
                found.extend(paths.filter_map(Result::ok).filter(|p| p.is_file()));
            }
            found.sort();
        } else if input.exists() {
            found.push(input.clone());
        } else {
            return Err(format!("{} not found", input.display()));
        }

        for path in found {
            let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
            if seen.insert(canonical) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Lint a single file, fixing it in place when `fix` is set
fn lint_file(path: &Path, linter: &Linter, fix: bool) -> FileResult {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) => {
            return FileResult::ReadError {
                path: path.to_path_buf(),
                error,
            };
        }
    };
    let file = File::new(path, content);

    if !fix {
        let outcome = linter.lint_source(&file);
        return FileResult::LintErrors {
            path: path.to_path_buf(),
            errors: outcome.errors,
            ignored_count: outcome.suppressed_count,
            fix_count: 0,
        };
    }

    let fixed = linter.fix_source(&file);
    if fixed.fix_count > 0
        && let Err(error) = std::fs::write(path, &fixed.content)
    {
        return FileResult::ReadError {
            path: path.to_path_buf(),
            error,
        };
    }
    FileResult::LintErrors {
        path: path.to_path_buf(),
        errors: fixed.outcome.errors,
        ignored_count: fixed.outcome.suppressed_count,
        fix_count: fixed.fix_count,
    }
}

fn load_config(cli: &Cli, search_dir: &Path) -> Result<Option<LintConfig>, String> {
    let config = match &cli.config {
        Some(config_path) => {
            let config = LintConfig::from_file(config_path).map_err(|e| e.to_string())?;
            if cli.verbose {
                eprintln!("Using config: {}", config_path.display());
            }
            Some(config)
        }
        None => {
            let config = LintConfig::find_and_load(search_dir).map_err(|e| e.to_string())?;
            if cli.verbose && config.is_some() {
                eprintln!("Found {}", json_lint::config::CONFIG_FILE_NAME);
            }
            config
        }
    };

    // --language overrides the configured mode
    match cli.language {
        Some(language) => {
            let mut config = config.unwrap_or_default();
            config.language.mode = Some(language.into());
            Ok(Some(config))
        }
        None => Ok(config),
    }
}

fn has_issues(errors: &[LintError], no_fail_on_warnings: bool) -> bool {
    if no_fail_on_warnings {
        errors.iter().any(|e| e.severity == Severity::Error)
    } else {
        !errors.is_empty()
    }
}

pub fn run_lint(cli: Cli) -> ExitCode {
    // 1. Detect stdin mode and read content if applicable
    let stdin_mode = cli.files.len() == 1 && cli.files[0].as_os_str() == "-";
    let stdin_content = if stdin_mode {
        let mut content = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut content) {
            eprintln!("Error reading from stdin: {}", e);
            return ExitCode::from(2);
        }
        Some(content)
    } else {
        None
    };

    // 2. Resolve files and directories (file mode only)
    let file_paths = if stdin_content.is_none() {
        if cli.files.is_empty() {
            let _ = Cli::command().print_help();
            eprintln!();
            return ExitCode::from(2);
        }
        match collect_files(&cli.files) {
            Ok(paths) => paths,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(2);
            }
        }
    } else {
        Vec::new()
    };

    // 3. Load configuration
    let search_dir = file_paths
        .first()
        .and_then(|p| p.parent())
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let lint_config = match load_config(&cli, search_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    // 4. Configure color output (CLI flags take precedence over config)
    if cli.color {
        control::set_override(true);
    } else if cli.no_color {
        control::set_override(false);
    } else if let Some(ref config) = lint_config {
        match config.color_mode() {
            ColorMode::Always => control::set_override(true),
            ColorMode::Never => control::set_override(false),
            ColorMode::Auto => {}
        }
    }

    // 5. Create reporter with color configuration
    let color_config = lint_config
        .as_ref()
        .map(|c| c.color.clone())
        .unwrap_or_default();
    let reporter = Reporter::with_colors(cli.format.into(), color_config);

    // 6. Create linter
    let linter = match Linter::with_config(lint_config.as_ref()) {
        Ok(linter) => linter,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    // 7. Branch: stdin mode vs file mode
    if let Some(content) = stdin_content {
        let file = File::new("<stdin>", content);

        let errors = if cli.fix {
            let fixed = linter.fix_source(&file);
            print!("{}", fixed.content);
            fixed.outcome.errors
        } else {
            let outcome = linter.lint_source(&file);
            reporter.report(&outcome.errors, &file.path, outcome.suppressed_count);
            outcome.errors
        };

        return if has_issues(&errors, cli.no_fail_on_warnings) {
            ExitCode::from(1)
        } else {
            ExitCode::SUCCESS
        };
    }

    if cli.verbose {
        eprintln!("Linting {} file(s)", file_paths.len());
        for path in &file_paths {
            eprintln!("  - {}", path.display());
        }
    }

    // Lint files (parallel when not fixing, sequential otherwise)
    let results: Vec<FileResult> = if cli.fix {
        file_paths
            .iter()
            .map(|path| lint_file(path, &linter, true))
            .collect()
    } else {
        file_paths
            .par_iter()
            .map(|path| lint_file(path, &linter, false))
            .collect()
    };

    // Process results sequentially (for consistent output ordering)
    let mut all_errors = Vec::new();
    let mut has_io_error = false;

    for result in results {
        match result {
            FileResult::ReadError { path, error } => {
                eprintln!("Error: {}: {}", path.display(), error);
                has_io_error = true;
            }
            FileResult::LintErrors {
                path,
                errors,
                ignored_count,
                fix_count,
            } => {
                if fix_count > 0 {
                    eprintln!("Applied {} fix(es) to {}", fix_count, path.display());
                }
                reporter.report(&errors, &path, ignored_count);
                all_errors.extend(errors);
            }
        }
    }

    if has_io_error {
        return ExitCode::from(2);
    }

    if has_issues(&all_errors, cli.no_fail_on_warnings) {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_files_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("nested/b.jsonc"), "{}").unwrap();
        std::fs::write(dir.path().join("nested/c.json5"), "{}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"a.json".to_string()));
        assert!(names.contains(&"b.jsonc".to_string()));
        assert!(names.contains(&"c.json5".to_string()));
    }

    #[test]
    fn test_collect_files_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.json");
        std::fs::write(&file, "{}").unwrap();

        let files = collect_files(&[file.clone(), dir.path().to_path_buf()]).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_collect_files_missing() {
        assert!(collect_files(&[PathBuf::from("/nonexistent/x.json")]).is_err());
    }

    #[test]
    fn test_lint_file_fixes_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, r#"{"b": 1, "a": 2}"#).unwrap();

        let mut config = LintConfig::default();
        config.rules.insert(
            "sort-keys".to_string(),
            json_lint::config::RuleConfig {
                severity: Some(json_lint::linter::RuleSeverity::Error),
                options: Vec::new(),
            },
        );
        let linter = Linter::with_config(Some(&config)).unwrap();

        let FileResult::LintErrors {
            errors, fix_count, ..
        } = lint_file(&path, &linter, true)
        else {
            panic!("file should be readable");
        };
        assert_eq!(fix_count, 1);
        assert!(errors.is_empty());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"a": 2, "b": 1}"#
        );
    }

    #[test]
    fn test_has_issues() {
        let warning = LintError::new("sort-keys", "suggestion", "m", Severity::Warning);
        assert!(has_issues(std::slice::from_ref(&warning), false));
        assert!(!has_issues(std::slice::from_ref(&warning), true));
        assert!(!has_issues(&[], false));
    }
}
