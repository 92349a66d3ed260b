//! Language adapter between the parser and the lint host.
//!
//! [`JsonLanguage`] owns a [`LanguageMode`] and exposes the three steps the
//! host runs for every file: validate the per-language options, parse the
//! file without ever failing across the boundary, and wrap the resulting tree
//! in a [`JsonSourceCode`].

use crate::source_code::JsonSourceCode;
use json_lint_parser::ast::{Document, NodeType, Position};
use json_lint_parser::{LanguageMode, ParseOptions};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while validating language options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LanguageOptionsError {
    #[error("allowTrailingCommas is only valid for JSONC, not {mode}")]
    TrailingCommasNotSupported { mode: LanguageMode },

    #[error("allowTrailingCommas must be a boolean, got {value}")]
    InvalidTrailingCommas { value: String },

    #[error("Unknown language option '{0}'")]
    UnknownOption(String),
}

/// Validated per-language options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LanguageOptions {
    pub allow_trailing_commas: bool,
}

/// A document handed to the language: its path and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub path: PathBuf,
    pub body: String,
}

impl File {
    /// Create a file, dropping a leading byte order mark from `body`.
    pub fn new(path: impl Into<PathBuf>, body: impl Into<String>) -> Self {
        let mut body = body.into();
        if body.starts_with('\u{FEFF}') {
            body.drain(..'\u{FEFF}'.len_utf8());
        }
        Self {
            path: path.into(),
            body,
        }
    }
}

/// A syntax error reported by [`JsonLanguage::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProblem {
    /// Error message without the `(line:column)` suffix.
    pub message: String,
    pub loc: Option<Position>,
}

/// Result of parsing one file.
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Ok(Document),
    Err(Vec<ParseProblem>),
}

impl ParseOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ParseOutcome::Ok(_))
    }
}

/// Language definition for JSON, JSONC and JSON5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonLanguage {
    mode: LanguageMode,
}

impl JsonLanguage {
    /// Lines are numbered from 1.
    pub const LINE_START: usize = 1;
    /// Columns are numbered from 1.
    pub const COLUMN_START: usize = 1;

    pub fn new(mode: LanguageMode) -> Self {
        Self { mode }
    }

    /// Select the mode from a file extension (`.jsonc`, `.json5`, otherwise JSON).
    pub fn for_path(path: &Path) -> Self {
        let mode = match path.extension().and_then(|ext| ext.to_str()) {
            Some("jsonc") => LanguageMode::Jsonc,
            Some("json5") => LanguageMode::Json5,
            _ => LanguageMode::Json,
        };
        Self::new(mode)
    }

    pub fn mode(&self) -> LanguageMode {
        self.mode
    }

    /// Child fields traversed for each node type.
    pub fn visitor_keys(&self, node_type: NodeType) -> &'static [&'static str] {
        node_type.visitor_keys()
    }

    /// Check raw language options and convert them into [`LanguageOptions`].
    pub fn validate_language_options(
        &self,
        raw: &Map<String, Value>,
    ) -> Result<LanguageOptions, LanguageOptionsError> {
        let mut options = LanguageOptions::default();

        for (key, value) in raw {
            match key.as_str() {
                "allowTrailingCommas" | "allow_trailing_commas" => {
                    if self.mode != LanguageMode::Jsonc {
                        return Err(LanguageOptionsError::TrailingCommasNotSupported {
                            mode: self.mode,
                        });
                    }
                    let Value::Bool(allow) = value else {
                        return Err(LanguageOptionsError::InvalidTrailingCommas {
                            value: value.to_string(),
                        });
                    };
                    options.allow_trailing_commas = *allow;
                }
                other => return Err(LanguageOptionsError::UnknownOption(other.to_string())),
            }
        }

        Ok(options)
    }

    /// Parse a file. Syntax errors are returned as [`ParseOutcome::Err`].
    #[tracing::instrument(level = "debug", skip_all, fields(path = %file.path.display(), mode = %self.mode))]
    pub fn parse(&self, file: &File, options: &LanguageOptions) -> ParseOutcome {
        let parse_options = ParseOptions::new(self.mode)
            .with_trailing_commas(options.allow_trailing_commas);

        match json_lint_parser::parse(&file.body, &parse_options) {
            Ok(document) => {
                tracing::trace!(nodes = document.len(), tokens = document.tokens().len(), "parsed");
                ParseOutcome::Ok(document)
            }
            Err(err) => {
                tracing::debug!(error = %err, "parse failed");
                ParseOutcome::Err(vec![ParseProblem {
                    message: err.message(),
                    loc: Some(err.position()),
                }])
            }
        }
    }

    pub fn create_source_code(&self, file: &File, document: Document) -> JsonSourceCode {
        JsonSourceCode::new(file.body.clone(), document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_numbering_starts_at_one() {
        assert_eq!(JsonLanguage::LINE_START, 1);
        assert_eq!(JsonLanguage::COLUMN_START, 1);
    }

    #[test]
    fn test_trailing_commas_only_for_jsonc() {
        let raw = options(json!({ "allowTrailingCommas": true }));
        assert!(
            JsonLanguage::new(LanguageMode::Jsonc)
                .validate_language_options(&raw)
                .unwrap()
                .allow_trailing_commas
        );
        assert_eq!(
            JsonLanguage::new(LanguageMode::Json).validate_language_options(&raw),
            Err(LanguageOptionsError::TrailingCommasNotSupported {
                mode: LanguageMode::Json
            })
        );
        assert!(
            JsonLanguage::new(LanguageMode::Json5)
                .validate_language_options(&raw)
                .is_err()
        );
    }

    #[test]
    fn test_trailing_commas_must_be_boolean() {
        let raw = options(json!({ "allowTrailingCommas": "yes" }));
        assert!(matches!(
            JsonLanguage::new(LanguageMode::Jsonc).validate_language_options(&raw),
            Err(LanguageOptionsError::InvalidTrailingCommas { .. })
        ));
    }

    #[test]
    fn test_empty_options_are_valid_everywhere() {
        for mode in [LanguageMode::Json, LanguageMode::Jsonc, LanguageMode::Json5] {
            assert_eq!(
                JsonLanguage::new(mode).validate_language_options(&Map::new()),
                Ok(LanguageOptions::default())
            );
        }
    }

    #[test]
    fn test_parse_error_strips_location_suffix() {
        let language = JsonLanguage::new(LanguageMode::Json);
        let file = File::new("test.json", "{\n//\n}");
        let ParseOutcome::Err(problems) = language.parse(&file, &LanguageOptions::default()) else {
            panic!("expected a parse error");
        };
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].message, "Unexpected character '/' found.");
        let loc = problems[0].loc.unwrap();
        assert_eq!((loc.line, loc.column), (2, 1));
    }

    #[test]
    fn test_deep_nesting_is_a_parse_error() {
        let language = JsonLanguage::new(LanguageMode::Json);
        let file = File::new("deep.json", "[".repeat(20_000) + &"]".repeat(20_000));
        let ParseOutcome::Err(problems) = language.parse(&file, &LanguageOptions::default()) else {
            panic!("expected a parse error");
        };
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].message, "Maximum nesting depth of 256 exceeded.");
    }

    #[test]
    fn test_parse_jsonc_with_trailing_comma_option() {
        let language = JsonLanguage::new(LanguageMode::Jsonc);
        let file = File::new("test.jsonc", "[1, 2,]");
        assert!(!language.parse(&file, &LanguageOptions::default()).is_ok());
        let allow = LanguageOptions {
            allow_trailing_commas: true,
        };
        assert!(language.parse(&file, &allow).is_ok());
    }

    #[test]
    fn test_bom_is_removed() {
        let file = File::new("test.json", "\u{FEFF}{}");
        assert_eq!(file.body, "{}");
    }

    #[test]
    fn test_mode_from_extension() {
        assert_eq!(
            JsonLanguage::for_path(Path::new("a/tsconfig.jsonc")).mode(),
            LanguageMode::Jsonc
        );
        assert_eq!(
            JsonLanguage::for_path(Path::new("b.json5")).mode(),
            LanguageMode::Json5
        );
        assert_eq!(
            JsonLanguage::for_path(Path::new("package.json")).mode(),
            LanguageMode::Json
        );
    }

    #[test]
    fn test_create_source_code() {
        let language = JsonLanguage::new(LanguageMode::Jsonc);
        let file = File::new("test.jsonc", "// c\n{}");
        let ParseOutcome::Ok(document) = language.parse(&file, &LanguageOptions::default()) else {
            panic!("expected success");
        };
        let source = language.create_source_code(&file, document);
        assert_eq!(source.text(), "// c\n{}");
        assert_eq!(source.comments().len(), 1);
    }
}
