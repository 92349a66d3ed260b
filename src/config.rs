use crate::linter::{LintRule, RuleSeverity, rule_matches};
use crate::parser::LanguageMode;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for by [`LintConfig::find_and_load`]
pub const CONFIG_FILE_NAME: &str = ".json-lint.toml";

/// Template written by `json-lint config init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# json-lint configuration

[language]
# Force a dialect for every file: "json", "jsonc" or "json5".
# Without it the dialect follows the file extension.
# mode = "jsonc"

# Accept trailing commas in JSONC files.
# allowTrailingCommas = false

[linter]
# Warn about eslint-disable comments that suppress nothing.
report_unused_disable_directives = false

# Severity is "off", "warn" or "error".

[rules.no-duplicate-keys]
severity = "error"

[rules.no-empty-keys]
severity = "error"

[rules.no-unnormalized-keys]
severity = "error"
# options = [{ form = "NFC" }]

[rules.no-unsafe-values]
severity = "error"

[rules.top-level-interop]
severity = "off"

[rules.sort-keys]
severity = "off"
# options = ["asc", { caseSensitive = true, natural = false, minKeys = 2, allowLineSeparatedGroups = false }]

[color]
# "auto" (default), "always" or "never"
ui = "auto"
# error = "red"
# warning = "yellow"
"#;

/// Configuration for json-lint loaded from .json-lint.toml
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct LintConfig {
    #[serde(default)]
    pub language: LanguageConfig,
    #[serde(default)]
    pub linter: LinterConfig,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
    #[serde(default)]
    pub color: ColorConfig,
}

/// `[language]` table
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct LanguageConfig {
    /// Dialect used for every file instead of extension detection
    #[schemars(with = "Option<String>")]
    pub mode: Option<LanguageMode>,
    #[serde(rename = "allowTrailingCommas", alias = "allow_trailing_commas")]
    pub allow_trailing_commas: Option<bool>,
}

/// `[linter]` table
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct LinterConfig {
    #[serde(default)]
    pub report_unused_disable_directives: bool,
}

/// Configuration for a specific lint rule
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct RuleConfig {
    /// "off", "warn" or "error"
    #[schemars(with = "Option<String>")]
    pub severity: Option<RuleSeverity>,
    #[serde(default)]
    pub options: Vec<Value>,
}

/// Color output configuration
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ColorConfig {
    /// Color mode: "auto" (default), "always" or "never"
    #[serde(default)]
    #[schemars(with = "String")]
    pub ui: ColorMode,
    #[serde(default = "default_error_color")]
    pub error: Color,
    #[serde(default = "default_warning_color")]
    pub warning: Color,
}

fn default_error_color() -> Color {
    Color::Red
}

fn default_warning_color() -> Color {
    Color::Yellow
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            ui: ColorMode::default(),
            error: default_error_color(),
            warning: default_warning_color(),
        }
    }
}

/// Color mode for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Automatically detect (default) - respects NO_COLOR env and terminal detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl<'de> Deserialize<'de> for ColorMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "auto" => Ok(ColorMode::Auto),
            "always" => Ok(ColorMode::Always),
            "never" => Ok(ColorMode::Never),
            _ => Err(D::Error::custom(format!(
                "invalid color mode '{}', expected 'auto', 'always', or 'never'",
                s
            ))),
        }
    }
}

/// Terminal colors accepted for severity labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid options for rule '{rule}': {message}")]
    InvalidRuleOptions { rule: String, message: String },
}

/// A problem found by `json-lint config validate`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown field '{path}'")]
    UnknownField { path: String },
    #[error("unknown rule '{name}'")]
    UnknownRule { name: String },
    #[error("invalid value for '{path}': {message}")]
    InvalidValue { path: String, message: String },
}

impl LintConfig {
    /// Parse configuration from TOML text
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::parse(&content, path)?;
        tracing::debug!(path = %path.display(), rules = config.rules.len(), "loaded config");
        Ok(config)
    }

    /// Find .json-lint.toml in the given directory or its parents
    pub fn find(dir: &Path) -> Option<PathBuf> {
        let mut current = dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Find and load .json-lint.toml from the given directory or its parents
    pub fn find_and_load(dir: &Path) -> Result<Option<Self>, ConfigError> {
        Self::find(dir).map(|path| Self::from_file(&path)).transpose()
    }

    /// Entry for `rule`, whether it is written bare or with the `json/` prefix
    pub fn get_rule_config(&self, rule: &str) -> Option<&RuleConfig> {
        self.rules
            .iter()
            .find(|(selector, _)| rule_matches(selector, rule))
            .map(|(_, config)| config)
    }

    /// Configured severity of `rule`, falling back to the rule's default
    pub fn rule_severity(&self, rule: &dyn LintRule) -> RuleSeverity {
        self.get_rule_config(rule.name())
            .and_then(|c| c.severity)
            .unwrap_or_else(|| rule.default_severity())
    }

    /// Configured options of `rule`
    pub fn rule_options(&self, rule: &str) -> &[Value] {
        self.get_rule_config(rule)
            .map(|c| c.options.as_slice())
            .unwrap_or_default()
    }

    /// Raw `[language]` options in the shape `JsonLanguage` validates
    pub fn language_options(&self) -> Map<String, Value> {
        let mut options = Map::new();
        if let Some(allow) = self.language.allow_trailing_commas {
            options.insert("allowTrailingCommas".to_string(), Value::Bool(allow));
        }
        options
    }

    /// Get the color mode setting
    pub fn color_mode(&self) -> ColorMode {
        self.color.ui
    }

    /// JSON Schema describing .json-lint.toml
    pub fn json_schema() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&schemars::schema_for!(LintConfig))
    }

    /// Validate a configuration file, listing every unknown field, unknown
    /// rule and invalid value.
    pub fn validate_file(path: &Path) -> Result<Vec<ValidationError>, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let table: toml::Table = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut errors = validate_table(&table);

        // Only a structurally valid file can be checked for semantics
        if errors.is_empty() {
            match Self::parse(&content, path) {
                Ok(config) => errors.extend(config.validate()),
                Err(ConfigError::ParseError { source, .. }) => {
                    errors.push(ValidationError::InvalidValue {
                        path: "config".to_string(),
                        message: source.message().to_string(),
                    })
                }
                Err(e) => return Err(e),
            }
        }

        Ok(errors)
    }

    /// Semantic checks: language options and rule options
    pub fn validate(&self) -> Vec<ValidationError> {
        use crate::language::JsonLanguage;

        let mut errors = Vec::new();

        let mode = self.language.mode.unwrap_or(LanguageMode::Jsonc);
        if let Err(e) = JsonLanguage::new(mode).validate_language_options(&self.language_options())
        {
            errors.push(ValidationError::InvalidValue {
                path: "language".to_string(),
                message: e.to_string(),
            });
        }

        let rules = crate::rules::all_rules();
        for (selector, config) in &self.rules {
            let Some(rule) = rules.iter().find(|r| rule_matches(selector, r.name())) else {
                continue;
            };
            if let Err(e) = rule.create(&config.options) {
                errors.push(ValidationError::InvalidValue {
                    path: format!("rules.{}.options", selector),
                    message: e.to_string(),
                });
            }
        }

        errors
    }
}

fn check_keys(table: &toml::Table, prefix: &str, allowed: &[&str], errors: &mut Vec<ValidationError>) {
    for key in table.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.push(ValidationError::UnknownField {
                path: format!("{}{}", prefix, key),
            });
        }
    }
}

fn validate_table(table: &toml::Table) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_keys(table, "", &["language", "linter", "rules", "color"], &mut errors);

    if let Some(toml::Value::Table(language)) = table.get("language") {
        check_keys(
            language,
            "language.",
            &["mode", "allowTrailingCommas", "allow_trailing_commas"],
            &mut errors,
        );
    }
    if let Some(toml::Value::Table(linter)) = table.get("linter") {
        check_keys(linter, "linter.", &["report_unused_disable_directives"], &mut errors);
    }
    if let Some(toml::Value::Table(color)) = table.get("color") {
        check_keys(color, "color.", &["ui", "error", "warning"], &mut errors);
    }

    if let Some(toml::Value::Table(rules)) = table.get("rules") {
        let known = crate::rules::all_rules();
        for (name, value) in rules {
            if !known.iter().any(|rule| rule_matches(name, rule.name())) {
                errors.push(ValidationError::UnknownRule { name: name.clone() });
                continue;
            }
            if let toml::Value::Table(rule) = value {
                check_keys(
                    rule,
                    &format!("rules.{}.", name),
                    &["severity", "options"],
                    &mut errors,
                );
            }
        }
    }

    errors
}
