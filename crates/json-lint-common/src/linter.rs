use crate::parser::ast::{NodeId, NodeType, Span};
use crate::source_code::{JsonSourceCode, Phase};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Namespace accepted in front of rule names, as in `json/no-empty-keys`.
pub const RULE_NAMESPACE: &str = "json";

/// All rule categories, in display order
pub const RULE_CATEGORIES: &[&str] = &["problem", "suggestion"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// Configured level of a rule: off, warn or error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    #[default]
    Off,
    Warn,
    Error,
}

impl RuleSeverity {
    /// Read a severity written as `0`/`1`/`2` or `"off"`/`"warn"`/`"error"`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_u64()? {
                0 => Some(RuleSeverity::Off),
                1 => Some(RuleSeverity::Warn),
                2 => Some(RuleSeverity::Error),
                _ => None,
            },
            Value::String(s) => s.to_ascii_lowercase().parse().ok(),
            _ => None,
        }
    }

    pub fn to_severity(self) -> Option<Severity> {
        match self {
            RuleSeverity::Off => None,
            RuleSeverity::Warn => Some(Severity::Warning),
            RuleSeverity::Error => Some(Severity::Error),
        }
    }
}

impl FromStr for RuleSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(RuleSeverity::Off),
            "warn" => Ok(RuleSeverity::Warn),
            "error" => Ok(RuleSeverity::Error),
            other => Err(format!(
                "Unknown severity '{}'. Expected one of: off, warn, error",
                other
            )),
        }
    }
}

impl fmt::Display for RuleSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSeverity::Off => write!(f, "off"),
            RuleSeverity::Warn => write!(f, "warn"),
            RuleSeverity::Error => write!(f, "error"),
        }
    }
}

/// Represents a fix that can be applied to resolve a lint error
///
/// Fixes replace the bytes `start_offset..end_offset` of the document with
/// `new_text`. Fixes from one pass must not overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fix {
    /// Start byte offset (0-indexed, inclusive)
    pub start_offset: usize,
    /// End byte offset (0-indexed, exclusive)
    pub end_offset: usize,
    /// Replacement text
    pub new_text: String,
}

impl Fix {
    /// Create a range-based fix that replaces bytes from start to end offset
    pub fn replace_range(start_offset: usize, end_offset: usize, new_text: &str) -> Self {
        Self {
            start_offset,
            end_offset,
            new_text: new_text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LintError {
    /// Rule that produced the error; `None` for parse and directive problems
    pub rule: Option<String>,
    pub category: String,
    pub message: String,
    pub severity: Severity,
    pub line: Option<usize>,
    pub column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
    /// Whether the error stops the file from being linted
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fatal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
    /// Byte offset of the start of the reported span
    #[serde(skip)]
    pub offset: Option<usize>,
}

impl LintError {
    pub fn new(rule: &str, category: &str, message: &str, severity: Severity) -> Self {
        Self {
            rule: Some(rule.to_string()),
            category: category.to_string(),
            message: message.to_string(),
            severity,
            line: None,
            column: None,
            end_line: None,
            end_column: None,
            fatal: false,
            fix: None,
            offset: None,
        }
    }

    /// An error not attributed to any rule (syntax errors, bad directives).
    pub fn without_rule(category: &str, message: &str, severity: Severity) -> Self {
        Self {
            rule: None,
            ..Self::new("", category, message, severity)
        }
    }

    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.line = Some(span.start.line);
        self.column = Some(span.start.column);
        self.end_line = Some(span.end.line);
        self.end_column = Some(span.end.column);
        self.offset = Some(span.start.offset);
        self
    }

    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }

    /// Rule name for display, `-` when there is none.
    pub fn rule_name(&self) -> &str {
        self.rule.as_deref().unwrap_or("-")
    }
}

/// Returns true when `selector` (from config or a directive) names `rule`.
///
/// Selectors may carry the [`RULE_NAMESPACE`] prefix.
pub fn rule_matches(selector: &str, rule: &str) -> bool {
    let selector = selector
        .strip_prefix(RULE_NAMESPACE)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(selector);
    selector == rule
}

/// Strip the [`RULE_NAMESPACE`] prefix from a selector.
pub fn bare_rule_name(selector: &str) -> &str {
    selector
        .strip_prefix(RULE_NAMESPACE)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(selector)
}

/// A node type and phase a rule wants to be called for, written as
/// `Object` or `Object:exit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Listener {
    pub node_type: NodeType,
    pub phase: Phase,
}

impl Listener {
    pub const fn enter(node_type: NodeType) -> Self {
        Self {
            node_type,
            phase: Phase::Enter,
        }
    }

    pub const fn exit(node_type: NodeType) -> Self {
        Self {
            node_type,
            phase: Phase::Exit,
        }
    }
}

impl FromStr for Listener {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, phase) = match s.strip_suffix(":exit") {
            Some(name) => (name, Phase::Exit),
            None => (s, Phase::Enter),
        };
        let node_type = name.parse::<NodeType>().map_err(|e| e.to_string())?;
        Ok(Self { node_type, phase })
    }
}

impl fmt::Display for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            Phase::Enter => write!(f, "{}", self.node_type),
            Phase::Exit => write!(f, "{}:exit", self.node_type),
        }
    }
}

/// Invalid options given to a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RuleOptionsError {
    pub message: String,
}

impl RuleOptionsError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Per-run state handed to a visitor: the source and the error sink.
pub struct RuleContext<'a> {
    source: &'a JsonSourceCode,
    rule: &'static str,
    category: &'static str,
    errors: &'a mut Vec<LintError>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        source: &'a JsonSourceCode,
        rule: &'static str,
        category: &'static str,
        errors: &'a mut Vec<LintError>,
    ) -> Self {
        Self {
            source,
            rule,
            category,
            errors,
        }
    }

    pub fn source_code(&self) -> &'a JsonSourceCode {
        self.source
    }

    /// Build an error for this rule at `span`. Severity is assigned by the linter.
    pub fn error(&self, span: Span, message: &str) -> LintError {
        LintError::new(self.rule, self.category, message, Severity::Error).with_span(span)
    }

    pub fn report(&mut self, error: LintError) {
        self.errors.push(error);
    }

    /// Report `message` at the location of `node`.
    pub fn report_node(&mut self, node: NodeId, message: &str) {
        let error = self.error(self.source.node(node).span, message);
        self.report(error);
    }
}

/// Stateful callbacks created per file by [`LintRule::create`].
pub trait RuleVisitor {
    fn visit(&mut self, node: NodeId, phase: Phase, ctx: &mut RuleContext<'_>);
}

pub trait LintRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn category(&self) -> &'static str;
    fn description(&self) -> &'static str;

    /// Node types (and phases) this rule's visitor is called for.
    fn listeners(&self) -> &'static [Listener];

    /// Build a visitor for one file from the rule's options.
    fn create(&self, options: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleOptionsError>;

    /// Severity applied when the configuration does not mention the rule
    fn default_severity(&self) -> RuleSeverity {
        RuleSeverity::Off
    }

    /// Whether reports may carry a [`Fix`]
    fn fixable(&self) -> bool {
        false
    }

    /// Get detailed explanation of why this rule exists
    fn why(&self) -> Option<&str> {
        None
    }

    /// Get example of a bad document
    fn bad_example(&self) -> Option<&str> {
        None
    }

    /// Get example of a good document
    fn good_example(&self) -> Option<&str> {
        None
    }

    /// Get reference URLs
    fn references(&self) -> Option<Vec<String>> {
        None
    }
}

/// A visitor created for one rule, with the errors it reported.
pub struct RuleInstance {
    /// Index of the rule in [`Linter::rules`]
    pub rule: usize,
    pub visitor: Box<dyn RuleVisitor>,
    pub errors: Vec<LintError>,
}

/// Basic Linter that holds rules and dispatches traversal steps to them
pub struct Linter {
    rules: Vec<Box<dyn LintRule>>,
    dispatch: HashMap<Listener, Vec<usize>>,
}

impl Linter {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            dispatch: HashMap::new(),
        }
    }

    pub fn add_rule(&mut self, rule: Box<dyn LintRule>) {
        let index = self.rules.len();
        for listener in rule.listeners() {
            self.dispatch.entry(*listener).or_default().push(index);
        }
        self.rules.push(rule);
    }

    /// Get a reference to all rules
    pub fn rules(&self) -> &[Box<dyn LintRule>] {
        &self.rules
    }

    /// Find a rule by name, with or without the namespace prefix
    pub fn rule_index(&self, selector: &str) -> Option<usize> {
        self.rules
            .iter()
            .position(|rule| rule_matches(selector, rule.name()))
    }

    /// Walk the document once, calling every instance whose rule listens
    /// for the current node type and phase.
    pub fn run(&self, source: &JsonSourceCode, instances: &mut [RuleInstance]) {
        let mut by_rule: Vec<Vec<usize>> = vec![Vec::new(); self.rules.len()];
        for (i, instance) in instances.iter().enumerate() {
            if let Some(slot) = by_rule.get_mut(instance.rule) {
                slot.push(i);
            }
        }

        for step in source.traverse() {
            let listener = Listener {
                node_type: source.node(step.target).node_type(),
                phase: step.phase,
            };
            let Some(rules) = self.dispatch.get(&listener) else {
                continue;
            };
            for &rule_index in rules {
                let rule = &self.rules[rule_index];
                for &i in &by_rule[rule_index] {
                    let instance = &mut instances[i];
                    let mut ctx =
                        RuleContext::new(source, rule.name(), rule.category(), &mut instance.errors);
                    instance.visitor.visit(step.target, step.phase, &mut ctx);
                }
            }
        }
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{LanguageMode, ParseOptions, parse};
    use serde_json::json;

    struct CountObjects;

    struct CountObjectsVisitor {
        depth: usize,
    }

    impl RuleVisitor for CountObjectsVisitor {
        fn visit(&mut self, node: NodeId, phase: Phase, ctx: &mut RuleContext<'_>) {
            match phase {
                Phase::Enter => {
                    self.depth += 1;
                    let message = format!("object at depth {}", self.depth);
                    ctx.report_node(node, &message);
                }
                Phase::Exit => self.depth -= 1,
            }
        }
    }

    impl LintRule for CountObjects {
        fn name(&self) -> &'static str {
            "count-objects"
        }
        fn category(&self) -> &'static str {
            "suggestion"
        }
        fn description(&self) -> &'static str {
            "Reports every object"
        }
        fn listeners(&self) -> &'static [Listener] {
            const LISTENERS: &[Listener] = &[
                Listener::enter(NodeType::Object),
                Listener::exit(NodeType::Object),
            ];
            LISTENERS
        }
        fn create(&self, _options: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleOptionsError> {
            Ok(Box::new(CountObjectsVisitor { depth: 0 }))
        }
    }

    #[test]
    fn test_listener_from_str() {
        assert_eq!(
            "Object:exit".parse::<Listener>().unwrap(),
            Listener::exit(NodeType::Object)
        );
        assert_eq!(
            "Member".parse::<Listener>().unwrap(),
            Listener::enter(NodeType::Member)
        );
        assert!("Comment:exit".parse::<Listener>().is_err());
        assert_eq!(Listener::exit(NodeType::Array).to_string(), "Array:exit");
    }

    #[test]
    fn test_rule_severity_from_json() {
        assert_eq!(RuleSeverity::from_json(&json!(2)), Some(RuleSeverity::Error));
        assert_eq!(RuleSeverity::from_json(&json!("Warn")), Some(RuleSeverity::Warn));
        assert_eq!(RuleSeverity::from_json(&json!("off")), Some(RuleSeverity::Off));
        assert_eq!(RuleSeverity::from_json(&json!(3)), None);
        assert_eq!(RuleSeverity::from_json(&json!("on")), None);
    }

    #[test]
    fn test_rule_matches_namespace() {
        assert!(rule_matches("json/sort-keys", "sort-keys"));
        assert!(rule_matches("sort-keys", "sort-keys"));
        assert!(!rule_matches("other/sort-keys", "sort-keys"));
        assert_eq!(bare_rule_name("json/no-empty-keys"), "no-empty-keys");
    }

    #[test]
    fn test_dispatch_runs_visitors_in_document_order() {
        let text = r#"{"a": {"b": {}}, "c": [{}]}"#;
        let doc = parse(text, &ParseOptions::new(LanguageMode::Json)).unwrap();
        let source = JsonSourceCode::new(text.to_string(), doc);

        let mut linter = Linter::new();
        linter.add_rule(Box::new(CountObjects));
        let visitor = linter.rules()[0].create(&[]).unwrap();
        let mut instances = vec![RuleInstance {
            rule: 0,
            visitor,
            errors: Vec::new(),
        }];
        linter.run(&source, &mut instances);

        let messages: Vec<&str> = instances[0]
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect();
        assert_eq!(
            messages,
            vec![
                "object at depth 1",
                "object at depth 2",
                "object at depth 3",
                "object at depth 2"
            ]
        );
        assert_eq!(instances[0].errors[0].rule.as_deref(), Some("count-objects"));
        assert_eq!(instances[0].errors[1].column, Some(7));
    }
}
