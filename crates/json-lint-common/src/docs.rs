//! Rule documentation types for json-lint

/// Documentation for a lint rule
#[derive(Debug)]
pub struct RuleDoc {
    /// Rule name (e.g., "no-duplicate-keys")
    pub name: &'static str,
    /// Category (e.g., "problem")
    pub category: &'static str,
    /// Short description
    pub description: &'static str,
    /// Default severity ("error", "warn" or "off")
    pub severity: &'static str,
    /// Whether `--fix` can repair reports of this rule
    pub fixable: bool,
    /// Why this rule exists
    pub why: &'static str,
    /// Accepted options, empty when the rule takes none
    pub options: &'static str,
    /// Example of a bad document
    pub bad_example: &'static str,
    /// Example of a good document
    pub good_example: &'static str,
    /// References (URLs, documentation links)
    pub references: &'static [&'static str],
}

impl RuleDoc {
    /// Name with the `json/` namespace, as accepted in configs and directives.
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", crate::linter::RULE_NAMESPACE, self.name)
    }
}
