use crate::docs::RuleDoc;
use crate::linter::{LintRule, Listener, RuleContext, RuleOptionsError, RuleSeverity, RuleVisitor};
use crate::parser::ast::{NodeId, NodeType};
use crate::source_code::Phase;
use serde_json::Value;

/// Rule documentation
pub static DOC: RuleDoc = RuleDoc {
    name: "no-empty-keys",
    category: "problem",
    description: "Disallow empty keys in JSON objects",
    severity: "error",
    fixable: false,
    why: r#"An empty key (or one made only of whitespace) is valid JSON but is
almost always a mistake, and many consumers cannot address it."#,
    options: "",
    bad_example: include_str!("no_empty_keys/bad.json"),
    good_example: include_str!("no_empty_keys/good.json"),
    references: &["https://github.com/eslint/json/tree/main/docs/rules/no-empty-keys.md"],
};

/// Reports members whose key is empty or whitespace only
pub struct NoEmptyKeys;

struct NoEmptyKeysVisitor;

impl RuleVisitor for NoEmptyKeysVisitor {
    fn visit(&mut self, node: NodeId, _phase: Phase, ctx: &mut RuleContext<'_>) {
        let source = ctx.source_code();
        let Some((name, _)) = source.document().member_parts(node) else {
            return;
        };
        if let Some(key) = source.node(name).key()
            && key.chars().all(|c| c.is_whitespace() || c == '\u{FEFF}')
        {
            ctx.report_node(name, "Empty key found.");
        }
    }
}

impl LintRule for NoEmptyKeys {
    fn name(&self) -> &'static str {
        "no-empty-keys"
    }

    fn category(&self) -> &'static str {
        "problem"
    }

    fn description(&self) -> &'static str {
        "Disallow empty keys in JSON objects"
    }

    fn listeners(&self) -> &'static [Listener] {
        const LISTENERS: &[Listener] = &[Listener::enter(NodeType::Member)];
        LISTENERS
    }

    fn create(&self, _options: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleOptionsError> {
        Ok(Box::new(NoEmptyKeysVisitor))
    }

    fn default_severity(&self) -> RuleSeverity {
        RuleSeverity::Error
    }

    fn why(&self) -> Option<&str> {
        Some(DOC.why)
    }

    fn bad_example(&self) -> Option<&str> {
        Some(DOC.bad_example)
    }

    fn good_example(&self) -> Option<&str> {
        Some(DOC.good_example)
    }
}
