use crate::docs::RuleDoc;
use crate::linter::{LintRule, Listener, RuleContext, RuleOptionsError, RuleSeverity, RuleVisitor};
use crate::parser::ast::{NodeId, NodeKind, NodeType};
use crate::source_code::{JsonSourceCode, Phase};
use serde_json::Value;
use std::collections::HashSet;

/// Rule documentation
pub static DOC: RuleDoc = RuleDoc {
    name: "no-duplicate-keys",
    category: "problem",
    description: "Disallow duplicate keys in JSON objects",
    severity: "error",
    fixable: false,
    why: r#"JSON does not define what happens when an object repeats a key.
Most parsers silently keep the last value, so the earlier entries are dead
text that readers still take at face value.

Keys are compared after escapes are decoded, so "a" and "\u0061" collide."#,
    options: "",
    bad_example: include_str!("no_duplicate_keys/bad.json"),
    good_example: include_str!("no_duplicate_keys/good.json"),
    references: &["https://github.com/eslint/json/tree/main/docs/rules/no-duplicate-keys.md"],
};

/// Reports the second and later occurrence of a key within one object
pub struct NoDuplicateKeys;

#[derive(Default)]
struct NoDuplicateKeysVisitor {
    /// Keys seen so far as UTF-16 units, one set per open object
    objects: Vec<HashSet<Vec<u16>>>,
}

/// Key as written: string contents without quotes, or the identifier.
fn raw_key(source: &JsonSourceCode, name: NodeId) -> String {
    let text = source.get_text(name, 0, 0);
    match source.node(name).kind {
        NodeKind::String { .. } if text.len() >= 2 => text[1..text.len() - 1].to_string(),
        _ => text.to_string(),
    }
}

impl RuleVisitor for NoDuplicateKeysVisitor {
    fn visit(&mut self, node: NodeId, phase: Phase, ctx: &mut RuleContext<'_>) {
        let source = ctx.source_code();
        match (source.node(node).node_type(), phase) {
            (NodeType::Object, Phase::Enter) => self.objects.push(HashSet::new()),
            (NodeType::Object, Phase::Exit) => {
                self.objects.pop();
            }
            (NodeType::Member, Phase::Enter) => {
                let Some((name, _)) = source.document().member_parts(node) else {
                    return;
                };
                let (Some(key), Some(seen)) =
                    (source.node(name).key_units(), self.objects.last_mut())
                else {
                    return;
                };
                if !seen.insert(key) {
                    let message = format!("Duplicate key \"{}\" found.", raw_key(source, name));
                    ctx.report_node(name, &message);
                }
            }
            _ => {}
        }
    }
}

impl LintRule for NoDuplicateKeys {
    fn name(&self) -> &'static str {
        "no-duplicate-keys"
    }

    fn category(&self) -> &'static str {
        "problem"
    }

    fn description(&self) -> &'static str {
        "Disallow duplicate keys in JSON objects"
    }

    fn listeners(&self) -> &'static [Listener] {
        const LISTENERS: &[Listener] = &[
            Listener::enter(NodeType::Object),
            Listener::enter(NodeType::Member),
            Listener::exit(NodeType::Object),
        ];
        LISTENERS
    }

    fn create(&self, _options: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleOptionsError> {
        Ok(Box::new(NoDuplicateKeysVisitor::default()))
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

    fn references(&self) -> Option<Vec<String>> {
        Some(DOC.references.iter().map(|s| s.to_string()).collect())
    }
}
