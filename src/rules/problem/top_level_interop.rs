use crate::docs::RuleDoc;
use crate::linter::{LintRule, Listener, RuleContext, RuleOptionsError, RuleVisitor};
use crate::parser::ast::{NodeId, NodeType};
use crate::source_code::Phase;
use serde_json::Value;

/// Rule documentation
pub static DOC: RuleDoc = RuleDoc {
    name: "top-level-interop",
    category: "problem",
    description: "Require the JSON top-level value to be an array or object",
    severity: "off",
    fixable: false,
    why: r#"RFC 4627 only allowed an object or an array at the top level. Later
revisions accept any value, but older parsers still reject scalars there."#,
    options: "",
    bad_example: include_str!("top_level_interop/bad.json"),
    good_example: include_str!("top_level_interop/good.json"),
    references: &[
        "https://github.com/eslint/json/tree/main/docs/rules/top-level-interop.md",
        "https://www.rfc-editor.org/rfc/rfc4627#section-2",
    ],
};

/// Reports a document whose top-level value is a scalar
pub struct TopLevelInterop;

struct TopLevelInteropVisitor;

impl RuleVisitor for TopLevelInteropVisitor {
    fn visit(&mut self, node: NodeId, _phase: Phase, ctx: &mut RuleContext<'_>) {
        let source = ctx.source_code();
        let body_type = source.node(source.document().body()).node_type();
        if !matches!(body_type, NodeType::Object | NodeType::Array) {
            let message = format!(
                "Top level item should be array or object, got '{}'.",
                body_type
            );
            ctx.report_node(node, &message);
        }
    }
}

impl LintRule for TopLevelInterop {
    fn name(&self) -> &'static str {
        "top-level-interop"
    }

    fn category(&self) -> &'static str {
        "problem"
    }

    fn description(&self) -> &'static str {
        "Require the JSON top-level value to be an array or object"
    }

    fn listeners(&self) -> &'static [Listener] {
        const LISTENERS: &[Listener] = &[Listener::enter(NodeType::Document)];
        LISTENERS
    }

    fn create(&self, _options: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleOptionsError> {
        Ok(Box::new(TopLevelInteropVisitor))
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

#[cfg(test)]
mod tests {
    use crate::parser::LanguageMode;
    use crate::test_support::{lint_with_rule, messages};

    #[test]
    fn test_object_and_array_pass() {
        for text in ["{}", "[]", "[1, 2]", "\n{\"a\": 1}\n"] {
            assert!(lint_with_rule("top-level-interop", text, LanguageMode::Json).is_empty());
        }
    }

    #[test]
    fn test_scalars_are_reported() {
        for (text, ty) in [
            ("\"a\"", "String"),
            ("1", "Number"),
            ("true", "Boolean"),
            ("null", "Null"),
        ] {
            let errors = lint_with_rule("top-level-interop", text, LanguageMode::Json);
            assert_eq!(
                messages(&errors),
                vec![format!("Top level item should be array or object, got '{}'.", ty)]
            );
        }
    }

    #[test]
    fn test_json5_special_numbers() {
        let errors = lint_with_rule("top-level-interop", "-Infinity", LanguageMode::Json5);
        assert_eq!(
            messages(&errors),
            vec!["Top level item should be array or object, got 'Infinity'."]
        );
        let errors = lint_with_rule("top-level-interop", "NaN", LanguageMode::Json5);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_reported_at_document() {
        let errors = lint_with_rule("top-level-interop", "// c\n42\n", LanguageMode::Jsonc);
        assert_eq!((errors[0].line, errors[0].column), (Some(1), Some(1)));
        assert_eq!(errors[0].end_line, Some(3));
    }
}
