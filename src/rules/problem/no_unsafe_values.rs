use crate::docs::RuleDoc;
use crate::linter::{LintRule, Listener, RuleContext, RuleOptionsError, RuleSeverity, RuleVisitor};
use crate::parser::ast::{NodeId, NodeKind, NodeType};
use crate::source_code::Phase;
use serde_json::Value;

/// Rule documentation
pub static DOC: RuleDoc = RuleDoc {
    name: "no-unsafe-values",
    category: "problem",
    description: "Disallow JSON values that are unsafe for interchange",
    severity: "error",
    fixable: false,
    why: r#"Some values parse without complaint but do not survive a round trip
through common JSON implementations:

- numbers that overflow to Infinity
- numbers that underflow to zero although they were written non-zero
- integers beyond 2^53 - 1, which lose precision as doubles
- subnormal numbers
- strings containing unpaired UTF-16 surrogates"#,
    options: "",
    bad_example: include_str!("no_unsafe_values/bad.json"),
    good_example: include_str!("no_unsafe_values/good.json"),
    references: &[
        "https://github.com/eslint/json/tree/main/docs/rules/no-unsafe-values.md",
        "https://en.wikipedia.org/wiki/Subnormal_number",
    ],
};

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
const EXPONENT_MASK: u64 = 0x7ff0_0000_0000_0000;

/// Reports numbers and strings that do not round-trip safely
pub struct NoUnsafeValues;

struct NoUnsafeValuesVisitor;

fn is_hex(raw: &str) -> bool {
    raw.starts_with("0x") || raw.starts_with("0X")
}

/// True when the literal has a non-zero digit before its exponent.
fn has_non_zero_mantissa(raw: &str) -> bool {
    if is_hex(raw) {
        return false;
    }
    raw.split(['e', 'E'])
        .next()
        .is_some_and(|mantissa| mantissa.bytes().any(|b| (b'1'..=b'9').contains(&b)))
}

/// Literal written without a fraction or exponent.
fn is_integer_literal(raw: &str) -> bool {
    is_hex(raw) || !raw.contains(['.', 'e', 'E'])
}

fn check_number(value: f64, raw: &str) -> Option<String> {
    let raw = raw.trim_start_matches(['+', '-']);
    if !value.is_finite() {
        return Some("Number outside safe range found.".to_string());
    }
    if value == 0.0 {
        return has_non_zero_mantissa(raw)
            .then(|| "This number will evaluate to zero, which is unintended.".to_string());
    }
    if is_integer_literal(raw) {
        return (value.abs() > MAX_SAFE_INTEGER)
            .then(|| "Integer outside safe range found.".to_string());
    }
    (value.to_bits() & EXPONENT_MASK == 0).then(|| {
        format!(
            "Unexpected subnormal number '{:e}' found.  Subnormal numbers are outside the safe range.",
            value
        )
    })
}

impl RuleVisitor for NoUnsafeValuesVisitor {
    fn visit(&mut self, node: NodeId, _phase: Phase, ctx: &mut RuleContext<'_>) {
        let source = ctx.source_code();
        match &source.node(node).kind {
            NodeKind::Number { value } => {
                if let Some(message) = check_number(*value, source.get_text(node, 0, 0)) {
                    ctx.report_node(node, &message);
                }
            }
            NodeKind::String {
                lone_surrogates, ..
            } => {
                for (_, unit) in lone_surrogates {
                    let message = format!("Lone surrogate '\\u{:04x}' found.", unit);
                    ctx.report_node(node, &message);
                }
            }
            _ => {}
        }
    }
}

impl LintRule for NoUnsafeValues {
    fn name(&self) -> &'static str {
        "no-unsafe-values"
    }

    fn category(&self) -> &'static str {
        "problem"
    }

    fn description(&self) -> &'static str {
        "Disallow JSON values that are unsafe for interchange"
    }

    fn listeners(&self) -> &'static [Listener] {
        const LISTENERS: &[Listener] = &[
            Listener::enter(NodeType::Number),
            Listener::enter(NodeType::String),
        ];
        LISTENERS
    }

    fn create(&self, _options: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleOptionsError> {
        Ok(Box::new(NoUnsafeValuesVisitor))
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
