use crate::docs::RuleDoc;
use crate::linter::{LintRule, Listener, RuleContext, RuleOptionsError, RuleSeverity, RuleVisitor};
use crate::parser::ast::{NodeId, NodeType};
use crate::source_code::Phase;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use unicode_normalization::{is_nfc, is_nfd, is_nfkc, is_nfkd};

/// Rule documentation
pub static DOC: RuleDoc = RuleDoc {
    name: "no-unnormalized-keys",
    category: "problem",
    description: "Disallow JSON keys that are not normalized",
    severity: "error",
    fixable: false,
    why: r#"The same visible key can be spelled with different code point
sequences. Two such keys look identical to a reader but compare unequal in
every program that consumes the document."#,
    options: r#"[{ "form": "NFC" | "NFD" | "NFKC" | "NFKD" }]  (default: NFC)"#,
    bad_example: include_str!("no_unnormalized_keys/bad.json"),
    good_example: include_str!("no_unnormalized_keys/good.json"),
    references: &[
        "https://github.com/eslint/json/tree/main/docs/rules/no-unnormalized-keys.md",
        "https://unicode.org/reports/tr15/",
    ],
};

/// Unicode normalization form a key must already be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationForm {
    #[default]
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
}

impl NormalizationForm {
    pub fn is_normalized(self, s: &str) -> bool {
        match self {
            NormalizationForm::Nfc => is_nfc(s),
            NormalizationForm::Nfd => is_nfd(s),
            NormalizationForm::Nfkc => is_nfkc(s),
            NormalizationForm::Nfkd => is_nfkd(s),
        }
    }
}

impl FromStr for NormalizationForm {
    type Err = RuleOptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NFC" => Ok(NormalizationForm::Nfc),
            "NFD" => Ok(NormalizationForm::Nfd),
            "NFKC" => Ok(NormalizationForm::Nfkc),
            "NFKD" => Ok(NormalizationForm::Nfkd),
            other => Err(RuleOptionsError::new(format!(
                "\"form\" must be one of NFC, NFD, NFKC, NFKD, got \"{}\"",
                other
            ))),
        }
    }
}

impl fmt::Display for NormalizationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NormalizationForm::Nfc => "NFC",
            NormalizationForm::Nfd => "NFD",
            NormalizationForm::Nfkc => "NFKC",
            NormalizationForm::Nfkd => "NFKD",
        };
        f.write_str(name)
    }
}

fn parse_options(options: &[Value]) -> Result<NormalizationForm, RuleOptionsError> {
    let Some(first) = options.first() else {
        return Ok(NormalizationForm::default());
    };
    let Value::Object(map) = first else {
        return Err(RuleOptionsError::new(format!(
            "Expected an object, got {}",
            first
        )));
    };
    let mut form = NormalizationForm::default();
    for (key, value) in map {
        match (key.as_str(), value) {
            ("form", Value::String(s)) => form = s.parse()?,
            ("form", other) => {
                return Err(RuleOptionsError::new(format!(
                    "\"form\" must be a string, got {}",
                    other
                )));
            }
            (other, _) => {
                return Err(RuleOptionsError::new(format!(
                    "Unexpected property \"{}\"",
                    other
                )));
            }
        }
    }
    Ok(form)
}

/// Reports keys that change under the configured normalization form
pub struct NoUnnormalizedKeys;

struct NoUnnormalizedKeysVisitor {
    form: NormalizationForm,
}

impl RuleVisitor for NoUnnormalizedKeysVisitor {
    fn visit(&mut self, node: NodeId, _phase: Phase, ctx: &mut RuleContext<'_>) {
        let source = ctx.source_code();
        let Some((name, _)) = source.document().member_parts(node) else {
            return;
        };
        if let Some(key) = source.node(name).key()
            && !self.form.is_normalized(key)
        {
            let message = format!("Unnormalized key '{}' found.", key);
            ctx.report_node(name, &message);
        }
    }
}

impl LintRule for NoUnnormalizedKeys {
    fn name(&self) -> &'static str {
        "no-unnormalized-keys"
    }

    fn category(&self) -> &'static str {
        "problem"
    }

    fn description(&self) -> &'static str {
        "Disallow JSON keys that are not normalized"
    }

    fn listeners(&self) -> &'static [Listener] {
        const LISTENERS: &[Listener] = &[Listener::enter(NodeType::Member)];
        LISTENERS
    }

    fn create(&self, options: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleOptionsError> {
        let form = parse_options(options)?;
        Ok(Box::new(NoUnnormalizedKeysVisitor { form }))
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
