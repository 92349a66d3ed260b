//! Rule documentation for json-lint
//!
//! This module collects the documentation of each built-in rule, explaining
//! why the rule exists and which options it accepts.

pub use json_lint_common::docs::RuleDoc;

/// Get documentation for a rule by name, with or without the `json/` prefix
pub fn get_rule_doc(name: &str) -> Option<&'static RuleDoc> {
    let name = crate::linter::bare_rule_name(name);
    all_rule_docs().iter().find(|doc| doc.name == name).copied()
}

/// Get all rule documentation
pub fn all_rule_docs() -> &'static [&'static RuleDoc] {
    use crate::rules::{
        problem::{
            no_duplicate_keys, no_empty_keys, no_unnormalized_keys, no_unsafe_values,
            top_level_interop,
        },
        suggestion::sort_keys,
    };

    static DOCS: &[&RuleDoc] = &[
        // Problem
        &no_duplicate_keys::DOC,
        &no_empty_keys::DOC,
        &no_unnormalized_keys::DOC,
        &no_unsafe_values::DOC,
        &top_level_interop::DOC,
        // Suggestion
        &sort_keys::DOC,
    ];

    DOCS
}
