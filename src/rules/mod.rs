pub mod problem;
pub mod suggestion;

use crate::linter::LintRule;

pub use problem::{NoDuplicateKeys, NoEmptyKeys, NoUnnormalizedKeys, NoUnsafeValues, TopLevelInterop};
pub use suggestion::SortKeys;

/// Every built-in rule, in documentation order
pub fn all_rules() -> Vec<Box<dyn LintRule>> {
    vec![
        Box::new(NoDuplicateKeys),
        Box::new(NoEmptyKeys),
        Box::new(NoUnnormalizedKeys),
        Box::new(NoUnsafeValues),
        Box::new(TopLevelInterop),
        Box::new(SortKeys),
    ]
}
