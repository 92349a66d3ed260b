//! `sort-keys`: require object keys to be sorted.
//!
//! The ordering is a [`KeyOrder`] built from the rule options. Reports are
//! attached to the name of the second key in each out-of-order pair, and the
//! first report of an object carries a [`Fix`] that sorts the whole object
//! unless a comment sits between its braces.

use crate::docs::RuleDoc;
use crate::linter::{Fix, LintRule, Listener, RuleContext, RuleOptionsError, RuleVisitor};
use crate::parser::ast::{NodeId, NodeKind, NodeType};
use crate::source_code::{JsonSourceCode, Phase};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::ops::Range;

/// Rule documentation
pub static DOC: RuleDoc = RuleDoc {
    name: "sort-keys",
    category: "suggestion",
    description: "Require JSON object keys to be sorted",
    severity: "off",
    fixable: true,
    why: r#"Sorted keys make large objects easier to scan and keep diffs small
when several people add entries to the same file.

With allowLineSeparatedGroups, a blank line starts a new group that is sorted
on its own."#,
    options: r#"["asc" | "desc", {
  "caseSensitive": true,
  "natural": false,
  "minKeys": 2,
  "allowLineSeparatedGroups": false
}]"#,
    bad_example: include_str!("sort_keys/bad.json"),
    good_example: include_str!("sort_keys/good.json"),
    references: &["https://github.com/eslint/json/tree/main/docs/rules/sort-keys.md"],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// Ordering of object keys selected by the rule options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOrder {
    pub direction: Direction,
    pub case_sensitive: bool,
    pub natural: bool,
}

impl Default for KeyOrder {
    fn default() -> Self {
        Self {
            direction: Direction::Ascending,
            case_sensitive: true,
            natural: false,
        }
    }
}

impl KeyOrder {
    /// Total order on keys: `Less` when `a` belongs before `b`.
    pub fn cmp(&self, a: &str, b: &str) -> Ordering {
        let ordering = if self.case_sensitive {
            self.cmp_ascending(a, b)
        } else {
            self.cmp_ascending(&a.to_lowercase(), &b.to_lowercase())
        };
        match self.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }

    pub fn is_valid_order(&self, prev: &str, next: &str) -> bool {
        self.cmp(prev, next) != Ordering::Greater
    }

    fn cmp_ascending(&self, a: &str, b: &str) -> Ordering {
        if self.natural {
            natural_cmp(a, b)
        } else {
            a.cmp(b)
        }
    }

    fn describe(&self) -> (&'static str, &'static str, &'static str) {
        (
            if self.natural { "natural" } else { "alphanumeric" },
            if self.case_sensitive {
                "sensitive"
            } else {
                "insensitive"
            },
            match self.direction {
                Direction::Ascending => "ascending",
                Direction::Descending => "descending",
            },
        )
    }
}

/// Compare with runs of ASCII digits ordered by numeric value, so `a2`
/// sorts before `a10`. Ties fall back to plain comparison.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.char_indices().peekable();
    let mut right = b.char_indices().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some((i, x)), Some((j, y))) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let x_end = digit_run_end(a, i);
                let y_end = digit_run_end(b, j);
                let x_num = a[i..x_end].trim_start_matches('0');
                let y_num = b[j..y_end].trim_start_matches('0');
                let ordering = x_num.len().cmp(&y_num.len()).then_with(|| x_num.cmp(y_num));
                if ordering != Ordering::Equal {
                    return ordering;
                }
                while left.next_if(|&(k, _)| k < x_end).is_some() {}
                while right.next_if(|&(k, _)| k < y_end).is_some() {}
            }
            (Some((_, x)), Some((_, y))) => {
                if x != y {
                    return x.cmp(&y);
                }
                left.next();
                right.next();
            }
        }
    }
}

fn digit_run_end(s: &str, start: usize) -> usize {
    s[start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(s.len(), |len| start + len)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SortKeysOptions {
    order: KeyOrder,
    min_keys: usize,
    allow_line_separated_groups: bool,
}

impl Default for SortKeysOptions {
    fn default() -> Self {
        Self {
            order: KeyOrder::default(),
            min_keys: 2,
            allow_line_separated_groups: false,
        }
    }
}

fn expect_bool(name: &str, value: &Value) -> Result<bool, RuleOptionsError> {
    value
        .as_bool()
        .ok_or_else(|| RuleOptionsError::new(format!("\"{}\" must be a boolean", name)))
}

fn parse_options(options: &[Value]) -> Result<SortKeysOptions, RuleOptionsError> {
    let mut parsed = SortKeysOptions::default();
    if options.len() > 2 {
        return Err(RuleOptionsError::new(format!(
            "Expected at most 2 options, got {}",
            options.len()
        )));
    }

    if let Some(direction) = options.first() {
        parsed.order.direction = match direction.as_str() {
            Some("asc") => Direction::Ascending,
            Some("desc") => Direction::Descending,
            _ => {
                return Err(RuleOptionsError::new(format!(
                    "Direction must be \"asc\" or \"desc\", got {}",
                    direction
                )));
            }
        };
    }

    if let Some(settings) = options.get(1) {
        let Value::Object(map) = settings else {
            return Err(RuleOptionsError::new(format!(
                "Expected an object, got {}",
                settings
            )));
        };
        for (key, value) in map {
            match key.as_str() {
                "caseSensitive" => parsed.order.case_sensitive = expect_bool(key, value)?,
                "natural" => parsed.order.natural = expect_bool(key, value)?,
                "allowLineSeparatedGroups" => {
                    parsed.allow_line_separated_groups = expect_bool(key, value)?
                }
                "minKeys" => {
                    parsed.min_keys = value
                        .as_u64()
                        .filter(|&n| n >= 2)
                        .and_then(|n| usize::try_from(n).ok())
                        .ok_or_else(|| {
                            RuleOptionsError::new(format!(
                                "\"minKeys\" must be an integer >= 2, got {}",
                                value
                            ))
                        })?
                }
                other => {
                    return Err(RuleOptionsError::new(format!(
                        "Unexpected property \"{}\"",
                        other
                    )));
                }
            }
        }
    }

    Ok(parsed)
}

/// Reports object keys that are out of order
pub struct SortKeys;

struct SortKeysVisitor {
    options: SortKeysOptions,
    comment_lines: Option<HashSet<usize>>,
}

impl SortKeysVisitor {
    /// Lines touched by any comment.
    fn comment_lines(&mut self, source: &JsonSourceCode) -> &HashSet<usize> {
        self.comment_lines.get_or_insert_with(|| {
            source
                .comments()
                .iter()
                .flat_map(|c| c.span.start.line..=c.span.end.line)
                .collect()
        })
    }

    /// True when a blank line that is not part of a comment sits between
    /// the two members.
    fn is_line_separated(&mut self, source: &JsonSourceCode, prev: NodeId, next: NodeId) -> bool {
        let prev_end = source.node(prev).span.end.line;
        let next_start = source.node(next).span.start.line;
        if next_start < prev_end + 2 {
            return false;
        }
        let lines = source.lines();
        let comment_lines = self.comment_lines(source);
        (prev_end + 1..next_start).any(|line| {
            !comment_lines.contains(&line)
                && lines
                    .get(line - 1)
                    .is_some_and(|text| text.trim().is_empty())
        })
    }

    /// Member index ranges sorted independently of each other.
    fn groups(&mut self, source: &JsonSourceCode, members: &[NodeId]) -> Vec<Range<usize>> {
        let mut groups = Vec::new();
        let mut start = 0;
        if self.options.allow_line_separated_groups {
            for i in 1..members.len() {
                if self.is_line_separated(source, members[i - 1], members[i]) {
                    groups.push(start..i);
                    start = i;
                }
            }
        }
        groups.push(start..members.len());
        groups
    }
}

/// Reorder `members` group by group into their existing slots. The text
/// between neighbouring slots is kept as is.
fn build_fix(
    source: &JsonSourceCode,
    object: NodeId,
    members: &[NodeId],
    keys: &[&str],
    groups: &[Range<usize>],
    order: &KeyOrder,
) -> Option<Fix> {
    let object_range = source.get_range(object);
    let has_interior_comment = source.comments().iter().any(|c| {
        c.span.start.offset > object_range.start && c.span.end.offset < object_range.end
    });
    if has_interior_comment {
        return None;
    }

    let mut sorted: Vec<usize> = (0..members.len()).collect();
    for group in groups {
        sorted[group.clone()].sort_by(|&a, &b| order.cmp(keys[a], keys[b]));
    }

    let first = (0..members.len()).find(|&i| sorted[i] != i)?;
    let last = (0..members.len()).rfind(|&i| sorted[i] != i)?;

    let text = source.text();
    let mut new_text = String::new();
    for slot in first..=last {
        new_text.push_str(&text[source.get_range(members[sorted[slot]])]);
        if slot < last {
            let gap = source.get_range(members[slot]).end..source.get_range(members[slot + 1]).start;
            new_text.push_str(&text[gap]);
        }
    }

    Some(Fix::replace_range(
        source.get_range(members[first]).start,
        source.get_range(members[last]).end,
        &new_text,
    ))
}

impl RuleVisitor for SortKeysVisitor {
    fn visit(&mut self, node: NodeId, _phase: Phase, ctx: &mut RuleContext<'_>) {
        let source = ctx.source_code();
        let NodeKind::Object { members } = &source.node(node).kind else {
            return;
        };
        if members.len() < self.options.min_keys {
            return;
        }

        let document = source.document();
        let keys: Vec<&str> = members
            .iter()
            .map(|&m| document.member_key(m).unwrap_or_default())
            .collect();
        let order = self.options.order;
        let (sort_name, sensitivity, direction) = order.describe();

        let mut reports = Vec::new();
        for i in 1..members.len() {
            let (prev, this) = (keys[i - 1], keys[i]);
            if order.is_valid_order(prev, this) {
                continue;
            }
            if self.options.allow_line_separated_groups
                && self.is_line_separated(source, members[i - 1], members[i])
            {
                continue;
            }
            let Some((name, _)) = document.member_parts(members[i]) else {
                continue;
            };
            let message = format!(
                "Expected object keys to be in {} case-{} {} order. '{}' should be before '{}'.",
                sort_name, sensitivity, direction, this, prev
            );
            reports.push(ctx.error(source.node(name).span, &message));
        }

        if reports.is_empty() {
            return;
        }

        let groups = self.groups(source, members);
        if let Some(fix) = build_fix(source, node, members, &keys, &groups, &order)
            && let Some(first) = reports.first_mut()
        {
            first.fix = Some(fix);
        }

        for report in reports {
            ctx.report(report);
        }
    }
}

impl LintRule for SortKeys {
    fn name(&self) -> &'static str {
        "sort-keys"
    }

    fn category(&self) -> &'static str {
        "suggestion"
    }

    fn description(&self) -> &'static str {
        "Require JSON object keys to be sorted"
    }

    fn listeners(&self) -> &'static [Listener] {
        const LISTENERS: &[Listener] = &[Listener::enter(NodeType::Object)];
        LISTENERS
    }

    fn create(&self, options: &[Value]) -> Result<Box<dyn RuleVisitor>, RuleOptionsError> {
        let options = parse_options(options)?;
        Ok(Box::new(SortKeysVisitor {
            options,
            comment_lines: None,
        }))
    }

    fn fixable(&self) -> bool {
        true
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
