//! Parsing of inline configuration comment payloads.
//!
//! Two grammars live here:
//!
//! - the directive line, `<label> <value> -- <justification>`, where the
//!   label is one of `eslint`, `eslint-disable`, `eslint-enable`,
//!   `eslint-disable-line` or `eslint-disable-next-line`;
//! - the rule configuration value of an `eslint` comment, a relaxed object
//!   literal such as `json/sort-keys: [warn, desc], no-empty-keys: off`.

use regex::Regex;
use serde_json::{Map, Number, Value};
use std::sync::LazyLock;
use thiserror::Error;

const LABELS: [&str; 5] = [
    "eslint",
    "eslint-enable",
    "eslint-disable",
    "eslint-disable-line",
    "eslint-disable-next-line",
];

/// Matches the label at the start of a directive comment, in any case.
pub static DIRECTIVE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(eslint(?:-enable|-disable(?:-next-line|-line)?)?)(?:\s|$)")
        .expect("directive label pattern is valid")
});

static JUSTIFICATION_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s-{2,}\s").expect("separator pattern is valid"));

static BARE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([-a-zA-Z0-9/]+):").expect("bare key pattern is valid"));

static MISSING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\]|[0-9])\s+""#).expect("missing comma pattern is valid"));

/// The three parts of a directive comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveText<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub justification: &'a str,
}

/// Split a comment payload into label, value and justification.
///
/// Returns `None` when the payload does not start with a directive label.
/// The returned label is lowercase.
pub fn parse_directive(text: &str) -> Option<DirectiveText<'_>> {
    let (directive, justification) = match JUSTIFICATION_SEPARATOR.find(text) {
        Some(m) => (&text[..m.start()], text[m.end()..].trim()),
        None => (text, ""),
    };

    let captures = DIRECTIVE_LABEL.captures(directive)?;
    let label = captures.get(1)?;
    let canonical = LABELS
        .into_iter()
        .find(|name| name.eq_ignore_ascii_case(label.as_str()))?;
    Some(DirectiveText {
        label: canonical,
        value: directive[label.end()..].trim(),
        justification,
    })
}

/// Split a comma separated list of rule names, dropping empty entries and
/// surrounding quotes.
pub fn parse_list_config(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Failure to read the value of an `eslint` configuration comment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to parse JSON from '{normalized}': {reason}")]
pub struct ConfigCommentError {
    pub normalized: String,
    pub reason: String,
}

/// Parse the value of an `eslint` configuration comment into a rule map.
///
/// The relaxed grammar is tried first. When it fails, or yields a severity
/// that is not recognized, bare keys are quoted, a missing comma is inserted
/// and the result is read as a JSON object body.
pub fn parse_json_like_config(text: &str) -> Result<Map<String, Value>, ConfigCommentError> {
    if let Some(items) = RelaxedParser::new(text).parse()
        && items.values().all(|value| {
            let severity = match value {
                Value::Array(items) => items.first().unwrap_or(&Value::Null),
                other => other,
            };
            is_severity_valid(severity)
        })
    {
        return Ok(items);
    }

    let quoted = BARE_KEY.replace_all(text, "\"$1\":");
    let normalized = match MISSING_COMMA.captures(&quoted) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let closing = caps.get(1).map_or("", |m| m.as_str());
            format!(
                "{}{},{}",
                &quoted[..whole.start],
                closing,
                &quoted[whole.end - 1..]
            )
        }
        None => quoted.into_owned(),
    };

    match serde_json::from_str::<Value>(&format!("{{{}}}", normalized)) {
        Ok(Value::Object(items)) => Ok(items),
        Ok(other) => Err(ConfigCommentError {
            normalized,
            reason: format!("expected an object, got {}", other),
        }),
        Err(e) => Err(ConfigCommentError {
            normalized,
            reason: e.to_string(),
        }),
    }
}

/// Whether `value` names a severity: 0, 1, 2, "off", "warn" or "error".
pub fn is_severity_valid(value: &Value) -> bool {
    match value {
        Value::Number(n) => matches!(n.as_u64(), Some(0..=2)),
        Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "off" | "warn" | "error"),
        _ => false,
    }
}

/// Deepest array/object nesting the relaxed reader accepts.
const MAX_RELAXED_DEPTH: usize = 64;

/// Lenient object reader: keys and string values may be bare words, values
/// may be nested arrays or objects, and commas between entries are optional.
struct RelaxedParser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> RelaxedParser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            depth: 0,
        }
    }

    fn parse(mut self) -> Option<Map<String, Value>> {
        self.skip_whitespace();
        let map = if self.peek() == Some('{') {
            self.bump();
            self.object_body(Some('}'))?
        } else {
            self.object_body(None)?
        };
        self.skip_whitespace();
        self.peek().is_none().then_some(map)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn skip_separator(&mut self) {
        self.skip_whitespace();
        if self.peek() == Some(',') {
            self.bump();
        }
    }

    fn object_body(&mut self, closing: Option<char>) -> Option<Map<String, Value>> {
        let mut map = Map::new();
        loop {
            self.skip_whitespace();
            match (self.peek(), closing) {
                (None, None) => return Some(map),
                (None, Some(_)) => return None,
                (Some(ch), Some(close)) if ch == close => {
                    self.bump();
                    return Some(map);
                }
                _ => {}
            }

            let key = self.key()?;
            self.skip_whitespace();
            if self.bump()? != ':' {
                return None;
            }
            self.skip_whitespace();
            let value = self.value()?;
            map.insert(key, value);
            self.skip_separator();
        }
    }

    fn key(&mut self) -> Option<String> {
        match self.peek()? {
            '"' | '\'' => self.quoted(),
            _ => {
                let word = self.bare_word();
                (!word.is_empty()).then(|| word.to_string())
            }
        }
    }

    /// Step into a nested array or object; `None` past the depth limit.
    fn descend(&mut self) -> Option<()> {
        if self.depth >= MAX_RELAXED_DEPTH {
            return None;
        }
        self.depth += 1;
        self.bump();
        Some(())
    }

    fn value(&mut self) -> Option<Value> {
        match self.peek()? {
            '[' => {
                self.descend()?;
                let mut items = Vec::new();
                loop {
                    self.skip_whitespace();
                    if self.peek()? == ']' {
                        self.bump();
                        self.depth -= 1;
                        return Some(Value::Array(items));
                    }
                    items.push(self.value()?);
                    self.skip_separator();
                }
            }
            '{' => {
                self.descend()?;
                let map = self.object_body(Some('}'))?;
                self.depth -= 1;
                Some(Value::Object(map))
            }
            '"' | '\'' => self.quoted().map(Value::String),
            _ => {
                let word = self.bare_word();
                if word.is_empty() {
                    return None;
                }
                Some(bare_value(word))
            }
        }
    }

    fn bare_word(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || matches!(ch, ',' | ':' | '[' | ']' | '{' | '}' | '"' | '\'') {
                break;
            }
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn quoted(&mut self) -> Option<String> {
        let quote = self.bump()?;
        let mut value = String::new();
        loop {
            match self.bump()? {
                '\\' => value.push(self.bump()?),
                ch if ch == quote => return Some(value),
                ch => value.push(ch),
            }
        }
    }
}

fn bare_value(word: &str) -> Value {
    match word {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => {
            if let Ok(n) = word.parse::<i64>() {
                Value::Number(n.into())
            } else if let Some(n) = word.parse::<f64>().ok().and_then(Number::from_f64) {
                Value::Number(n)
            } else {
                Value::String(word.to_string())
            }
        }
    }
}
