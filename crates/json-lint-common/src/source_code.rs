//! Queryable, position-aware view of a parsed document.
//!
//! [`JsonSourceCode`] owns the text, the tree and the comment list. Derived
//! state (the split lines, the traversal order with its parent index and the
//! inline config comments) is computed on first use and cached in a
//! [`OnceLock`], so a shared instance computes each of them exactly once.
//!
//! # Example
//!
//! ```
//! use json_lint_common::language::{File, JsonLanguage, LanguageOptions, ParseOutcome};
//! use json_lint_common::parser::LanguageMode;
//!
//! let language = JsonLanguage::new(LanguageMode::Json);
//! let file = File::new("a.json", r#"{"a": [1]}"#);
//! let ParseOutcome::Ok(doc) = language.parse(&file, &LanguageOptions::default()) else {
//!     unreachable!()
//! };
//! let source = language.create_source_code(&file, doc);
//!
//! let steps: Vec<_> = source.traverse().collect();
//! assert_eq!(steps.len(), 12);
//! let last = steps[steps.len() - 1];
//! assert!(source.get_parent(last.target).is_none());
//! ```

use crate::position::LineIndex;
use json_lint_parser::ast::{Document, Node, NodeId, Position, Span};
use json_lint_parser::lexer::{Token, TokenKind};
use std::ops::Range;
use std::sync::OnceLock;

/// Whether a traversal step enters or leaves its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Enter,
    Exit,
}

/// One step of the depth-first document walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalStep {
    pub target: NodeId,
    pub phase: Phase,
    pub parent: Option<NodeId>,
}

/// Something with a location: a tree node or a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Node(NodeId),
    Token(Token),
}

impl From<NodeId> for Element {
    fn from(id: NodeId) -> Self {
        Element::Node(id)
    }
}

impl From<Token> for Element {
    fn from(token: Token) -> Self {
        Element::Token(token)
    }
}

impl From<&Token> for Element {
    fn from(token: &Token) -> Self {
        Element::Token(*token)
    }
}

#[derive(Debug)]
struct Traversal {
    steps: Vec<TraversalStep>,
    parents: Vec<Option<NodeId>>,
}

/// Source model for one JSON, JSONC or JSON5 document.
#[derive(Debug)]
pub struct JsonSourceCode {
    text: String,
    document: Document,
    comments: Vec<Token>,
    line_index: LineIndex,
    lines: OnceLock<Vec<String>>,
    traversal: OnceLock<Traversal>,
    pub(crate) inline_config_nodes: OnceLock<Vec<Token>>,
}

impl JsonSourceCode {
    pub fn new(text: String, document: Document) -> Self {
        let comments = document
            .tokens()
            .iter()
            .filter(|t| t.is_comment())
            .copied()
            .collect();
        let line_index = LineIndex::new(&text);
        Self {
            text,
            document,
            comments,
            line_index,
            lines: OnceLock::new(),
            traversal: OnceLock::new(),
            inline_config_nodes: OnceLock::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.document.node(id)
    }

    /// Every comment token in source order.
    pub fn comments(&self) -> &[Token] {
        &self.comments
    }

    /// Comment payload without the `//`, `/*` and `*/` delimiters.
    pub fn comment_value(&self, token: &Token) -> &str {
        let raw = &self.text[token.span.range()];
        match token.kind {
            TokenKind::LineComment => raw.strip_prefix("//").unwrap_or(raw),
            TokenKind::BlockComment => raw
                .strip_prefix("/*")
                .and_then(|s| s.strip_suffix("*/"))
                .unwrap_or(raw),
            _ => raw,
        }
    }

    /// Lines of the text, split on LF, CR or CRLF.
    pub fn lines(&self) -> &[String] {
        self.lines.get_or_init(|| {
            let mut lines = Vec::with_capacity(self.line_index.line_count());
            let mut rest = self.text.as_str();
            while let Some(idx) = rest.find(['\n', '\r']) {
                lines.push(rest[..idx].to_string());
                let skip = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[idx + skip..];
            }
            lines.push(rest.to_string());
            lines
        })
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn position_at(&self, offset: usize) -> Position {
        self.line_index.position_at(&self.text, offset)
    }

    pub fn offset_at(&self, line: usize, column: usize) -> Option<usize> {
        self.line_index.offset_at(&self.text, line, column)
    }

    /// Byte range of a node or token.
    pub fn get_range(&self, element: impl Into<Element>) -> Range<usize> {
        self.get_loc(element).range()
    }

    /// Start and end position of a node or token.
    pub fn get_loc(&self, element: impl Into<Element>) -> Span {
        match element.into() {
            Element::Node(id) => self.document.node(id).span,
            Element::Token(token) => token.span,
        }
    }

    /// The whole text.
    pub fn get_text_all(&self) -> &str {
        &self.text
    }

    /// Source text of `element`, widened by `before` characters on the left
    /// and `after` characters on the right. Widening stops at either end of
    /// the text.
    pub fn get_text(&self, element: impl Into<Element>, before: usize, after: usize) -> &str {
        let range = self.get_range(element);
        let start = self.text[..range.start]
            .chars()
            .rev()
            .take(before)
            .fold(range.start, |offset, ch| offset - ch.len_utf8());
        let end = self.text[range.end..]
            .chars()
            .take(after)
            .fold(range.end, |offset, ch| offset + ch.len_utf8());
        &self.text[start..end]
    }

    /// Depth-first walk of the tree, entering each node before its children
    /// and leaving it after them. The walk is computed once; every call
    /// returns a fresh iterator over the same steps.
    pub fn traverse(&self) -> impl Iterator<Item = TraversalStep> + '_ {
        self.traversal().steps.iter().copied()
    }

    fn traversal(&self) -> &Traversal {
        self.traversal.get_or_init(|| {
            let mut steps = Vec::with_capacity(self.document.len() * 2);
            let mut parents = vec![None; self.document.len()];
            let mut stack: Vec<(NodeId, Option<NodeId>, Phase)> =
                vec![(self.document.root(), None, Phase::Enter)];

            while let Some((target, parent, phase)) = stack.pop() {
                steps.push(TraversalStep {
                    target,
                    phase,
                    parent,
                });
                if phase == Phase::Exit {
                    continue;
                }
                parents[target.index()] = parent;
                stack.push((target, parent, Phase::Exit));
                for child in self.document.node(target).children().into_iter().rev() {
                    stack.push((child, Some(target), Phase::Enter));
                }
            }

            tracing::trace!(steps = steps.len(), "built traversal");
            Traversal { steps, parents }
        })
    }

    /// Parent of `node`. Always `None` until [`traverse`](Self::traverse) has run.
    pub fn get_parent(&self, node: NodeId) -> Option<NodeId> {
        self.traversal
            .get()
            .and_then(|t| t.parents.get(node.index()).copied().flatten())
    }

    /// Ancestors of `node` from the root down to its parent. Empty until
    /// [`traverse`](Self::traverse) has run.
    pub fn get_ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.get_parent(node);
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.get_parent(parent);
        }
        ancestors.reverse();
        ancestors
    }

    /// Token immediately before the first token of `element`.
    pub fn get_token_before(
        &self,
        element: impl Into<Element>,
        include_comments: bool,
    ) -> Option<Token> {
        let tokens = self.document.tokens();
        let range = self.get_range(element);
        let idx = tokens.partition_point(|t| t.span.start.offset < range.start);
        if tokens.get(idx)?.span.start.offset != range.start {
            return None;
        }
        tokens[..idx]
            .iter()
            .rev()
            .find(|t| include_comments || !t.is_comment())
            .copied()
    }

    /// Token immediately after the last token of `element`.
    pub fn get_token_after(
        &self,
        element: impl Into<Element>,
        include_comments: bool,
    ) -> Option<Token> {
        let tokens = self.document.tokens();
        let range = self.get_range(element);
        let idx = tokens.partition_point(|t| t.span.end.offset < range.end);
        if tokens.get(idx)?.span.end.offset != range.end {
            return None;
        }
        tokens[idx + 1..]
            .iter()
            .find(|t| include_comments || !t.is_comment())
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use json_lint_parser::ast::{NodeKind, NodeType};
    use json_lint_parser::{LanguageMode, ParseOptions, parse};

    fn source(text: &str, mode: LanguageMode) -> JsonSourceCode {
        let doc = parse(text, &ParseOptions::new(mode)).unwrap();
        JsonSourceCode::new(text.to_string(), doc)
    }

    fn first_member(source: &JsonSourceCode) -> NodeId {
        match &source.node(source.document().body()).kind {
            NodeKind::Object { members } => members[0],
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_comments_are_collected() {
        let src = source("// a\n{/* b */}", LanguageMode::Jsonc);
        assert_eq!(src.comments().len(), 2);
        assert_eq!(src.comment_value(&src.comments()[0]), " a");
        assert_eq!(src.comment_value(&src.comments()[1]), " b ");
    }

    #[test]
    fn test_get_text() {
        let src = source(r#"{"a": 1}"#, LanguageMode::Json);
        let member = first_member(&src);
        assert_eq!(src.get_text(member, 0, 0), r#""a": 1"#);
        assert_eq!(src.get_text(member, 1, 1), r#"{"a": 1}"#);
        let root = src.document().root();
        assert_eq!(src.get_text(root, 1, 1), r#"{"a": 1}"#);
        assert_eq!(src.get_text(root, 5, 5), src.get_text_all());
    }

    #[test]
    fn test_get_text_widening_counts_characters() {
        let src = source(r#"["é", 1]"#, LanguageMode::Json);
        let NodeKind::Array { elements } = &src.node(src.document().body()).kind else {
            panic!("expected array");
        };
        assert_eq!(src.get_text(elements[1], 4, 0), "é\", 1");
    }

    #[test]
    fn test_lines() {
        let lf = source("{\n\"a\": 1\n}", LanguageMode::Json);
        let crlf = source("{\r\n\"a\": 1\r\n}", LanguageMode::Json);
        let cr = source("{\r\"a\": 1\r}", LanguageMode::Json);
        assert_eq!(lf.lines(), &["{", "\"a\": 1", "}"]);
        assert_eq!(crlf.lines(), lf.lines());
        assert_eq!(cr.lines(), lf.lines());
    }

    #[test]
    fn test_lines_keeps_trailing_empty_line() {
        let src = source("1\n", LanguageMode::Json);
        assert_eq!(src.lines(), &["1", ""]);
        assert_eq!(src.lines().len(), src.line_index().line_count());
    }

    #[test]
    fn test_traverse_order() {
        let src = source(r#"{"a": [1]}"#, LanguageMode::Json);
        let steps: Vec<(NodeType, Phase)> = src
            .traverse()
            .map(|s| (src.node(s.target).node_type(), s.phase))
            .collect();
        assert_eq!(
            steps,
            vec![
                (NodeType::Document, Phase::Enter),
                (NodeType::Object, Phase::Enter),
                (NodeType::Member, Phase::Enter),
                (NodeType::String, Phase::Enter),
                (NodeType::String, Phase::Exit),
                (NodeType::Array, Phase::Enter),
                (NodeType::Number, Phase::Enter),
                (NodeType::Number, Phase::Exit),
                (NodeType::Array, Phase::Exit),
                (NodeType::Member, Phase::Exit),
                (NodeType::Object, Phase::Exit),
                (NodeType::Document, Phase::Exit),
            ]
        );
    }

    #[test]
    fn test_traverse_is_stable() {
        let src = source(r#"{"a": {"b": [1, 2]}, "c": null}"#, LanguageMode::Json);
        let first: Vec<_> = src.traverse().collect();
        let second: Vec<_> = src.traverse().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parent_index_requires_traversal() {
        let src = source(r#"{"a": 1}"#, LanguageMode::Json);
        let member = first_member(&src);
        assert_eq!(src.get_parent(member), None);
        assert!(src.get_ancestors(member).is_empty());

        src.traverse().for_each(drop);

        let body = src.document().body();
        let root = src.document().root();
        assert_eq!(src.get_parent(member), Some(body));
        assert_eq!(src.get_ancestors(member), vec![root, body]);
        assert_eq!(src.get_parent(root), None);
    }

    #[test]
    fn test_grandparent_matches_ancestors() {
        let src = source(r#"{"a": [[1]]}"#, LanguageMode::Json);
        src.traverse().for_each(drop);
        for (id, _) in src.document().nodes() {
            let ancestors = src.get_ancestors(id);
            if let Some(grandparent) = src.get_parent(id).and_then(|p| src.get_parent(p)) {
                assert_eq!(ancestors[ancestors.len() - 2], grandparent);
            }
        }
    }

    #[test]
    fn test_token_navigation() {
        let src = source("{\"a\": /* c */ 1}", LanguageMode::Jsonc);
        let member = first_member(&src);
        let (name, value) = src.document().member_parts(member).unwrap();

        let before = src.get_token_before(member, false).unwrap();
        assert_eq!(before.kind, TokenKind::LBrace);

        let after_name = src.get_token_after(name, false).unwrap();
        assert_eq!(after_name.kind, TokenKind::Colon);

        let before_value = src.get_token_before(value, false).unwrap();
        assert_eq!(before_value.kind, TokenKind::Colon);
        let before_value = src.get_token_before(value, true).unwrap();
        assert_eq!(before_value.kind, TokenKind::BlockComment);

        let after_member = src.get_token_after(member, false).unwrap();
        assert_eq!(after_member.kind, TokenKind::RBrace);
        assert!(src.get_token_after(after_member, true).is_none());
        assert!(src.get_token_before(src.document().tokens()[0], true).is_none());
    }

    #[test]
    fn test_token_navigation_round_trip() {
        let src = source("[1, /* x */ 2, {\"a\": null}]", LanguageMode::Jsonc);
        let tokens = src.document().tokens();
        for token in &tokens[..tokens.len() - 1] {
            let after = src.get_token_after(token, true).unwrap();
            assert_eq!(src.get_token_before(after, true), Some(*token));
        }
    }

    #[test]
    fn test_token_navigation_unlocatable_element() {
        let src = source("  [1]", LanguageMode::Json);
        // The document node starts at offset 0, where no token begins
        assert!(
            src.get_token_before(src.document().root(), true)
                .is_none()
        );
    }

    #[test]
    fn test_position_helpers() {
        let src = source("{\n  \"a\": 1\n}", LanguageMode::Json);
        assert_eq!(src.position_at(4), Position::new(2, 3, 4));
        assert_eq!(src.offset_at(2, 3), Some(4));
    }
}
