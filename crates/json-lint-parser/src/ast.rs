//! Tree types for JSON, JSONC and JSON5 documents.
//!
//! The parser produces a [`Document`]: an arena of [`Node`]s addressed by
//! [`NodeId`], plus the full token stream (comments included). The tree is
//! immutable once built, so consumers keep parent links and other derived
//! state in side tables indexed by [`NodeId::index`].
//!
//! # Tree Structure
//!
//! ```text
//! Document
//!  └─ body
//!       ├─ Object
//!       │    └─ members: Vec<Member>
//!       │         ├─ name   (String | Identifier)
//!       │         └─ value  (any value node)
//!       ├─ Array
//!       │    └─ elements: Vec<value node>
//!       └─ String | Number | Boolean | Null | Infinity | NaN
//! ```
//!
//! # Example
//!
//! ```
//! use json_lint_parser::{LanguageMode, ParseOptions, parse};
//! use json_lint_parser::ast::{NodeKind, NodeType};
//!
//! let doc = parse(r#"{"a": 1}"#, &ParseOptions::new(LanguageMode::Json)).unwrap();
//! let body = doc.node(doc.body());
//!
//! assert_eq!(body.node_type(), NodeType::Object);
//! assert!(matches!(&body.kind, NodeKind::Object { members } if members.len() == 1));
//! ```

use crate::lexer::Token;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// A position (line, column, byte offset) in the source text.
///
/// Lines and columns are 1-based and columns count characters; `offset` is a
/// 0-based byte offset suitable for slicing the original source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    /// 0-based byte offset in the source string.
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open source range defined by a start and end [`Position`].
///
/// `start` is inclusive, `end` is exclusive (one past the last character).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start position.
    pub start: Position,
    /// Exclusive end position.
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Byte range of this span, usable for slicing the source text.
    pub fn range(&self) -> Range<usize> {
        self.start.offset..self.end.offset
    }

    /// Returns true when `other` lies entirely within this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }
}

/// Index of a node inside a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

/// Explicit sign on a JSON5 `Infinity` or `NaN` literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sign {
    #[default]
    Unsigned,
    Plus,
    Minus,
}

impl Sign {
    pub fn as_str(self) -> &'static str {
        match self {
            Sign::Unsigned => "",
            Sign::Plus => "+",
            Sign::Minus => "-",
        }
    }
}

/// The type tag of a node, used for visitor dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    Document,
    Object,
    Array,
    Member,
    String,
    Number,
    Boolean,
    Null,
    Identifier,
    Infinity,
    NaN,
}

impl NodeType {
    pub const ALL: [NodeType; 11] = [
        NodeType::Document,
        NodeType::Object,
        NodeType::Array,
        NodeType::Member,
        NodeType::String,
        NodeType::Number,
        NodeType::Boolean,
        NodeType::Null,
        NodeType::Identifier,
        NodeType::Infinity,
        NodeType::NaN,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Document => "Document",
            NodeType::Object => "Object",
            NodeType::Array => "Array",
            NodeType::Member => "Member",
            NodeType::String => "String",
            NodeType::Number => "Number",
            NodeType::Boolean => "Boolean",
            NodeType::Null => "Null",
            NodeType::Identifier => "Identifier",
            NodeType::Infinity => "Infinity",
            NodeType::NaN => "NaN",
        }
    }

    /// Child fields visited for this node type, in traversal order.
    pub fn visitor_keys(self) -> &'static [&'static str] {
        match self {
            NodeType::Document => &["body"],
            NodeType::Object => &["members"],
            NodeType::Member => &["name", "value"],
            NodeType::Array => &["elements"],
            _ => &[],
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a [`NodeType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown node type '{0}'")]
pub struct UnknownNodeType(pub String);

impl FromStr for NodeType {
    type Err = UnknownNodeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownNodeType(s.to_string()))
    }
}

/// Node payload. Child references point back into the owning [`Document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Document {
        body: NodeId,
    },
    Object {
        members: Vec<NodeId>,
    },
    Array {
        elements: Vec<NodeId>,
    },
    Member {
        name: NodeId,
        value: NodeId,
    },
    /// A string literal. `value` is the decoded text with any unpaired
    /// surrogate escape replaced by U+FFFD; each entry of `lone_surrogates`
    /// holds the byte offset of that U+FFFD in `value` and the escaped code
    /// unit, in source order.
    String {
        value: String,
        lone_surrogates: Vec<(usize, u16)>,
    },
    Number {
        value: f64,
    },
    Boolean {
        value: bool,
    },
    Null,
    /// An unquoted JSON5 member name.
    Identifier {
        name: String,
    },
    Infinity {
        sign: Sign,
    },
    NaN {
        sign: Sign,
    },
}

/// A node with its source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

impl Node {
    pub fn node_type(&self) -> NodeType {
        match &self.kind {
            NodeKind::Document { .. } => NodeType::Document,
            NodeKind::Object { .. } => NodeType::Object,
            NodeKind::Array { .. } => NodeType::Array,
            NodeKind::Member { .. } => NodeType::Member,
            NodeKind::String { .. } => NodeType::String,
            NodeKind::Number { .. } => NodeType::Number,
            NodeKind::Boolean { .. } => NodeType::Boolean,
            NodeKind::Null => NodeType::Null,
            NodeKind::Identifier { .. } => NodeType::Identifier,
            NodeKind::Infinity { .. } => NodeType::Infinity,
            NodeKind::NaN { .. } => NodeType::NaN,
        }
    }

    /// Direct children in [`NodeType::visitor_keys`] order.
    pub fn children(&self) -> Vec<NodeId> {
        match &self.kind {
            NodeKind::Document { body } => vec![*body],
            NodeKind::Object { members } => members.clone(),
            NodeKind::Array { elements } => elements.clone(),
            NodeKind::Member { name, value } => vec![*name, *value],
            _ => Vec::new(),
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.span.range()
    }

    /// Key text for a member name node (`String` value or `Identifier` name).
    pub fn key(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::String { value, .. } => Some(value),
            NodeKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    /// Key as UTF-16 code units, with lone surrogates restored. Two keys are
    /// the same key exactly when these are equal.
    pub fn key_units(&self) -> Option<Vec<u16>> {
        match &self.kind {
            NodeKind::String {
                value,
                lone_surrogates,
            } => {
                let mut units = Vec::with_capacity(value.len());
                let mut lone = lone_surrogates.iter().peekable();
                for (offset, ch) in value.char_indices() {
                    match lone.next_if(|(at, _)| *at == offset) {
                        Some(&(_, unit)) => units.push(unit),
                        None => units.extend(ch.encode_utf16(&mut [0; 2]).iter()),
                    }
                }
                Some(units)
            }
            NodeKind::Identifier { name } => Some(name.encode_utf16().collect()),
            _ => None,
        }
    }
}

/// A parsed document: node arena, root id and token stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: NodeId,
    pub(crate) tokens: Vec<Token>,
}

impl Document {
    /// The `Document` node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The top-level value node.
    pub fn body(&self) -> NodeId {
        match &self.node(self.root).kind {
            NodeKind::Document { body } => *body,
            _ => self.root,
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes with their ids, in allocation order (children before parents).
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::from_index(i), node))
    }

    /// Every token in source order, comments included.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// For a `Member` node, returns `(name, value)`.
    pub fn member_parts(&self, id: NodeId) -> Option<(NodeId, NodeId)> {
        match &self.node(id).kind {
            NodeKind::Member { name, value } => Some((*name, *value)),
            _ => None,
        }
    }

    /// Decoded key of a `Member` node.
    pub fn member_key(&self, id: NodeId) -> Option<&str> {
        let (name, _) = self.member_parts(id)?;
        self.node(name).key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_units_restore_lone_surrogates() {
        let node = |kind| Node {
            kind,
            span: Span::default(),
        };
        let string = node(NodeKind::String {
            value: "\u{FFFD}a\u{FFFD}".to_string(),
            lone_surrogates: vec![(4, 0xDBFF)],
        });
        assert_eq!(string.key_units(), Some(vec![0xFFFD, 0x61, 0xDBFF]));

        let identifier = node(NodeKind::Identifier {
            name: "😀".to_string(),
        });
        assert_eq!(identifier.key_units(), Some(vec![0xD83D, 0xDE00]));
        assert_eq!(node(NodeKind::Null).key_units(), None);
    }

    #[test]
    fn test_node_type_round_trips_through_str() {
        for t in NodeType::ALL {
            assert_eq!(t.as_str().parse::<NodeType>().unwrap(), t);
        }
        assert!("Comment".parse::<NodeType>().is_err());
    }

    #[test]
    fn test_visitor_keys() {
        assert_eq!(NodeType::Document.visitor_keys(), &["body"]);
        assert_eq!(NodeType::Member.visitor_keys(), &["name", "value"]);
        assert!(NodeType::Number.visitor_keys().is_empty());
    }

    #[test]
    fn test_span_contains() {
        let outer = Span::new(Position::new(1, 1, 0), Position::new(1, 10, 9));
        let inner = Span::new(Position::new(1, 2, 1), Position::new(1, 4, 3));
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert_eq!(outer.range(), 0..9);
    }
}
