//! JSON, JSONC and JSON5 parser
//!
//! This crate turns document text into an immutable arena tree together with
//! the complete token stream, comments included, so that lint rules can look
//! at both the structure and the exact source layout.
//!
//! # Quick Start
//!
//! ```
//! use json_lint_parser::{LanguageMode, ParseOptions, parse};
//!
//! let doc = parse("{\"a\": [1, 2] // note\n}", &ParseOptions::new(LanguageMode::Jsonc)).unwrap();
//!
//! for (id, node) in doc.nodes() {
//!     println!("{:?} {} at line {}", id, node.node_type(), node.span.start.line);
//! }
//! assert!(doc.tokens().iter().any(|t| t.is_comment()));
//! ```
//!
//! # Modules
//!
//! - [`ast`] — Tree types: [`ast::Document`], [`ast::Node`], [`ast::NodeKind`],
//!   [`ast::NodeType`], [`ast::Span`], [`ast::Position`]
//! - [`error`] — Error types: [`error::ParseError`], [`error::LexerError`]
//! - [`lexer`] — Tokenizer: [`lexer::Lexer`], [`lexer::Token`], [`lexer::TokenKind`]
//!
//! # Dialects
//!
//! | Mode | Comments | Trailing commas | JSON5 literals |
//! |------|----------|-----------------|----------------|
//! | `json` | no | no | no |
//! | `jsonc` | yes | with `allow_trailing_commas` | no |
//! | `json5` | yes | yes | yes |

pub mod ast;
pub mod error;
pub mod lexer;

use ast::{Document, Node, NodeId, NodeKind, Position, Span};
use error::{ParseError, ParseResult};
use lexer::{Lexeme, Lexer, Literal, TokenKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The accepted document dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageMode {
    #[default]
    Json,
    Jsonc,
    Json5,
}

impl LanguageMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageMode::Json => "json",
            LanguageMode::Jsonc => "jsonc",
            LanguageMode::Json5 => "json5",
        }
    }
}

impl fmt::Display for LanguageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(LanguageMode::Json),
            "jsonc" => Ok(LanguageMode::Jsonc),
            "json5" => Ok(LanguageMode::Json5),
            other => Err(format!(
                "Unknown language mode '{}'. Expected one of: json, jsonc, json5",
                other
            )),
        }
    }
}

/// Options accepted by [`parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub mode: LanguageMode,
    /// Accept a trailing comma in objects and arrays. Only meaningful for
    /// `jsonc`; JSON5 always allows them and strict JSON never does.
    pub allow_trailing_commas: bool,
}

impl ParseOptions {
    pub fn new(mode: LanguageMode) -> Self {
        Self {
            mode,
            allow_trailing_commas: false,
        }
    }

    pub fn with_trailing_commas(mut self, allow: bool) -> Self {
        self.allow_trailing_commas = allow;
        self
    }

    fn trailing_commas(&self) -> bool {
        match self.mode {
            LanguageMode::Json => false,
            LanguageMode::Jsonc => self.allow_trailing_commas,
            LanguageMode::Json5 => true,
        }
    }
}

/// Parse document text into a [`Document`].
pub fn parse(source: &str, options: &ParseOptions) -> ParseResult<Document> {
    let mut lexer = Lexer::new(source, options.mode);
    let lexemes = lexer.lex_all()?;
    let end = end_position(source);
    let mut parser = Parser::new(lexemes, *options, end);
    parser.parse()
}

fn end_position(source: &str) -> Position {
    let mut line = 1;
    let mut column = 1;
    let mut chars = source.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\n' => {
                line += 1;
                column = 1;
            }
            '\r' if chars.peek() != Some(&'\n') => {
                line += 1;
                column = 1;
            }
            _ => column += 1,
        }
    }
    Position::new(line, column, source.len())
}

/// Deepest object/array nesting accepted by [`parse`].
pub const MAX_NESTING_DEPTH: usize = 256;

/// Recursive descent parser over the lexeme stream.
struct Parser {
    lexemes: Vec<Lexeme>,
    /// Indices of non-comment lexemes
    significant: Vec<usize>,
    pos: usize,
    options: ParseOptions,
    nodes: Vec<Node>,
    end: Position,
    depth: usize,
}

impl Parser {
    fn new(lexemes: Vec<Lexeme>, options: ParseOptions, end: Position) -> Self {
        let significant = lexemes
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.token.is_comment())
            .map(|(i, _)| i)
            .collect();
        Self {
            lexemes,
            significant,
            pos: 0,
            options,
            nodes: Vec::new(),
            end,
            depth: 0,
        }
    }

    fn current(&self) -> Option<&Lexeme> {
        self.significant.get(self.pos).map(|&i| &self.lexemes[i])
    }

    fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|l| l.token.kind)
    }

    fn advance(&mut self) -> ParseResult<Lexeme> {
        let lexeme = self.current().cloned().ok_or(ParseError::UnexpectedEof {
            position: self.end,
        })?;
        self.pos += 1;
        Ok(lexeme)
    }

    fn unexpected(&self) -> ParseError {
        match self.current() {
            Some(lexeme) => ParseError::UnexpectedToken {
                found: lexeme.token.kind.display_name().to_string(),
                position: lexeme.token.span.start,
            },
            None => ParseError::UnexpectedEof { position: self.end },
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Lexeme> {
        if self.current_kind() == Some(kind) {
            self.advance()
        } else {
            Err(self.unexpected())
        }
    }

    fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Node { kind, span });
        id
    }

    fn enter_container(&mut self, open: &Lexeme) -> ParseResult<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::MaxDepthExceeded {
                limit: MAX_NESTING_DEPTH,
                position: open.token.span.start,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn span_of(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    fn parse(&mut self) -> ParseResult<Document> {
        let body = self.parse_value()?;
        if self.current().is_some() {
            return Err(self.unexpected());
        }
        let start = Position::new(1, 1, 0);
        let root = self.push(NodeKind::Document { body }, Span::new(start, self.end));
        let tokens = self.lexemes.iter().map(|l| l.token).collect();
        Ok(Document {
            nodes: std::mem::take(&mut self.nodes),
            root,
            tokens,
        })
    }

    fn parse_value(&mut self) -> ParseResult<NodeId> {
        let Some(kind) = self.current_kind() else {
            return Err(self.unexpected());
        };
        match kind {
            TokenKind::LBrace => self.parse_object(),
            TokenKind::LBracket => self.parse_array(),
            TokenKind::String
            | TokenKind::Number
            | TokenKind::Boolean
            | TokenKind::Null
            | TokenKind::Infinity
            | TokenKind::NaN => {
                let lexeme = self.advance()?;
                let node = match lexeme.literal {
                    Literal::Str {
                        value,
                        lone_surrogates,
                    } => NodeKind::String {
                        value,
                        lone_surrogates,
                    },
                    Literal::Num(value) => NodeKind::Number { value },
                    Literal::Bool(value) => NodeKind::Boolean { value },
                    Literal::Signed(sign) if kind == TokenKind::Infinity => {
                        NodeKind::Infinity { sign }
                    }
                    Literal::Signed(sign) => NodeKind::NaN { sign },
                    _ => NodeKind::Null,
                };
                Ok(self.push(node, lexeme.token.span))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_object(&mut self) -> ParseResult<NodeId> {
        let open = self.expect(TokenKind::LBrace)?;
        self.enter_container(&open)?;
        let mut members = Vec::new();

        while self.current_kind() != Some(TokenKind::RBrace) {
            members.push(self.parse_member()?);
            match self.current_kind() {
                Some(TokenKind::Comma) => {
                    self.advance()?;
                    if self.current_kind() == Some(TokenKind::RBrace)
                        && !self.options.trailing_commas()
                    {
                        return Err(self.unexpected());
                    }
                }
                Some(TokenKind::RBrace) => break,
                _ => return Err(self.unexpected()),
            }
        }

        let close = self.expect(TokenKind::RBrace)?;
        self.depth -= 1;
        Ok(self.push(
            NodeKind::Object { members },
            Span::new(open.token.span.start, close.token.span.end),
        ))
    }

    fn parse_member(&mut self) -> ParseResult<NodeId> {
        let name = self.parse_member_name()?;
        self.expect(TokenKind::Colon)?;
        let value = self.parse_value()?;
        let span = Span::new(self.span_of(name).start, self.span_of(value).end);
        Ok(self.push(NodeKind::Member { name, value }, span))
    }

    fn parse_member_name(&mut self) -> ParseResult<NodeId> {
        let json5 = self.options.mode == LanguageMode::Json5;
        match self.current_kind() {
            Some(TokenKind::String) => self.parse_value(),
            Some(
                TokenKind::Identifier
                | TokenKind::Boolean
                | TokenKind::Null
                | TokenKind::Infinity
                | TokenKind::NaN,
            ) if json5 => {
                let lexeme = self.advance()?;
                // A signed literal is not an IdentifierName
                if matches!(lexeme.literal, Literal::Signed(s) if s != ast::Sign::Unsigned) {
                    self.pos -= 1;
                    return Err(self.unexpected());
                }
                let name = match lexeme.literal {
                    Literal::Ident(name) => name,
                    Literal::Bool(value) => value.to_string(),
                    Literal::Signed(_) if lexeme.token.kind == TokenKind::Infinity => {
                        "Infinity".to_string()
                    }
                    Literal::Signed(_) => "NaN".to_string(),
                    _ => "null".to_string(),
                };
                Ok(self.push(NodeKind::Identifier { name }, lexeme.token.span))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_array(&mut self) -> ParseResult<NodeId> {
        let open = self.expect(TokenKind::LBracket)?;
        self.enter_container(&open)?;
        let mut elements = Vec::new();

        while self.current_kind() != Some(TokenKind::RBracket) {
            elements.push(self.parse_value()?);
            match self.current_kind() {
                Some(TokenKind::Comma) => {
                    self.advance()?;
                    if self.current_kind() == Some(TokenKind::RBracket)
                        && !self.options.trailing_commas()
                    {
                        return Err(self.unexpected());
                    }
                }
                Some(TokenKind::RBracket) => break,
                _ => return Err(self.unexpected()),
            }
        }

        let close = self.expect(TokenKind::RBracket)?;
        self.depth -= 1;
        Ok(self.push(
            NodeKind::Array { elements },
            Span::new(open.token.span.start, close.token.span.end),
        ))
    }
}
