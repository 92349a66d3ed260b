use crate::LanguageMode;
use crate::ast::{Position, Sign, Span};
use crate::error::{LexerError, ParseResult};
use serde::{Deserialize, Serialize};

/// Token types shared by all three dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Open brace {
    LBrace,
    /// Close brace }
    RBrace,
    /// Open bracket [
    LBracket,
    /// Close bracket ]
    RBracket,
    /// Colon :
    Colon,
    /// Comma ,
    Comma,
    /// String literal, double quoted (or single quoted in JSON5)
    String,
    /// Numeric literal, including JSON5 hex and signed forms
    Number,
    /// `true` or `false`
    Boolean,
    /// `null`
    Null,
    /// Unquoted JSON5 identifier
    Identifier,
    /// JSON5 `Infinity`, optionally signed
    Infinity,
    /// JSON5 `NaN`, optionally signed
    NaN,
    /// `// ...` comment (JSONC and JSON5)
    LineComment,
    /// `/* ... */` comment (JSONC and JSON5)
    BlockComment,
}

impl TokenKind {
    /// Returns the token type name, used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            TokenKind::LBrace => "LBrace",
            TokenKind::RBrace => "RBrace",
            TokenKind::LBracket => "LBracket",
            TokenKind::RBracket => "RBracket",
            TokenKind::Colon => "Colon",
            TokenKind::Comma => "Comma",
            TokenKind::String => "String",
            TokenKind::Number => "Number",
            TokenKind::Boolean => "Boolean",
            TokenKind::Null => "Null",
            TokenKind::Identifier => "Identifier",
            TokenKind::Infinity => "Infinity",
            TokenKind::NaN => "NaN",
            TokenKind::LineComment => "LineComment",
            TokenKind::BlockComment => "BlockComment",
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

/// A token with its position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn is_comment(&self) -> bool {
        self.kind.is_comment()
    }
}

/// Decoded payload of a literal token, handed to the parser alongside it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Literal {
    None,
    Str {
        value: String,
        lone_surrogates: Vec<(usize, u16)>,
    },
    Num(f64),
    Bool(bool),
    Ident(String),
    Signed(Sign),
}

#[derive(Debug, Clone)]
pub(crate) struct Lexeme {
    pub token: Token,
    pub literal: Literal,
}

/// Lexer for tokenizing JSON, JSONC and JSON5 text.
///
/// Comments are only recognized outside strict JSON mode; the JSON5 mode
/// additionally accepts single quoted strings, hex and signed numbers,
/// `Infinity`/`NaN` and unquoted identifiers.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    mode: LanguageMode,
    line: usize,
    column: usize,
    offset: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source text.
    pub fn new(source: &'a str, mode: LanguageMode) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            mode,
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column, self.offset)
    }

    fn advance(&mut self) -> Option<char> {
        let (idx, ch) = self.chars.next()?;
        self.offset = idx + ch.len_utf8();
        match ch {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            // CRLF counts as one break, taken on the LF
            '\r' if self.peek() != Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            _ => self.column += 1,
        }
        Some(ch)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_second(&self) -> Option<char> {
        self.source[self.offset..].chars().nth(1)
    }

    fn is_json5(&self) -> bool {
        self.mode == LanguageMode::Json5
    }

    fn is_whitespace(&self, ch: char) -> bool {
        match ch {
            ' ' | '\t' | '\n' | '\r' => true,
            '\u{000B}' | '\u{000C}' | '\u{00A0}' | '\u{2028}' | '\u{2029}' | '\u{FEFF}' => {
                self.is_json5()
            }
            _ => self.is_json5() && ch.is_whitespace() && ch != '\u{0085}',
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !self.is_whitespace(ch) {
                break;
            }
            self.advance();
        }
    }

    /// Tokenize the entire input, comments included.
    pub fn tokenize(&mut self) -> ParseResult<Vec<Token>> {
        Ok(self
            .lex_all()?
            .into_iter()
            .map(|lexeme| lexeme.token)
            .collect())
    }

    pub(crate) fn lex_all(&mut self) -> ParseResult<Vec<Lexeme>> {
        let mut lexemes = Vec::new();
        while let Some(lexeme) = self.next_lexeme()? {
            lexemes.push(lexeme);
        }
        Ok(lexemes)
    }

    fn next_lexeme(&mut self) -> ParseResult<Option<Lexeme>> {
        self.skip_whitespace();

        let start = self.position();
        let Some(ch) = self.peek() else {
            return Ok(None);
        };

        let (kind, literal) = match ch {
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            ':' => self.single(TokenKind::Colon),
            ',' => self.single(TokenKind::Comma),
            '/' if self.mode != LanguageMode::Json => self.read_comment(start)?,
            '"' => self.read_string(start)?,
            '\'' if self.is_json5() => self.read_string(start)?,
            '-' | '0'..='9' => self.read_number(start)?,
            '+' | '.' if self.is_json5() => self.read_number(start)?,
            _ if self.is_word_start(ch) => self.read_word(start)?,
            _ => return Err(LexerError::UnexpectedChar { ch, position: start }.into()),
        };

        Ok(Some(Lexeme {
            token: Token {
                kind,
                span: Span::new(start, self.position()),
            },
            literal,
        }))
    }

    fn single(&mut self, kind: TokenKind) -> (TokenKind, Literal) {
        self.advance();
        (kind, Literal::None)
    }

    fn read_comment(&mut self, start: Position) -> ParseResult<(TokenKind, Literal)> {
        self.advance(); // consume '/'
        match self.peek() {
            Some('/') => {
                while let Some(ch) = self.peek() {
                    if ch == '\n' || ch == '\r' {
                        break;
                    }
                    self.advance();
                }
                Ok((TokenKind::LineComment, Literal::None))
            }
            Some('*') => {
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            return Ok((TokenKind::BlockComment, Literal::None));
                        }
                        Some(_) => {}
                        None => {
                            return Err(LexerError::UnterminatedComment { position: start }.into());
                        }
                    }
                }
            }
            _ => Err(LexerError::UnexpectedChar {
                ch: '/',
                position: start,
            }
            .into()),
        }
    }

    fn read_string(&mut self, start: Position) -> ParseResult<(TokenKind, Literal)> {
        let quote = self.advance().unwrap_or('"');
        let mut value = String::new();
        let mut lone_surrogates = Vec::new();
        // A high surrogate escape waiting for its low half
        let mut pending_high: Option<u16> = None;

        loop {
            let pos = self.position();
            let Some(ch) = self.advance() else {
                return Err(LexerError::UnterminatedString { position: start }.into());
            };

            if ch == '\\' {
                let Some(esc) = self.peek() else {
                    return Err(LexerError::UnterminatedString { position: start }.into());
                };
                if esc == 'u' {
                    self.advance();
                    let unit = self.read_hex_digits(4)? as u16;
                    match (pending_high.take(), unit) {
                        (Some(high), 0xDC00..=0xDFFF) => {
                            let code = 0x10000
                                + ((u32::from(high) - 0xD800) << 10)
                                + (u32::from(unit) - 0xDC00);
                            value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                        }
                        (previous, _) => {
                            if let Some(high) = previous {
                                lone_surrogates.push((value.len(), high));
                                value.push('\u{FFFD}');
                            }
                            match unit {
                                0xD800..=0xDBFF => pending_high = Some(unit),
                                0xDC00..=0xDFFF => {
                                    lone_surrogates.push((value.len(), unit));
                                    value.push('\u{FFFD}');
                                }
                                _ => value.push(char::from_u32(u32::from(unit)).unwrap_or('\u{FFFD}')),
                            }
                        }
                    }
                    continue;
                }
                flush_high_surrogate(&mut pending_high, &mut value, &mut lone_surrogates);
                self.read_escape(&mut value, pos)?;
                continue;
            }

            flush_high_surrogate(&mut pending_high, &mut value, &mut lone_surrogates);

            if ch == quote {
                break;
            }
            if ch == '\n' || ch == '\r' || (!self.is_json5() && u32::from(ch) < 0x20) {
                return Err(LexerError::UnexpectedChar { ch, position: pos }.into());
            }
            value.push(ch);
        }

        Ok((
            TokenKind::String,
            Literal::Str {
                value,
                lone_surrogates,
            },
        ))
    }

    /// Decode one escape sequence after the backslash (other than `\u`).
    fn read_escape(&mut self, value: &mut String, backslash: Position) -> ParseResult<()> {
        let Some(esc) = self.advance() else {
            return Err(LexerError::UnexpectedEof {
                position: self.position(),
            }
            .into());
        };
        match esc {
            '"' => value.push('"'),
            '\\' => value.push('\\'),
            '/' => value.push('/'),
            'b' => value.push('\u{0008}'),
            'f' => value.push('\u{000C}'),
            'n' => value.push('\n'),
            'r' => value.push('\r'),
            't' => value.push('\t'),
            _ if !self.is_json5() => {
                return Err(LexerError::InvalidEscape {
                    ch: esc,
                    position: backslash,
                }
                .into());
            }
            '\'' => value.push('\''),
            'v' => value.push('\u{000B}'),
            '0' if !self.peek().is_some_and(|c| c.is_ascii_digit()) => value.push('\0'),
            'x' => {
                let code = self.read_hex_digits(2)?;
                value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            // Line continuation
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '\r' => {
                if self.peek() == Some('\n') {
                    self.advance();
                }
            }
            '1'..='9' | '0' => {
                return Err(LexerError::InvalidEscape {
                    ch: esc,
                    position: backslash,
                }
                .into());
            }
            other => value.push(other),
        }
        Ok(())
    }

    fn read_hex_digits(&mut self, count: usize) -> ParseResult<u32> {
        let mut code = 0u32;
        for _ in 0..count {
            let pos = self.position();
            match self.advance() {
                Some(ch) if ch.is_ascii_hexdigit() => {
                    code = code * 16 + ch.to_digit(16).unwrap_or(0);
                }
                Some(ch) => return Err(LexerError::UnexpectedChar { ch, position: pos }.into()),
                None => return Err(LexerError::UnexpectedEof { position: pos }.into()),
            }
        }
        Ok(code)
    }

    fn read_number(&mut self, start: Position) -> ParseResult<(TokenKind, Literal)> {
        let begin = self.offset;

        if matches!(self.peek(), Some('+') | Some('-')) {
            let sign = if self.advance() == Some('-') {
                Sign::Minus
            } else {
                Sign::Plus
            };
            if self.is_json5() && matches!(self.peek(), Some('I') | Some('N')) {
                let word_start = self.position();
                let word = self.read_word_text();
                return match word.as_str() {
                    "Infinity" => Ok((TokenKind::Infinity, Literal::Signed(sign))),
                    "NaN" => Ok((TokenKind::NaN, Literal::Signed(sign))),
                    _ => Err(LexerError::UnexpectedChar {
                        ch: word.chars().next().unwrap_or('I'),
                        position: word_start,
                    }
                    .into()),
                };
            }
        }

        if self.is_json5()
            && self.peek() == Some('0')
            && matches!(self.peek_second(), Some('x') | Some('X'))
        {
            self.advance();
            self.advance();
            let mut value = 0f64;
            let mut digits = 0;
            while let Some(ch) = self.peek() {
                let Some(digit) = ch.to_digit(16) else {
                    break;
                };
                value = value * 16.0 + f64::from(digit);
                digits += 1;
                self.advance();
            }
            if digits == 0 {
                return Err(self.unexpected_here());
            }
            if self.source[begin..].starts_with('-') {
                value = -value;
            }
            return Ok((TokenKind::Number, Literal::Num(value)));
        }

        // Integer part
        let mut int_digits = 0;
        match self.peek() {
            Some('0') => {
                self.advance();
                int_digits = 1;
            }
            Some('1'..='9') => {
                int_digits = self.skip_digits();
            }
            Some('.') if self.is_json5() => {}
            _ => return Err(self.unexpected_here()),
        }

        // Fraction
        if self.peek() == Some('.') {
            self.advance();
            let frac_digits = self.skip_digits();
            if frac_digits == 0 && (!self.is_json5() || int_digits == 0) {
                return Err(self.unexpected_here());
            }
        }

        // Exponent
        if matches!(self.peek(), Some('e') | Some('E')) {
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            if self.skip_digits() == 0 {
                return Err(self.unexpected_here());
            }
        }

        if let Some(ch) = self.peek()
            && (ch.is_ascii_digit() || self.is_word_start(ch))
        {
            return Err(self.unexpected_here());
        }

        let text = &self.source[begin..self.offset];
        let value = text
            .trim_start_matches('+')
            .parse::<f64>()
            .map_err(|_| LexerError::UnexpectedChar {
                ch: text.chars().next().unwrap_or('0'),
                position: start,
            })?;
        Ok((TokenKind::Number, Literal::Num(value)))
    }

    fn skip_digits(&mut self) -> usize {
        let mut count = 0;
        while let Some(ch) = self.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            self.advance();
            count += 1;
        }
        count
    }

    fn unexpected_here(&mut self) -> crate::error::ParseError {
        let position = self.position();
        match self.peek() {
            Some(ch) => LexerError::UnexpectedChar { ch, position }.into(),
            None => LexerError::UnexpectedEof { position }.into(),
        }
    }

    fn is_word_start(&self, ch: char) -> bool {
        if self.is_json5() {
            ch == '$' || ch == '_' || unicode_ident::is_xid_start(ch)
        } else {
            ch.is_ascii_alphabetic()
        }
    }

    fn is_word_continue(&self, ch: char) -> bool {
        if self.is_json5() {
            ch == '$'
                || ch == '\u{200C}'
                || ch == '\u{200D}'
                || unicode_ident::is_xid_continue(ch)
        } else {
            ch.is_ascii_alphanumeric() || ch == '_'
        }
    }

    fn read_word_text(&mut self) -> String {
        let mut word = String::new();
        while let Some(ch) = self.peek() {
            if word.is_empty() && !self.is_word_start(ch) {
                break;
            }
            if !word.is_empty() && !self.is_word_continue(ch) {
                break;
            }
            word.push(ch);
            self.advance();
        }
        word
    }

    fn read_word(&mut self, start: Position) -> ParseResult<(TokenKind, Literal)> {
        let word = self.read_word_text();
        let token = match word.as_str() {
            "true" => (TokenKind::Boolean, Literal::Bool(true)),
            "false" => (TokenKind::Boolean, Literal::Bool(false)),
            "null" => (TokenKind::Null, Literal::None),
            "Infinity" if self.is_json5() => (TokenKind::Infinity, Literal::Signed(Sign::Unsigned)),
            "NaN" if self.is_json5() => (TokenKind::NaN, Literal::Signed(Sign::Unsigned)),
            _ if self.is_json5() => (TokenKind::Identifier, Literal::Ident(word)),
            _ => {
                return Err(LexerError::UnexpectedChar {
                    ch: word.chars().next().unwrap_or(' '),
                    position: start,
                }
                .into());
            }
        };
        Ok(token)
    }
}

fn flush_high_surrogate(
    pending_high: &mut Option<u16>,
    value: &mut String,
    lone_surrogates: &mut Vec<(usize, u16)>,
) {
    if let Some(high) = pending_high.take() {
        lone_surrogates.push((value.len(), high));
        value.push('\u{FFFD}');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str, mode: LanguageMode) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source, mode);
        lexer
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn literal(source: &str, mode: LanguageMode) -> Literal {
        let mut lexer = Lexer::new(source, mode);
        lexer.lex_all().unwrap().remove(0).literal
    }

    #[test]
    fn test_punctuators() {
        assert_eq!(
            kinds(r#"{"a": [1, true, null]}"#, LanguageMode::Json),
            vec![
                TokenKind::LBrace,
                TokenKind::String,
                TokenKind::Colon,
                TokenKind::LBracket,
                TokenKind::Number,
                TokenKind::Comma,
                TokenKind::Boolean,
                TokenKind::Comma,
                TokenKind::Null,
                TokenKind::RBracket,
                TokenKind::RBrace,
            ]
        );
    }

    #[test]
    fn test_comments_rejected_in_json() {
        let mut lexer = Lexer::new("// hi\n1", LanguageMode::Json);
        let err = lexer.tokenize().unwrap_err();
        assert_eq!(err.message(), "Unexpected character '/' found.");
        assert_eq!(err.position().line, 1);
        assert_eq!(err.position().column, 1);
    }

    #[test]
    fn test_comments_in_jsonc() {
        assert_eq!(
            kinds("// a\n/* b\n c */ 1", LanguageMode::Jsonc),
            vec![
                TokenKind::LineComment,
                TokenKind::BlockComment,
                TokenKind::Number
            ]
        );
    }

    #[test]
    fn test_line_comment_stops_before_crlf() {
        let mut lexer = Lexer::new("// a\r\n1", LanguageMode::Jsonc);
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[0].span.range(), 0..4);
        assert_eq!(tokens[1].span.start, Position::new(2, 1, 6));
    }

    #[test]
    fn test_lone_cr_is_line_break() {
        let mut lexer = Lexer::new("1\r 2", LanguageMode::Json5);
        let tokens = lexer.tokenize();
        // Two values are a lexing success; the parser rejects them later
        let tokens = tokens.unwrap();
        assert_eq!(tokens[1].span.start, Position::new(2, 2, 3));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            literal(r#""a\nA\/""#, LanguageMode::Json),
            Literal::Str {
                value: "a\nA/".to_string(),
                lone_surrogates: Vec::new()
            }
        );
    }

    #[test]
    fn test_surrogate_pair_and_lone_surrogate() {
        assert_eq!(
            literal(r#""😀""#, LanguageMode::Json),
            Literal::Str {
                value: "😀".to_string(),
                lone_surrogates: Vec::new()
            }
        );
        assert_eq!(
            literal(r#""a\uD800b""#, LanguageMode::Json),
            Literal::Str {
                value: "a\u{FFFD}b".to_string(),
                lone_surrogates: vec![(1, 0xD800)]
            }
        );
        assert_eq!(
            literal(r#""\uDC00""#, LanguageMode::Json),
            Literal::Str {
                value: "\u{FFFD}".to_string(),
                lone_surrogates: vec![(0, 0xDC00)]
            }
        );
    }

    #[test]
    fn test_json5_only_escapes() {
        let mut lexer = Lexer::new(r#""\x41""#, LanguageMode::Json);
        assert!(lexer.tokenize().is_err());
        assert_eq!(
            literal(r#"'\x41\'\v'"#, LanguageMode::Json5),
            Literal::Str {
                value: "A'\u{000B}".to_string(),
                lone_surrogates: Vec::new()
            }
        );
    }

    #[test]
    fn test_raw_control_character_rejected_in_json() {
        let mut lexer = Lexer::new("\"a\tb\"", LanguageMode::Json);
        assert!(lexer.tokenize().is_err());
    }

    #[test]
    fn test_numbers() {
        assert_eq!(literal("-1.5e2", LanguageMode::Json), Literal::Num(-150.0));
        assert_eq!(literal("0x1F", LanguageMode::Json5), Literal::Num(31.0));
        assert_eq!(literal("-0x10", LanguageMode::Json5), Literal::Num(-16.0));
        assert_eq!(literal(".5", LanguageMode::Json5), Literal::Num(0.5));
        assert_eq!(literal("5.", LanguageMode::Json5), Literal::Num(5.0));
        assert_eq!(literal("+3", LanguageMode::Json5), Literal::Num(3.0));
    }

    #[test]
    fn test_invalid_numbers_in_json() {
        for source in ["01", "1.", ".5", "+1", "-", "1e", "0x1"] {
            let mut lexer = Lexer::new(source, LanguageMode::Json);
            assert!(lexer.tokenize().is_err(), "{source} should be rejected");
        }
    }

    #[test]
    fn test_json5_special_numbers() {
        assert_eq!(
            kinds("[Infinity, -Infinity, +NaN]", LanguageMode::Json5),
            vec![
                TokenKind::LBracket,
                TokenKind::Infinity,
                TokenKind::Comma,
                TokenKind::Infinity,
                TokenKind::Comma,
                TokenKind::NaN,
                TokenKind::RBracket,
            ]
        );
        assert_eq!(
            literal("-Infinity", LanguageMode::Json5),
            Literal::Signed(Sign::Minus)
        );
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            literal("$foo_bar", LanguageMode::Json5),
            Literal::Ident("$foo_bar".to_string())
        );
        let mut lexer = Lexer::new("foo", LanguageMode::Json);
        assert!(lexer.tokenize().is_err());
    }

    #[test]
    fn test_columns_count_characters() {
        let mut lexer = Lexer::new("\"é\" 1", LanguageMode::Json5);
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[1].span.start, Position::new(1, 5, 5));
    }
}
