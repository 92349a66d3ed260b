//! Offset to line/column conversion.
//!
//! [`LineIndex`] records where each line starts so that byte offsets can be
//! mapped to 1-based line/column pairs (and back) with a binary search. LF,
//! CR and CRLF all terminate a line; CRLF counts as a single break.

use json_lint_parser::ast::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the first character of each line
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i + 1),
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    line_starts.push(i + 2);
                    i += 1;
                }
                b'\r' => line_starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset where `line` (1-based) starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1).and_then(|i| self.line_starts.get(i).copied())
    }

    /// Convert a byte offset into a position. Offsets past the end clamp to the end.
    pub fn position_at(&self, text: &str, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let start = self.line_starts[line_idx];
        let column = text
            .get(start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(offset - start);
        Position::new(line_idx + 1, column + 1, offset)
    }

    /// Convert a 1-based line and column into a byte offset.
    ///
    /// Returns `None` when the line does not exist or the column runs past the
    /// end of that line.
    pub fn offset_at(&self, text: &str, line: usize, column: usize) -> Option<usize> {
        let start = self.line_start(line)?;
        let end = self.line_start(line + 1).unwrap_or(self.len);
        let column = column.checked_sub(1)?;
        let line_text = text.get(start..end)?;
        if column == 0 {
            return Some(start);
        }
        match line_text.char_indices().nth(column) {
            Some((idx, _)) => Some(start + idx),
            None if line_text.chars().count() == column => Some(end),
            None => None,
        }
    }
}
