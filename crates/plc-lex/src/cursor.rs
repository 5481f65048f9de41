//! Character cursor for traversing source text.
//!
//! The cursor is the single source of position truth for the Lexer: it
//! tracks the current byte offset and hands out lookahead characters
//! without consuming them, so `Lexer::peek`/`Lexer::match_next` can be
//! thin wrappers around it.

/// A cursor over a source string, tracking a byte position.
///
/// Every token's start offset must be a byte position into the
/// original input, so the cursor is byte-indexed throughout rather
/// than char-indexed; lookahead still decodes full `char`s so
/// multi-byte UTF-8 is never split.
pub struct Cursor<'a> {
    source: &'a str,
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    /// The character at the cursor, or `'\0'` past the end of input.
    pub fn current(&self) -> char {
        self.peek(0)
    }

    /// The character `offset` positions ahead of the cursor (0 = current),
    /// or `'\0'` past the end of input.
    pub fn peek(&self, offset: usize) -> char {
        self.source[self.position..].chars().nth(offset).unwrap_or('\0')
    }

    /// Advances past the current character, returning it.
    pub fn advance(&mut self) -> char {
        let c = self.current();
        if !self.is_at_end() {
            self.position += c.len_utf8();
        }
        c
    }

    /// Advances past the current character only if it equals `expected`.
    pub fn advance_if(&mut self, expected: char) -> bool {
        if self.current() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// The exact substring `source[start..self.position)`.
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.position]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_walks_forward_one_char_at_a_time() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.advance(), 'a');
        assert_eq!(cursor.advance(), 'b');
        assert!(cursor.is_at_end());
    }

    #[test]
    fn peek_does_not_consume() {
        let cursor = Cursor::new("xy");
        assert_eq!(cursor.peek(0), 'x');
        assert_eq!(cursor.peek(1), 'y');
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn multi_byte_chars_advance_by_their_byte_length() {
        let mut cursor = Cursor::new("é1");
        cursor.advance();
        assert_eq!(cursor.position(), 'é'.len_utf8());
        assert_eq!(cursor.current(), '1');
    }
}
