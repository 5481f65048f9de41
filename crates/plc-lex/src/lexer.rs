//! Character stream → token stream.

use plc_util::{Offset, ParseError};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};

const TWO_CHAR_OPERATORS: &[&str] = &["<=", ">=", "==", "!=", "&&", "||"];

/// Tokenizes a source string in a single forward pass.
///
/// Every token shape the lexer recognizes is a literal character or a
/// short fixed alternation, so lookahead stays to small, fixed
/// character-class checks ([`Cursor::peek`], [`Cursor::advance_if`])
/// rather than a general regex engine.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { cursor: Cursor::new(source) }
    }

    /// Tokenizes the entire input, failing on the first illegal token.
    ///
    /// Never returns a partial token list alongside an error: on
    /// failure the `Vec` built so far is dropped.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token()? {
            tokens.push(token);
        }
        log::trace!("lexed {} tokens", tokens.len());
        tokens.shrink_to_fit();
        Ok(tokens)
    }

    /// Returns the next token, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_whitespace();
        if self.cursor.is_at_end() {
            return Ok(None);
        }

        let start = self.cursor.position();
        let c = self.cursor.current();

        let token = if c == '"' {
            self.lex_string(start)?
        } else if c == '\'' {
            self.lex_character(start)?
        } else if is_ident_start(c) {
            self.lex_identifier(start)
        } else if c.is_ascii_digit() {
            self.lex_number(start)?
        } else if (c == '+' || c == '-') && self.cursor.peek(1).is_ascii_digit() {
            self.lex_number(start)?
        } else if c == '.' && self.cursor.peek(1).is_ascii_digit() {
            return Err(ParseError::new("a decimal literal must have a digit before '.'", start));
        } else {
            self.lex_operator(start)
        };

        log::trace!("token {:?} at {}", token.kind, token.start);
        Ok(Some(token))
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.cursor.current(), ' ' | '\u{8}' | '\n' | '\r' | '\t') {
            self.cursor.advance();
        }
    }

    fn lex_identifier(&mut self, start: Offset) -> Token {
        while is_ident_continue(self.cursor.current()) {
            self.cursor.advance();
        }
        Token::new(TokenKind::Identifier, self.cursor.slice_from(start), start)
    }

    /// A sign is consumed only when immediately followed by a digit.
    /// A leading zero may not be followed by another digit. A `.`
    /// fractional part must have at least one digit after the dot —
    /// a trailing, digit-less dot is a lexing error rather than a
    /// token left uncommitted for the next token.
    fn lex_number(&mut self, start: Offset) -> Result<Token, ParseError> {
        if self.cursor.current() == '+' || self.cursor.current() == '-' {
            self.cursor.advance();
        }

        let digits_start = self.cursor.position();
        if self.cursor.current() == '0' && self.cursor.peek(1).is_ascii_digit() {
            return Err(ParseError::new("leading zero may not be followed by another digit", start));
        }
        while self.cursor.current().is_ascii_digit() {
            self.cursor.advance();
        }
        if self.cursor.position() == digits_start {
            return Err(ParseError::new("expected a digit", self.cursor.position()));
        }

        let mut kind = TokenKind::Integer;
        if self.cursor.current() == '.' {
            if !self.cursor.peek(1).is_ascii_digit() {
                return Err(ParseError::new(
                    "a decimal literal's fractional part needs at least one digit",
                    self.cursor.position(),
                ));
            }
            kind = TokenKind::Decimal;
            self.cursor.advance();
            while self.cursor.current().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        Ok(Token::new(kind, self.cursor.slice_from(start), start))
    }

    /// A single permitted character or a single escape, between
    /// quotes.
    fn lex_character(&mut self, start: Offset) -> Result<Token, ParseError> {
        self.cursor.advance(); // opening quote

        if self.cursor.current() == '\'' {
            return Err(ParseError::new("empty character literal", self.cursor.position()));
        }
        self.consume_char_or_escape()?;

        if self.cursor.current() != '\'' {
            return Err(ParseError::new(
                "character literal must contain exactly one character",
                self.cursor.position(),
            ));
        }
        self.cursor.advance(); // closing quote

        Ok(Token::new(TokenKind::Character, self.cursor.slice_from(start), start))
    }

    /// Zero or more permitted characters or escapes, between quotes.
    /// An unterminated string fails at the offset just past the last
    /// character consumed.
    fn lex_string(&mut self, start: Offset) -> Result<Token, ParseError> {
        self.cursor.advance(); // opening quote

        loop {
            if self.cursor.is_at_end() {
                return Err(ParseError::new("unterminated string literal", self.cursor.position()));
            }
            if self.cursor.current() == '"' {
                break;
            }
            self.consume_char_or_escape()?;
        }
        self.cursor.advance(); // closing quote

        Ok(Token::new(TokenKind::String, self.cursor.slice_from(start), start))
    }

    /// Consumes one literal character, or one `\x` escape sequence,
    /// from inside a character or string literal.
    fn consume_char_or_escape(&mut self) -> Result<(), ParseError> {
        if self.cursor.is_at_end() {
            return Err(ParseError::new("unterminated literal", self.cursor.position()));
        }
        if self.cursor.current() == '\\' {
            let escape_start = self.cursor.position();
            self.cursor.advance();
            let escapee = self.cursor.current();
            if !matches!(escapee, 'b' | 'n' | 'r' | 't' | '\'' | '"' | '\\') {
                return Err(ParseError::new(
                    format!("illegal escape sequence '\\{escapee}'"),
                    escape_start,
                ));
            }
            self.cursor.advance();
        } else {
            self.cursor.advance();
        }
        Ok(())
    }

    fn lex_operator(&mut self, start: Offset) -> Token {
        let two: String = [self.cursor.peek(0), self.cursor.peek(1)].iter().collect();
        if TWO_CHAR_OPERATORS.contains(&two.as_str()) {
            self.cursor.advance();
            self.cursor.advance();
        } else {
            self.cursor.advance();
        }
        Token::new(TokenKind::Operator, self.cursor.slice_from(start), start)
    }
}

/// Decodes the escape sequences in a character/string literal's body
/// (the text between the quotes) into their single-character meanings.
///
/// Called by the Parser when it converts a Character/String token into
/// an AST literal.
pub fn decode_escapes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('b') => out.push('\u{8}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn literals(source: &str) -> Vec<String> {
        Lexer::tokenize(source).unwrap().into_iter().map(|t| t.literal).collect()
    }

    #[test]
    fn skips_whitespace_between_tokens() {
        assert_eq!(literals("  x   y "), vec!["x", "y"]);
    }

    #[test]
    fn leading_zero_alone_is_fine() {
        assert_eq!(literals("0"), vec!["0"]);
    }

    #[test]
    fn signed_zero_is_fine() {
        assert_eq!(literals("+0"), vec!["+0"]);
        assert_eq!(literals("-0"), vec!["-0"]);
    }

    #[test]
    fn octal_style_leading_zero_fails() {
        assert!(Lexer::tokenize("01").is_err());
    }

    #[test]
    fn decimal_requires_digit_after_dot() {
        assert_eq!(kinds("1.5"), vec![TokenKind::Decimal]);
        // "1." with nothing after the dot is a lexing error, not an
        // Integer followed by a separate "." token.
        assert!(Lexer::tokenize("1.").is_err());
    }

    #[test]
    fn bare_leading_dot_fails() {
        // ".5" is not two tokens (an Operator "." then an Integer
        // "5"): a dot immediately followed by a digit is only legal
        // as a decimal literal's fractional part.
        assert!(Lexer::tokenize(".5").is_err());
    }

    #[test]
    fn sign_only_binds_to_an_immediately_following_digit() {
        assert_eq!(kinds("a - b"), vec![
            TokenKind::Identifier,
            TokenKind::Operator,
            TokenKind::Identifier
        ]);
        assert_eq!(kinds("-5"), vec![TokenKind::Integer]);
    }

    #[test]
    fn two_char_operators_are_preferred_over_one() {
        assert_eq!(literals("<= >= == != && ||"), vec!["<=", ">=", "==", "!=", "&&", "||"]);
    }

    #[test]
    fn single_char_fallback_covers_punctuation() {
        assert_eq!(literals("(a, b);"), vec!["(", "a", ",", "b", ")", ";"]);
    }

    #[test]
    fn empty_character_literal_fails() {
        assert!(Lexer::tokenize("''").is_err());
    }

    #[test]
    fn multi_char_literal_fails() {
        assert!(Lexer::tokenize("'ab'").is_err());
    }

    #[test]
    fn character_escape_is_accepted() {
        assert_eq!(literals(r"'\n'"), vec![r"'\n'"]);
    }

    #[test]
    fn illegal_escape_fails() {
        assert!(Lexer::tokenize(r"'\q'").is_err());
    }

    #[test]
    fn unterminated_string_fails_at_end_of_input() {
        let err = Lexer::tokenize("\"abc").unwrap_err();
        assert_eq!(err.offset, 4);
    }

    #[test]
    fn string_with_escapes_lexes_as_one_token() {
        assert_eq!(literals(r#""a\nb""#), vec![r#""a\nb""#]);
    }

    #[test]
    fn identifiers_may_contain_hyphens_and_underscores() {
        assert_eq!(literals("my-var _x2"), vec!["my-var", "_x2"]);
    }

    #[test]
    fn decode_escapes_maps_every_permitted_sequence() {
        assert_eq!(decode_escapes(r"a\nb\tc\\d\'e\"f"), "a\nb\tc\\d'e\"f");
    }
}
