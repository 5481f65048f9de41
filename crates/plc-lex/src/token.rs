//! Token data model.

use plc_util::Offset;

/// The class a token belongs to.
///
/// Keywords (`LET`, `DEF`, `IF`, ...) are not their own kind: they are
/// ordinary `Identifier` tokens whose literal the Parser compares
/// against an exact string, matching the grammar's own notation (`"LET"`
/// is a literal-match production, not a lexical category).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Integer,
    Decimal,
    Character,
    String,
    Operator,
}

/// A single lexed token: its class, the exact source substring it came
/// from, and the byte offset it started at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub start: Offset,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, start: Offset) -> Self {
        Self { kind, literal: literal.into(), start }
    }
}
