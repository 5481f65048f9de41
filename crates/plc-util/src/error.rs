//! The two error kinds the pipeline ever produces.
//!
//! A parse error (raised by the Lexer or the Parser) always carries the
//! offset at which parsing stopped. An analysis or runtime error
//! carries only a message. Neither pass recovers after a failure —
//! each stage propagates the first error to its caller.

use crate::span::Offset;
use thiserror::Error;

/// Fatal failure from the Lexer or the Parser, pinned to the offset of
/// the offending character or token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message} (at offset {offset})")]
pub struct ParseError {
    pub message: String,
    pub offset: Offset,
}

impl ParseError {
    pub fn new(message: impl Into<String>, offset: Offset) -> Self {
        Self { message: message.into(), offset }
    }
}

/// Fatal failure from the Analyzer or the Evaluator. No offset: by the
/// time semantic analysis runs, diagnostics are phrased in terms of
/// names and types rather than source position.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SemanticError {
    pub message: String,
}

impl SemanticError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
