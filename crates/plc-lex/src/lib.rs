//! plc-lex — the PLC lexer: character stream → token stream.

pub mod cursor;
pub mod lexer;
pub mod token;

pub use lexer::{decode_escapes, Lexer};
pub use token::{Token, TokenKind};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every token's literal is exactly the source substring at
        /// its offset.
        #[test]
        fn token_literal_matches_source_slice(name in "[a-zA-Z_][a-zA-Z0-9_-]{0,12}") {
            let tokens = Lexer::tokenize(&name).unwrap();
            prop_assert_eq!(tokens.len(), 1);
            let token = &tokens[0];
            prop_assert_eq!(&name[token.start..token.start + token.literal.len()], token.literal.as_str());
        }

        /// Token offsets are non-decreasing and never exceed the
        /// source length.
        #[test]
        fn offsets_are_monotonic(a in "[a-z]{1,6}", b in "[a-z]{1,6}") {
            let source = format!("{a} {b}");
            let tokens = Lexer::tokenize(&source).unwrap();
            for window in tokens.windows(2) {
                prop_assert!(window[0].start < window[1].start);
            }
            for token in &tokens {
                prop_assert!(token.start <= source.len());
            }
        }
    }
}
