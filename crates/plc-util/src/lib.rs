//! plc-util — shared data definitions for the PLC toolchain.
//!
//! This crate is the bottom of the workspace: source spans, identifier
//! interning, an arena/index scaffold, and the two error types every
//! other crate returns. Nothing here knows about tokens, grammar, or
//! types — those live in `plc-lex`, `plc-par`, and `plc-sem`
//! respectively.

pub mod error;
pub mod ids;
pub mod index_vec;
pub mod sink;
pub mod span;
pub mod symbol;

pub use error::{ParseError, SemanticError};
pub use ids::{DefId, NodeId, NodeIdGen};
pub use index_vec::{Idx, IndexVec};
pub use sink::{OutputSink, StringSink};
pub use span::{Offset, Span};
pub use symbol::{Symbol, SymbolInterner};
