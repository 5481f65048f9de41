//! plc-sem — the Analyzer: name resolution, type attachment, and
//! semantic rule enforcement over a parsed AST.

pub mod analysis;
pub mod def;
pub mod scope;
pub mod symbol_table;
pub mod types;

pub use analysis::{analyze, Analyzed};
pub use def::{Def, Function, Variable};
pub use scope::{RibKind, ScopeTree};
pub use symbol_table::SymbolTable;
pub use types::{is_assignable, lookup_type_name, Type};
