//! plc-par — the PLC parser: token stream → AST by recursive descent.

pub mod ast;
pub mod parser;

pub use ast::{BinOp, Expr, Field, Literal, Method, Param, Source, Stmt};
pub use parser::{parse, ParsedProgram, Parser};
