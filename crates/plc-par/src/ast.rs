//! AST node definitions.
//!
//! Resolved type / resolved reference are deliberately absent from
//! these types. A "settable" field on a node (filled in by the
//! Analyzer after the fact) plus a back-reference from a node to a
//! Scope-owned `Variable`/`Function` would together require both
//! interior mutability and a reference cycle between the AST and the
//! Scope. Instead, every [`Expr`] carries a stable [`NodeId`] stamped
//! by the parser; the Analyzer's output keys its resolved-type and
//! resolved-reference tables by that id rather than mutating the node.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use plc_util::{NodeId, Symbol};

/// A complete program: an ordered sequence of fields, then methods.
#[derive(Debug, Clone)]
pub struct Source {
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: Symbol,
    pub type_name: Symbol,
    pub constant: bool,
    pub initializer: Option<Expr>,
    pub id: NodeId,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Symbol,
    pub type_name: Symbol,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: Symbol,
    pub params: Vec<Param>,
    /// `None` means the grammar's default return type, NIL.
    pub return_type: Option<Symbol>,
    pub body: Vec<Stmt>,
    pub id: NodeId,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    Decl {
        name: Symbol,
        type_name: Option<Symbol>,
        value: Option<Expr>,
        id: NodeId,
    },
    Assign {
        receiver: Expr,
        value: Expr,
        id: NodeId,
    },
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Vec<Stmt>,
        id: NodeId,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        increment: Option<Box<Stmt>>,
        body: Vec<Stmt>,
        id: NodeId,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
        id: NodeId,
    },
    Return {
        value: Expr,
        id: NodeId,
    },
}

/// The literal payload of a [`Expr::Literal`] node: nil, boolean,
/// character, string, arbitrary-precision integer, or
/// arbitrary-precision decimal.
#[derive(Debug, Clone)]
pub enum Literal {
    Nil,
    Bool(bool),
    Char(char),
    Int(BigInt),
    Decimal(BigDecimal),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    And,
    Or,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn from_literal(literal: &str) -> Option<BinOp> {
        Some(match literal {
            "&&" => BinOp::And,
            "||" => BinOp::Or,
            "<" => BinOp::Lt,
            "<=" => BinOp::Le,
            ">" => BinOp::Gt,
            ">=" => BinOp::Ge,
            "==" => BinOp::Eq,
            "!=" => BinOp::Ne,
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal { value: Literal, id: NodeId },
    /// A parenthesized expression; the child must be a `Binary` and
    /// the group inherits its type.
    Group { inner: Box<Expr>, id: NodeId },
    Binary { op: BinOp, left: Box<Expr>, right: Box<Expr>, id: NodeId },
    Access { receiver: Option<Box<Expr>>, name: Symbol, id: NodeId },
    Call { receiver: Option<Box<Expr>>, name: Symbol, args: Vec<Expr>, id: NodeId },
}

impl Expr {
    /// The stable id used to key the Analyzer's resolved-type and
    /// resolved-reference side tables.
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Literal { id, .. }
            | Expr::Group { id, .. }
            | Expr::Binary { id, .. }
            | Expr::Access { id, .. }
            | Expr::Call { id, .. } => *id,
        }
    }
}
