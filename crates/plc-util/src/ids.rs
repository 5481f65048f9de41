//! Arena keys used across the pipeline.

use crate::index_vec::Idx;

/// A handle into the Analyzer's `SymbolTable`, standing in for a
/// back-reference to a resolved `Variable` or `Function`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefId(u32);

impl Idx for DefId {
    fn from_usize(idx: usize) -> Self {
        DefId(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A stable identity stamped on every AST node by the parser. Used as
/// the key into the Analyzer's side tables (resolved type, resolved
/// reference) instead of a settable field on the node itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl Idx for NodeId {
    fn from_usize(idx: usize) -> Self {
        NodeId(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Generates a fresh, strictly increasing `NodeId` for every AST node
/// the parser constructs.
#[derive(Debug, Default)]
pub struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}
