//! Name resolution scaffold: a tree of lexical scopes ("ribs"), each
//! owning a mapping from name to [`DefId`].
//!
//! A lookup walks up the chain to the root; a definition always writes
//! to the innermost scope. Variables and functions are two separate
//! namespaces — functions are additionally keyed by `(name, arity)` so
//! overloads on arity can coexist.

use rustc_hash::FxHashMap;

use plc_util::{DefId, Idx, IndexVec, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RibId(u32);

impl Idx for RibId {
    fn from_usize(idx: usize) -> Self {
        RibId(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What kind of syntactic construct opened a rib, purely for logging.
#[derive(Debug, Clone, Copy)]
pub enum RibKind {
    Program,
    Method,
    Block,
}

#[derive(Debug)]
struct Rib {
    variables: FxHashMap<Symbol, DefId>,
    functions: FxHashMap<(Symbol, usize), DefId>,
    parent: Option<RibId>,
    kind: RibKind,
}

/// A tree of lexical scopes, with a cursor at the currently-open one.
pub struct ScopeTree {
    ribs: IndexVec<RibId, Rib>,
    current: RibId,
}

impl ScopeTree {
    pub fn new() -> Self {
        let mut ribs = IndexVec::new();
        let root = ribs.push(Rib {
            variables: FxHashMap::default(),
            functions: FxHashMap::default(),
            parent: None,
            kind: RibKind::Program,
        });
        Self { ribs, current: root }
    }

    /// Opens a fresh child scope of the current one and makes it
    /// current.
    pub fn enter(&mut self, kind: RibKind) {
        log::debug!("entering scope: {kind:?}");
        let rib = Rib {
            variables: FxHashMap::default(),
            functions: FxHashMap::default(),
            parent: Some(self.current),
            kind,
        };
        self.current = self.ribs.push(rib);
    }

    /// Closes the current scope, returning to its parent.
    ///
    /// # Panics
    /// Panics if called on the root scope — every `enter` in this
    /// crate is paired with exactly one `exit` on every exit path,
    /// including early returns from a failed analysis, so this should
    /// never fire in practice.
    pub fn exit(&mut self) {
        let parent = self.ribs[self.current].parent.expect("cannot exit the root scope");
        log::debug!("exiting scope");
        self.current = parent;
    }

    /// Defines `name` in the *innermost* (current) scope.
    pub fn define_variable(&mut self, name: Symbol, def_id: DefId) {
        self.ribs[self.current].variables.insert(name, def_id);
    }

    pub fn define_function(&mut self, name: Symbol, arity: usize, def_id: DefId) {
        self.ribs[self.current].functions.insert((name, arity), def_id);
    }

    /// Walks the chain from the current scope up to the root looking
    /// for `name`.
    pub fn resolve_variable(&self, name: Symbol) -> Option<DefId> {
        let mut rib_id = self.current;
        loop {
            let rib = &self.ribs[rib_id];
            if let Some(&def_id) = rib.variables.get(&name) {
                return Some(def_id);
            }
            rib_id = rib.parent?;
        }
    }

    /// Walks the chain from the current scope up to the root looking
    /// for a `(name, arity)` function.
    pub fn resolve_function(&self, name: Symbol, arity: usize) -> Option<DefId> {
        let mut rib_id = self.current;
        loop {
            let rib = &self.ribs[rib_id];
            if let Some(&def_id) = rib.functions.get(&(name, arity)) {
                return Some(def_id);
            }
            rib_id = rib.parent?;
        }
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(n: u32) -> Symbol {
        // Symbol has no public constructor outside the interner; for
        // these scope-only tests we only need distinct, stable keys,
        // so route through the same `Idx` shape used elsewhere.
        plc_util::SymbolInterner::new().intern(&format!("s{n}"))
    }

    #[test]
    fn child_scope_sees_parent_bindings() {
        let mut tree = ScopeTree::new();
        let outer = sym(1);
        tree.define_variable(outer, DefId::from_usize(0));
        tree.enter(RibKind::Block);
        assert_eq!(tree.resolve_variable(outer), Some(DefId::from_usize(0)));
        tree.exit();
    }

    #[test]
    fn inner_binding_is_not_visible_after_exit() {
        let mut tree = ScopeTree::new();
        tree.enter(RibKind::Block);
        let inner = sym(2);
        tree.define_variable(inner, DefId::from_usize(0));
        tree.exit();
        assert_eq!(tree.resolve_variable(inner), None);
    }

    #[test]
    fn shadowing_prefers_the_innermost_definition() {
        let mut tree = ScopeTree::new();
        let name = sym(3);
        tree.define_variable(name, DefId::from_usize(0));
        tree.enter(RibKind::Block);
        tree.define_variable(name, DefId::from_usize(1));
        assert_eq!(tree.resolve_variable(name), Some(DefId::from_usize(1)));
        tree.exit();
        assert_eq!(tree.resolve_variable(name), Some(DefId::from_usize(0)));
    }

    #[test]
    fn functions_are_keyed_by_name_and_arity() {
        let mut tree = ScopeTree::new();
        let name = sym(4);
        tree.define_function(name, 1, DefId::from_usize(0));
        tree.define_function(name, 2, DefId::from_usize(1));
        assert_eq!(tree.resolve_function(name, 1), Some(DefId::from_usize(0)));
        assert_eq!(tree.resolve_function(name, 2), Some(DefId::from_usize(1)));
        assert_eq!(tree.resolve_function(name, 3), None);
    }
}
