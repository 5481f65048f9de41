//! The Evaluator's own runtime scope chain.
//!
//! Same arena-plus-cursor shape as `plc_sem::ScopeTree` — a `RibId`
//! arena with a cursor at the currently-open scope — adapted to hold
//! runtime values instead of resolved definitions. The Analyzer and
//! Evaluator never share a scope instance: this is its own small copy
//! rather than a shared abstraction.

use rustc_hash::FxHashMap;

use plc_par::Method;
use plc_util::{Idx, IndexVec, SemanticError, Symbol};

use crate::value::Value;

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

struct RuntimeVariable {
    value: Value,
    constant: bool,
}

struct Rib<'a> {
    variables: FxHashMap<Symbol, RuntimeVariable>,
    functions: FxHashMap<(Symbol, usize), &'a Method>,
    parent: Option<RibId>,
}

impl<'a> Rib<'a> {
    fn empty(parent: Option<RibId>) -> Self {
        Self { variables: FxHashMap::default(), functions: FxHashMap::default(), parent }
    }
}

pub struct Environment<'a> {
    ribs: IndexVec<RibId, Rib<'a>>,
    current: RibId,
    root: RibId,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        let mut ribs = IndexVec::new();
        let root = ribs.push(Rib::empty(None));
        Self { ribs, current: root, root }
    }

    /// Opens a scope parented directly at the root, isolated from
    /// whatever scope the caller is currently in, and returns the
    /// cursor the matching [`Self::exit_call_frame`] must restore.
    ///
    /// Methods are not closures — a call sees the program's fields and
    /// methods but none of the caller's locals, so entering a call
    /// frame does not chain onto `self.current` the way `enter` does
    /// for a block.
    pub fn enter_call_frame(&mut self) -> RibId {
        let previous = self.current;
        self.current = self.ribs.push(Rib::empty(Some(self.root)));
        previous
    }

    pub fn exit_call_frame(&mut self, previous: RibId) {
        self.current = previous;
    }

    /// Opens a fresh child scope and makes it current.
    pub fn enter(&mut self) {
        log::trace!("entering runtime scope");
        let rib = Rib::empty(Some(self.current));
        self.current = self.ribs.push(rib);
    }

    /// Closes the current scope, returning to its parent.
    ///
    /// # Panics
    /// Panics if called on the root scope. Every `enter` in this crate
    /// is paired with exactly one `exit` on every exit path (including
    /// an error or a `RETURN` signal unwinding through it), so this
    /// never fires in practice.
    pub fn exit(&mut self) {
        log::trace!("exiting runtime scope");
        self.current = self.ribs[self.current].parent.expect("cannot exit the root scope");
    }

    pub fn define_variable(&mut self, name: Symbol, value: Value, constant: bool) {
        self.ribs[self.current].variables.insert(name, RuntimeVariable { value, constant });
    }

    pub fn define_function(&mut self, name: Symbol, arity: usize, method: &'a Method) {
        self.ribs[self.current].functions.insert((name, arity), method);
    }

    pub fn get(&self, name: Symbol) -> Result<Value, SemanticError> {
        let mut rib_id = self.current;
        loop {
            let rib = &self.ribs[rib_id];
            if let Some(var) = rib.variables.get(&name) {
                return Ok(var.value.clone());
            }
            rib_id = rib.parent.ok_or_else(|| SemanticError::new("undefined variable at runtime"))?;
        }
    }

    pub fn assign(&mut self, name: Symbol, value: Value) -> Result<(), SemanticError> {
        let mut rib_id = self.current;
        loop {
            if let Some(var) = self.ribs[rib_id].variables.get_mut(&name) {
                if var.constant {
                    return Err(SemanticError::new("cannot assign to a constant variable"));
                }
                var.value = value;
                return Ok(());
            }
            rib_id = self.ribs[rib_id]
                .parent
                .ok_or_else(|| SemanticError::new("undefined variable at runtime"))?;
        }
    }

    pub fn resolve_function(&self, name: Symbol, arity: usize) -> Option<&'a Method> {
        let mut rib_id = self.current;
        loop {
            let rib = &self.ribs[rib_id];
            if let Some(&method) = rib.functions.get(&(name, arity)) {
                return Some(method);
            }
            rib_id = rib.parent?;
        }
    }
}

impl<'a> Default for Environment<'a> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_scope_reads_parent_variables() {
        let mut env = Environment::new();
        env.define_variable(Symbol::MAIN, Value::Nil, false);
        env.enter();
        assert_eq!(env.get(Symbol::MAIN), Ok(Value::Nil));
        env.exit();
    }

    #[test]
    fn assigning_through_a_constant_fails() {
        let mut env = Environment::new();
        env.define_variable(Symbol::MAIN, Value::Bool(true), true);
        assert!(env.assign(Symbol::MAIN, Value::Bool(false)).is_err());
    }

    #[test]
    fn assignment_writes_through_to_the_defining_scope() {
        let mut env = Environment::new();
        env.define_variable(Symbol::MAIN, Value::Bool(true), false);
        env.enter();
        env.assign(Symbol::MAIN, Value::Bool(false)).unwrap();
        env.exit();
        assert_eq!(env.get(Symbol::MAIN), Ok(Value::Bool(false)));
    }
}
