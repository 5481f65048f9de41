//! The Analyzer's output table of resolved [`Def`]initions, keyed by
//! [`DefId`].

use plc_util::{DefId, Idx, IndexVec};

use crate::def::{Def, Function, Variable};

#[derive(Debug, Default)]
pub struct SymbolTable {
    defs: IndexVec<DefId, Def>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { defs: IndexVec::new() }
    }

    pub fn push_variable(&mut self, variable: Variable) -> DefId {
        self.defs.push(Def::Variable(variable))
    }

    pub fn push_function(&mut self, function: Function) -> DefId {
        self.defs.push(Def::Function(function))
    }

    pub fn get(&self, id: DefId) -> &Def {
        &self.defs[id]
    }

    pub fn variable(&self, id: DefId) -> &Variable {
        self.get(id).as_variable().expect("DefId did not resolve to a variable")
    }

    pub fn function(&self, id: DefId) -> &Function {
        self.get(id).as_function().expect("DefId did not resolve to a function")
    }

    pub fn iter(&self) -> impl Iterator<Item = (DefId, &Def)> {
        self.defs.iter_enumerated()
    }
}
