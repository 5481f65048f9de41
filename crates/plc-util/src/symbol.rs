//! String interning for identifiers.
//!
//! A [`Symbol`] is a compact, `Copy` handle to an interned string. Two
//! identical identifiers anywhere in a source file intern to the same
//! `Symbol`, so comparing names (e.g. matching a call's name against a
//! `Function`'s name during resolution) is an integer comparison
//! rather than a string comparison.
//!
//! Unlike a process-wide interner, a [`SymbolInterner`] is owned by a
//! single compilation: there is no persistent state or environment
//! shared across runs, so there is nothing to gain from a `'static`,
//! leak-based global table. The `Parser` creates one and it is threaded
//! through the rest of the pipeline inside `plc_par::ParsedProgram`.

use rustc_hash::FxHashMap;

/// A handle to an interned identifier string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(u32);

impl Symbol {
    /// Pre-interned by every [`SymbolInterner::new`]: the only two
    /// names the language gives built-in meaning to (the program entry
    /// point `main/0` and the `print/1` builtin).
    pub const MAIN: Symbol = Symbol(0);
    pub const PRINT: Symbol = Symbol(1);
}

const PRESEEDED: &[&str] = &["main", "print"];

/// Owns the backing strings for every [`Symbol`] produced during one
/// compilation.
#[derive(Debug, Default)]
pub struct SymbolInterner {
    strings: Vec<Box<str>>,
    lookup: FxHashMap<Box<str>, Symbol>,
}

impl SymbolInterner {
    pub fn new() -> Self {
        let mut interner = Self { strings: Vec::new(), lookup: FxHashMap::default() };
        for name in PRESEEDED {
            interner.intern(name);
        }
        interner
    }

    /// Interns `text`, returning its existing `Symbol` if already
    /// present or allocating a new one otherwise.
    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(sym) = self.lookup.get(text) {
            return *sym;
        }
        let sym = Symbol(self.strings.len() as u32);
        let boxed: Box<str> = text.into();
        self.strings.push(boxed.clone());
        self.lookup.insert(boxed, sym);
        sym
    }

    /// Resolves a `Symbol` back to its source text.
    ///
    /// # Panics
    /// Panics if `sym` was not produced by this interner.
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_the_same_text_twice_yields_the_same_symbol() {
        let mut interner = SymbolInterner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_text_yields_distinct_symbols() {
        let mut interner = SymbolInterner::new();
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn main_and_print_are_preseeded() {
        let mut interner = SymbolInterner::new();
        assert_eq!(interner.intern("main"), Symbol::MAIN);
        assert_eq!(interner.intern("print"), Symbol::PRINT);
    }

    #[test]
    fn resolve_round_trips() {
        let mut interner = SymbolInterner::new();
        let sym = interner.intern("counter");
        assert_eq!(interner.resolve(sym), "counter");
    }
}
