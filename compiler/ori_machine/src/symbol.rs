//! Interned symbol table.
//!
//! Symbols are interned once and live for the whole process. The table keeps
//! interning order so it can be enumerated deterministically.

use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Identifier of an interned symbol.
///
/// Only meaningful for the `SymbolTable` that produced it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    /// Position of this symbol in interning order.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<symbol {}>", self.0)
    }
}

/// Process-wide table of interned symbols.
#[derive(Default)]
pub struct SymbolTable {
    map: FxHashMap<Arc<str>, Symbol>,
    names: Vec<Arc<str>>,
}

impl SymbolTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning the existing symbol if it was seen before.
    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(&sym) = self.map.get(text) {
            return sym;
        }

        #[expect(
            clippy::cast_possible_truncation,
            reason = "symbol tables stay far below u32::MAX entries"
        )]
        let sym = Symbol(self.names.len() as u32);
        let name: Arc<str> = Arc::from(text);
        self.names.push(Arc::clone(&name));
        self.map.insert(name, sym);
        sym
    }

    /// Find an already-interned symbol without interning.
    pub fn get(&self, text: &str) -> Option<Symbol> {
        self.map.get(text).copied()
    }

    /// Text of an interned symbol.
    pub fn lookup(&self, sym: Symbol) -> Option<&str> {
        self.names.get(sym.index()).map(|name| &**name)
    }

    /// Symbols in interning order.
    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.names
            .iter()
            .filter_map(|name| self.map.get(name).copied())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("len", &self.names.len())
            .finish()
    }
}
