use std::collections::HashMap;

use ziv_types::PrimitiveType;

/// The role a symbol plays in its declaring scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Parameter,
    Type,
}

/// An entry in the symbol table: a name, what kind of thing it names, and
/// its type.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub type_: PrimitiveType,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, type_: PrimitiveType) -> Self {
        Symbol {
            name: name.into(),
            kind,
            type_,
        }
    }
}

/// A stack of lexical scopes, innermost last. Resolution walks from the
/// innermost scope outward; a name already bound in the *current* scope
/// cannot be redefined, but it can shadow a binding from an enclosing one.
#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl SymbolTable {
    /// A table with a single root scope already pushed.
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pops the innermost scope. Panics if called on the root scope, since
    /// scopes are pushed and popped strictly in LIFO order by the checker
    /// and popping past the root is a caller bug.
    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot pop the root scope");
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Defines `symbol` in the innermost scope. Returns `false` without
    /// modifying the table if a symbol with the same name already exists in
    /// that scope; this is the caller's duplicate-declaration signal.
    pub fn define(&mut self, symbol: Symbol) -> bool {
        let scope = self.scopes.last_mut().expect("symbol table has no scopes");
        if scope.contains_key(&symbol.name) {
            return false;
        }
        scope.insert(symbol.name.clone(), symbol);
        true
    }

    /// Looks up `name` starting from the innermost scope outward.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// `true` if `name` is already bound in the *innermost* scope only.
    pub fn is_declared_in_current_scope(&self, name: &str) -> bool {
        self.scopes
            .last()
            .map(|scope| scope.contains_key(name))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadowing_across_scopes_is_allowed() {
        let mut table = SymbolTable::new();
        assert!(table.define(Symbol::new("x", SymbolKind::Variable, PrimitiveType::Int)));
        table.push_scope();
        assert!(table.define(Symbol::new("x", SymbolKind::Variable, PrimitiveType::String)));
        assert_eq!(table.lookup("x").unwrap().type_, PrimitiveType::String);
        table.pop_scope();
        assert_eq!(table.lookup("x").unwrap().type_, PrimitiveType::Int);
    }

    #[test]
    fn redeclaration_in_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        assert!(table.define(Symbol::new("x", SymbolKind::Variable, PrimitiveType::Int)));
        assert!(!table.define(Symbol::new("x", SymbolKind::Variable, PrimitiveType::Int)));
    }

    #[test]
    fn lookup_walks_outward_through_enclosing_scopes() {
        let mut table = SymbolTable::new();
        table.define(Symbol::new("outer", SymbolKind::Function, PrimitiveType::None));
        table.push_scope();
        assert_eq!(table.lookup("outer").unwrap().kind, SymbolKind::Function);
        assert!(table.lookup("missing").is_none());
    }
}
