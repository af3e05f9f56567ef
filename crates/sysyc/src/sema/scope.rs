//! Symbol table and scope management
//!
//! Scopes live in an arena owned by one analysis run. Each scope links to
//! its enclosing scope through a [`ScopeId`], so the tree has no ownership
//! cycles and is dropped in one piece once the diagnostics are produced.

use std::collections::HashMap;

use string_interner::{DefaultStringInterner, DefaultSymbol};
use tracing::trace;

use super::symbol::{Symbol, SymbolId, SymbolKind};
use crate::frontend::ast::NodeId;

/// Interned identifier
pub type Name = DefaultSymbol;

/// Index of a scope inside a [`ScopeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub(crate) u32);

impl ScopeId {
    /// The root scope, created together with the tree
    pub const GLOBAL: Self = Self(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    /// Parameters and the outermost block of a function body
    Function,
    /// A nested `{ ... }` block
    Block,
    /// Fields of one struct definition
    Struct,
}

/// A scope containing symbols
#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// Name of the function or struct this scope belongs to
    pub owner: Option<String>,
    symbols: HashMap<Name, SymbolId>,
    order: Vec<SymbolId>,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>, owner: Option<String>) -> Self {
        Self {
            kind,
            parent,
            owner,
            symbols: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Symbols of this scope in declaration order
    pub fn symbols(&self) -> &[SymbolId] {
        &self.order
    }
}

/// Returned when a name is already taken in the target scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redeclaration {
    pub existing: SymbolId,
}

/// Arena of scopes and symbols for one analysis run
#[derive(Debug)]
pub struct ScopeTree {
    names: DefaultStringInterner,
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    node_scopes: HashMap<NodeId, ScopeId>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            names: DefaultStringInterner::new(),
            scopes: vec![Scope::new(ScopeKind::Global, None, None)],
            symbols: Vec::new(),
            node_scopes: HashMap::new(),
        }
    }

    pub fn intern(&mut self, name: &str) -> Name {
        self.names.get_or_intern(name)
    }

    /// Resolve an interned name back to its text
    pub fn name(&self, name: Name) -> &str {
        self.names.resolve(name).unwrap_or("<unknown>")
    }

    /// Create a child scope under `parent`
    pub fn push_scope(&mut self, kind: ScopeKind, parent: ScopeId, owner: Option<String>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        trace!(?id, ?kind, ?parent, "new scope");
        self.scopes.push(Scope::new(kind, Some(parent), owner));
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.name(self.symbol(id).name)
    }

    /// All symbols of all scopes, in creation order
    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, sym)| (SymbolId(i as u32), sym))
    }

    /// Insert a symbol into `scope`
    ///
    /// The first declaration of a name wins: on a collision nothing is
    /// inserted and the existing symbol is reported back.
    pub fn declare(&mut self, scope: ScopeId, mut symbol: Symbol) -> Result<SymbolId, Redeclaration> {
        if let Some(&existing) = self.scopes[scope.0 as usize].symbols.get(&symbol.name) {
            return Err(Redeclaration { existing });
        }

        let id = SymbolId(self.symbols.len() as u32);
        symbol.scope = scope;
        self.symbols.push(symbol);

        let scope = &mut self.scopes[scope.0 as usize];
        scope.symbols.insert(self.symbols[id.0 as usize].name, id);
        scope.order.push(id);
        Ok(id)
    }

    /// Look a name up in one scope only
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let name = self.names.get(name)?;
        self.scope(scope).symbols.get(&name).copied()
    }

    /// Walk the scope chain outward from `scope` and return the nearest
    /// symbol called `name` that is declared before `position`
    pub fn lookup(&self, scope: ScopeId, name: &str, position: usize) -> Option<SymbolId> {
        let name = self.names.get(name)?;
        let mut current = Some(scope);

        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(&sym) = scope.symbols.get(&name) {
                if self.symbol(sym).is_visible_at(position) {
                    return Some(sym);
                }
            }
            current = scope.parent;
        }

        None
    }

    /// Attach a scope to a function or block node
    pub fn bind_node(&mut self, node: NodeId, scope: ScopeId) {
        self.node_scopes.insert(node, scope);
    }

    /// The scope attached to a function or block node
    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        self.node_scopes.get(&node).copied()
    }

    /// Nearest enclosing function scope, `scope` included
    pub fn enclosing_function(&self, scope: ScopeId) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if scope.kind == ScopeKind::Function {
                return Some(id);
            }
            current = scope.parent;
        }
        None
    }

    /// Human readable location of a scope for diagnostics
    pub fn describe(&self, id: ScopeId) -> String {
        let scope = self.scope(id);
        let owner = scope.owner.as_deref().unwrap_or("<anonymous>");
        match scope.kind {
            ScopeKind::Global => "global scope".to_string(),
            ScopeKind::Function => format!("function '{}'", owner),
            ScopeKind::Struct => format!("struct '{}'", owner),
            ScopeKind::Block => match self.enclosing_function(id) {
                Some(func) => format!("block in {}", self.describe(func)),
                None => "block".to_string(),
            },
        }
    }

    /// Whether a symbol lives in the global scope
    pub fn is_global(&self, id: SymbolId) -> bool {
        self.symbol(id).scope == ScopeId::GLOBAL
    }

    /// Whether `id` names something that can be called
    pub fn is_function(&self, id: SymbolId) -> bool {
        self.symbol(id).kind == SymbolKind::Function
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
