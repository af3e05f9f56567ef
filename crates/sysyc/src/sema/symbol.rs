//! Symbols recorded for declarations

use super::scope::{Name, ScopeId};
use crate::common::Span;

/// Index of a symbol inside its [`ScopeTree`](super::ScopeTree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u32);

/// A symbol in the symbol table
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: Name,
    pub kind: SymbolKind,
    /// 0 for scalars, N for an N-dimensional array
    pub dimension_count: usize,
    /// The scope that owns this symbol
    pub scope: ScopeId,
    pub span: Span,
    pub has_initializer: bool,
    /// Runtime library function; visible everywhere and without a source span
    pub builtin: bool,
}

impl Symbol {
    pub fn new(name: Name, kind: SymbolKind, span: Span) -> Self {
        Self {
            name,
            kind,
            dimension_count: 0,
            scope: ScopeId::GLOBAL,
            span,
            has_initializer: false,
            builtin: false,
        }
    }

    pub fn with_dimensions(mut self, dimension_count: usize) -> Self {
        self.dimension_count = dimension_count;
        self
    }

    pub fn with_initializer(mut self, has_initializer: bool) -> Self {
        self.has_initializer = has_initializer;
        self
    }

    pub fn builtin(mut self) -> Self {
        self.builtin = true;
        self
    }

    /// Whether the symbol can be seen from a use-site starting at `position`
    pub fn is_visible_at(&self, position: usize) -> bool {
        self.builtin || self.span.start <= position
    }
}

/// Kind of symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Constant,
    Parameter,
    Function,
    Struct,
    StructField,
}

impl SymbolKind {
    /// Category word used in diagnostic messages
    pub fn describe(self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Function => "function",
            SymbolKind::Struct => "struct",
            SymbolKind::StructField => "field",
        }
    }

    /// Whether a reference to this symbol may appear in a constant expression
    pub fn is_compile_time_constant(self) -> bool {
        matches!(self, SymbolKind::Constant)
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}
