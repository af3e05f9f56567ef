//! Abstract Syntax Tree definitions
//!
//! Every node has a fixed shape. Functions and blocks additionally carry a
//! [`NodeId`] so that the analyzer can attach a scope to them.

mod types;
mod expr;
mod stmt;
mod decl;

pub use types::*;
pub use expr::*;
pub use stmt::*;
pub use decl::*;

use crate::common::Span;

/// Identity of a scope-introducing node (function or block)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// An identifier together with the span of its token
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// A complete compilation unit (source file)
#[derive(Debug, Clone, Default)]
pub struct CompUnit {
    pub items: Vec<Item>,
}

impl CompUnit {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Global variable and constant declarations, in source order
    pub fn declarations(&self) -> impl Iterator<Item = &Decl> {
        self.items.iter().filter_map(|item| match item {
            Item::Decl(decl) => Some(decl),
            _ => None,
        })
    }

    /// Struct definitions, in source order
    pub fn structs(&self) -> impl Iterator<Item = &StructDef> {
        self.items.iter().filter_map(|item| match item {
            Item::Struct(def) => Some(def),
            _ => None,
        })
    }

    /// Function definitions, in source order
    pub fn functions(&self) -> impl Iterator<Item = &FuncDef> {
        self.items.iter().filter_map(|item| match item {
            Item::Func(func) => Some(func),
            _ => None,
        })
    }
}

/// Top-level item
#[derive(Debug, Clone)]
pub enum Item {
    Decl(Decl),
    Struct(StructDef),
    Func(FuncDef),
}
