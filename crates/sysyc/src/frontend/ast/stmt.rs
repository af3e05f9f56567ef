//! Statement AST nodes

use super::{Decl, Expr, LVal, NodeId};
use crate::common::Span;

/// Statement node
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement kinds
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Assignment: lval = expr;
    Assign { target: LVal, value: Expr },

    /// Expression statement: expr; (or the empty statement `;`)
    Expr(Option<Expr>),

    /// Nested block: { ... }
    Block(Block),

    /// If statement: if (cond) then [else else]
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// While loop: while (cond) body
    While { condition: Expr, body: Box<Stmt> },

    Break,

    Continue,

    /// Return statement: return [expr];
    Return(Option<Expr>),
}

/// Block (compound statement)
#[derive(Debug, Clone)]
pub struct Block {
    pub id: NodeId,
    pub items: Vec<BlockItem>,
    pub span: Span,
}

impl Block {
    pub fn new(id: NodeId, items: Vec<BlockItem>, span: Span) -> Self {
        Self { id, items, span }
    }
}

/// Item inside a block
#[derive(Debug, Clone)]
pub enum BlockItem {
    Decl(Decl),
    Stmt(Stmt),
}
