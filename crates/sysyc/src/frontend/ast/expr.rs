//! Expression AST nodes

use super::Ident;
use crate::common::Span;

/// Expression node
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn int(value: i64, span: Span) -> Self {
        Self::new(ExprKind::IntLiteral(value), span)
    }

    /// True for a bare integer literal, the only form accepted as an array size
    /// under the strict dimension policy
    pub fn is_int_literal(&self) -> bool {
        matches!(self.kind, ExprKind::IntLiteral(_))
    }
}

/// Expression kinds
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Integer literal: 42, 0x1F, 017
    IntLiteral(i64),

    /// Float literal: 3.14
    FloatLiteral(f64),

    /// String literal, only valid as a `putf` argument
    StringLiteral(String),

    /// Variable or array element: x, arr[i][j]
    LVal(LVal),

    /// Function call: foo(a, b)
    Call {
        callee: Ident,
        args: Vec<Expr>,
    },

    /// Unary operation: -x, !flag
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// Binary operation: a + b, x < y
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// A use of a name, optionally indexed
#[derive(Debug, Clone)]
pub struct LVal {
    pub name: Ident,
    pub indices: Vec<Expr>,
    pub span: Span,
}

impl LVal {
    pub fn new(name: Ident, indices: Vec<Expr>, span: Span) -> Self {
        Self { name, indices, span }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Logical
    LogAnd,
    LogOr,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::LogAnd => "&&",
            BinaryOp::LogOr => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus, // +x
    Neg,  // -x
    Not,  // !x
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}
