//! Declaration AST nodes

use super::{Block, Expr, Ident, NodeId, TypeSpec};
use crate::common::Span;

/// A variable or constant declaration statement
#[derive(Debug, Clone)]
pub enum Decl {
    /// `int a, b[2] = {1, 2};`
    Var(VarDecl),
    /// `const int N = 10, M[2] = {1, 2};`
    Const(ConstDecl),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Var(var) => var.span,
            Decl::Const(c) => c.span,
        }
    }

    pub fn ty(&self) -> &TypeSpec {
        match self {
            Decl::Var(var) => &var.ty,
            Decl::Const(c) => &c.ty,
        }
    }
}

/// Variable declaration
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub ty: TypeSpec,
    pub defs: Vec<VarDef>,
    pub span: Span,
}

/// One declarator of a variable declaration
#[derive(Debug, Clone)]
pub struct VarDef {
    pub name: Ident,
    pub dimensions: Vec<Expr>,
    pub init: Option<InitVal>,
    pub span: Span,
}

impl VarDef {
    pub fn new(name: Ident, dimensions: Vec<Expr>, span: Span) -> Self {
        Self {
            name,
            dimensions,
            init: None,
            span,
        }
    }

    pub fn with_init(mut self, init: InitVal) -> Self {
        self.init = Some(init);
        self
    }
}

/// Constant declaration
#[derive(Debug, Clone)]
pub struct ConstDecl {
    pub ty: TypeSpec,
    pub defs: Vec<ConstDef>,
    pub span: Span,
}

/// One declarator of a constant declaration; the initializer is mandatory
#[derive(Debug, Clone)]
pub struct ConstDef {
    pub name: Ident,
    pub dimensions: Vec<Expr>,
    pub init: InitVal,
    pub span: Span,
}

/// Initializer: a single expression or a braced list
#[derive(Debug, Clone)]
pub enum InitVal {
    Expr(Expr),
    List(Vec<InitVal>, Span),
}

impl InitVal {
    pub fn span(&self) -> Span {
        match self {
            InitVal::Expr(expr) => expr.span,
            InitVal::List(_, span) => *span,
        }
    }

    /// All leaf expressions, depth first
    pub fn exprs(&self) -> Vec<&Expr> {
        let mut out = Vec::new();
        self.collect_exprs(&mut out);
        out
    }

    fn collect_exprs<'a>(&'a self, out: &mut Vec<&'a Expr>) {
        match self {
            InitVal::Expr(expr) => out.push(expr),
            InitVal::List(items, _) => {
                for item in items {
                    item.collect_exprs(out);
                }
            }
        }
    }
}

/// Struct definition: `struct P { int age; int scores[3]; };`
#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: Ident,
    pub fields: Vec<StructField>,
    pub span: Span,
}

/// Struct field; `int a, b;` inside a struct yields two fields
#[derive(Debug, Clone)]
pub struct StructField {
    pub ty: TypeSpec,
    pub name: Ident,
    pub dimensions: Vec<Expr>,
    pub span: Span,
}

/// Function definition
#[derive(Debug, Clone)]
pub struct FuncDef {
    pub id: NodeId,
    pub return_type: TypeSpec,
    pub name: Ident,
    pub params: Vec<FuncParam>,
    pub body: Block,
    pub span: Span,
}

/// Function parameter
#[derive(Debug, Clone)]
pub struct FuncParam {
    pub ty: TypeSpec,
    pub name: Ident,
    /// `Some` for array parameters (`int a[]`, `int a[][4]`): the explicit
    /// dimensions that follow the leading empty `[]`
    pub array: Option<Vec<Expr>>,
    pub span: Span,
}

impl FuncParam {
    pub fn is_array(&self) -> bool {
        self.array.is_some()
    }
}
