//! Reference resolution
//!
//! Every use of a name is looked up from the innermost scope outward. The
//! nearest visible declaration wins, whatever its shape, and the number of
//! subscripts at the use must match its declared dimension count exactly.

use tracing::debug;

use super::config::DimensionPolicy;
use super::const_expr::ConstExprValidator;
use super::context::{Access, AnalysisContext, AnalysisResult};
use super::diagnostic::{plural, Diagnostic, DiagnosticKind};
use super::lints;
use super::scope::ScopeId;
use super::symbol::SymbolKind;
use crate::frontend::ast::*;

pub struct ReferenceResolver;

impl ReferenceResolver {
    pub fn resolve(ctx: &mut AnalysisContext<'_>, unit: &CompUnit) -> AnalysisResult<()> {
        for item in &unit.items {
            ctx.checkpoint()?;
            match item {
                Item::Decl(decl) => Self::resolve_decl(ctx, ScopeId::GLOBAL, decl)?,
                Item::Struct(def) => {
                    for field in &def.fields {
                        Self::resolve_type(ctx, &field.ty);
                        Self::resolve_dimensions(ctx, ScopeId::GLOBAL, &field.dimensions)?;
                    }
                }
                Item::Func(func) => Self::resolve_function(ctx, func)?,
            }
        }
        debug!(diagnostics = ctx.diagnostics().len(), "references resolved");
        Ok(())
    }

    fn resolve_function(ctx: &mut AnalysisContext<'_>, func: &FuncDef) -> AnalysisResult<()> {
        Self::resolve_type(ctx, &func.return_type);
        let scope = ctx.scopes.scope_of(func.id).unwrap_or(ScopeId::GLOBAL);

        for param in &func.params {
            Self::resolve_type(ctx, &param.ty);
            if let Some(dims) = &param.array {
                Self::resolve_dimensions(ctx, scope, dims)?;
            }
        }

        Self::resolve_items(ctx, scope, &func.body.items)
    }

    fn resolve_items(ctx: &mut AnalysisContext<'_>, scope: ScopeId, items: &[BlockItem]) -> AnalysisResult<()> {
        for item in items {
            ctx.checkpoint()?;
            match item {
                BlockItem::Decl(decl) => Self::resolve_decl(ctx, scope, decl)?,
                BlockItem::Stmt(stmt) => Self::resolve_stmt(ctx, scope, stmt)?,
            }
        }
        Ok(())
    }

    fn resolve_decl(ctx: &mut AnalysisContext<'_>, scope: ScopeId, decl: &Decl) -> AnalysisResult<()> {
        Self::resolve_type(ctx, decl.ty());
        match decl {
            Decl::Var(var) => {
                for def in &var.defs {
                    Self::resolve_dimensions(ctx, scope, &def.dimensions)?;
                    if let Some(init) = &def.init {
                        for expr in init.exprs() {
                            Self::resolve_expr(ctx, scope, expr)?;
                        }
                    }
                }
            }
            Decl::Const(c) => {
                for def in &c.defs {
                    Self::resolve_dimensions(ctx, scope, &def.dimensions)?;
                    // A duplicate declarator has no symbol of its own
                    let defining = ctx
                        .scopes
                        .lookup_local(scope, &def.name.name)
                        .filter(|&id| ctx.scopes.symbol(id).span == def.name.span);
                    for expr in def.init.exprs() {
                        Self::resolve_expr(ctx, scope, expr)?;
                        ConstExprValidator::check_initializer(ctx, scope, expr, defining)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Array sizes of a declaration, a struct field or an array parameter
    fn resolve_dimensions(ctx: &mut AnalysisContext<'_>, scope: ScopeId, dims: &[Expr]) -> AnalysisResult<()> {
        for dim in dims {
            Self::resolve_expr(ctx, scope, dim)?;
            match ctx.config.dimensions {
                DimensionPolicy::IntegerLiteral => {
                    if !dim.is_int_literal() {
                        ctx.emit(Diagnostic::new(
                            DiagnosticKind::NonConstantDimension,
                            "array dimension must be an integer literal",
                            dim.span,
                        ));
                    }
                }
                DimensionPolicy::ConstantExpression => ConstExprValidator::check(ctx, scope, dim)?,
            }
        }
        Ok(())
    }

    fn resolve_stmt(ctx: &mut AnalysisContext<'_>, scope: ScopeId, stmt: &Stmt) -> AnalysisResult<()> {
        ctx.checkpoint()?;
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                Self::resolve_expr(ctx, scope, value)?;
                Self::resolve_lval(ctx, scope, target, Access::Write)
            }
            StmtKind::Expr(expr) | StmtKind::Return(expr) => match expr {
                Some(expr) => Self::resolve_expr(ctx, scope, expr),
                None => Ok(()),
            },
            StmtKind::Block(block) => {
                let inner = ctx.scopes.scope_of(block.id).unwrap_or(scope);
                Self::resolve_items(ctx, inner, &block.items)
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                Self::resolve_expr(ctx, scope, condition)?;
                Self::resolve_stmt(ctx, scope, then_branch)?;
                match else_branch {
                    Some(else_branch) => Self::resolve_stmt(ctx, scope, else_branch),
                    None => Ok(()),
                }
            }
            StmtKind::While { condition, body } => {
                Self::resolve_expr(ctx, scope, condition)?;
                Self::resolve_stmt(ctx, scope, body)
            }
            StmtKind::Break | StmtKind::Continue => Ok(()),
        }
    }

    /// Walks with an explicit stack: a long operator chain in the source
    /// nests as deep as it is long.
    fn resolve_expr(ctx: &mut AnalysisContext<'_>, scope: ScopeId, expr: &Expr) -> AnalysisResult<()> {
        let mut pending = vec![expr];
        while let Some(expr) = pending.pop() {
            ctx.checkpoint()?;
            match &expr.kind {
                ExprKind::IntLiteral(_) | ExprKind::FloatLiteral(_) | ExprKind::StringLiteral(_) => {}
                ExprKind::LVal(lval) => {
                    Self::resolve_name(ctx, scope, lval, Access::Read);
                    pending.extend(lval.indices.iter().rev());
                }
                ExprKind::Call { callee, args } => {
                    Self::resolve_callee(ctx, scope, callee);
                    pending.extend(args.iter().rev());
                }
                ExprKind::Unary { .. } => pending.push(lints::check_unary_chain(ctx, expr)),
                ExprKind::Binary { left, right, .. } => {
                    pending.push(right.as_ref());
                    pending.push(left.as_ref());
                }
            }
        }
        Ok(())
    }

    fn resolve_lval(ctx: &mut AnalysisContext<'_>, scope: ScopeId, lval: &LVal, access: Access) -> AnalysisResult<()> {
        Self::resolve_name(ctx, scope, lval, access);
        for index in &lval.indices {
            Self::resolve_expr(ctx, scope, index)?;
        }
        Ok(())
    }

    /// Look up the name of `lval` and check its subscript count
    fn resolve_name(ctx: &mut AnalysisContext<'_>, scope: ScopeId, lval: &LVal, access: Access) {
        let name = &lval.name;
        let Some(id) = ctx.scopes.lookup(scope, &name.name, name.span.start) else {
            ctx.emit(Diagnostic::new(
                DiagnosticKind::UndefinedSymbol,
                format!("undefined identifier '{}'", name.name),
                name.span,
            ));
            return;
        };
        ctx.record_use(id, access);

        let symbol = ctx.scopes.symbol(id);
        let used = lval.indices.len();
        let declared = symbol.dimension_count;
        if used != declared {
            let mut diagnostic = Diagnostic::new(
                DiagnosticKind::DimensionMismatch,
                format!(
                    "'{}' is used with {} but declared with {}",
                    name.name,
                    plural(used, "subscript"),
                    plural(declared, "dimension")
                ),
                lval.span,
            );
            if !symbol.builtin {
                diagnostic = diagnostic.with_related(symbol.span, "declared here");
            }
            ctx.emit(diagnostic);
        }
    }

    fn resolve_callee(ctx: &mut AnalysisContext<'_>, scope: ScopeId, callee: &Ident) {
        let Some(id) = ctx.scopes.lookup(scope, &callee.name, callee.span.start) else {
            ctx.emit(Diagnostic::new(
                DiagnosticKind::UndefinedSymbol,
                format!("undefined function '{}'", callee.name),
                callee.span,
            ));
            return;
        };
        ctx.record_use(id, Access::Read);

        if !ctx.scopes.is_function(id) {
            let symbol = ctx.scopes.symbol(id);
            let diagnostic = Diagnostic::new(
                DiagnosticKind::NotCallable,
                format!("'{}' is a {}, not a function", callee.name, symbol.kind),
                callee.span,
            )
            .with_related(symbol.span, "declared here");
            ctx.emit(diagnostic);
        }
    }

    /// `struct Name` must refer to a struct definition
    fn resolve_type(ctx: &mut AnalysisContext<'_>, ty: &TypeSpec) {
        let Some(name) = ty.struct_name() else {
            return;
        };
        let found = ctx
            .scopes
            .lookup(ScopeId::GLOBAL, &name.name, name.span.start)
            .filter(|&id| ctx.scopes.symbol(id).kind == SymbolKind::Struct);

        if found.is_none() {
            ctx.emit(Diagnostic::new(
                DiagnosticKind::UndefinedSymbol,
                format!("undefined struct '{}'", name.name),
                name.span,
            ));
        }
    }
}
