//! Scope construction and duplicate detection
//!
//! Walks every declaration site in source order and inserts it into the
//! scope tree. A name that is already present in the target scope is
//! reported at the new declaration and not inserted, so later lookups see
//! the first declaration.

use tracing::debug;

use super::config::ShadowingPolicy;
use super::context::{AnalysisContext, AnalysisResult};
use super::diagnostic::{Diagnostic, DiagnosticKind};
use super::scope::{ScopeId, ScopeKind};
use super::symbol::{Symbol, SymbolKind};
use crate::frontend::ast::*;

/// Runtime library functions every SysY program may call without declaring
pub const RUNTIME_FUNCTIONS: &[&str] = &[
    "getint", "getch", "getfloat", "getarray", "getfarray", "putint", "putch", "putfloat",
    "putarray", "putfarray", "putf", "starttime", "stoptime",
];

/// Populates the scope tree of an [`AnalysisContext`]
pub struct ScopeBuilder;

impl ScopeBuilder {
    pub fn build(ctx: &mut AnalysisContext<'_>, unit: &CompUnit) -> AnalysisResult<()> {
        Self::declare_runtime(ctx);

        for item in &unit.items {
            ctx.checkpoint()?;
            match item {
                Item::Decl(decl) => Self::declare_decl(ctx, ScopeId::GLOBAL, decl),
                Item::Struct(def) => Self::declare_struct(ctx, def),
                Item::Func(func) => Self::declare_function(ctx, func)?,
            }
        }

        debug!(
            scopes = ctx.scopes.scope_count(),
            diagnostics = ctx.diagnostics().len(),
            "scope tree built"
        );
        Ok(())
    }

    fn declare_runtime(ctx: &mut AnalysisContext<'_>) {
        for name in RUNTIME_FUNCTIONS {
            let name = ctx.scopes.intern(name);
            let symbol = Symbol::new(name, SymbolKind::Function, Default::default()).builtin();
            let _ = ctx.scopes.declare(ScopeId::GLOBAL, symbol);
        }
    }

    fn declare_decl(ctx: &mut AnalysisContext<'_>, scope: ScopeId, decl: &Decl) {
        match decl {
            Decl::Var(var) => {
                for def in &var.defs {
                    let symbol = Self::symbol(ctx, &def.name, SymbolKind::Variable)
                        .with_dimensions(def.dimensions.len())
                        .with_initializer(def.init.is_some());
                    Self::insert(ctx, scope, &def.name, symbol, "identifier");
                }
            }
            Decl::Const(c) => {
                for def in &c.defs {
                    let symbol = Self::symbol(ctx, &def.name, SymbolKind::Constant)
                        .with_dimensions(def.dimensions.len())
                        .with_initializer(true);
                    Self::insert(ctx, scope, &def.name, symbol, "identifier");
                }
            }
        }
    }

    fn declare_struct(ctx: &mut AnalysisContext<'_>, def: &StructDef) {
        let symbol = Self::symbol(ctx, &def.name, SymbolKind::Struct);
        Self::insert(ctx, ScopeId::GLOBAL, &def.name, symbol, "identifier");

        // Fields are checked against each other only, never against globals
        let fields = ctx.scopes.push_scope(ScopeKind::Struct, ScopeId::GLOBAL, Some(def.name.name.clone()));
        for field in &def.fields {
            let symbol = Self::symbol(ctx, &field.name, SymbolKind::StructField)
                .with_dimensions(field.dimensions.len());
            Self::insert(ctx, fields, &field.name, symbol, "field name");
        }
    }

    fn declare_function(ctx: &mut AnalysisContext<'_>, func: &FuncDef) -> AnalysisResult<()> {
        let symbol = Self::symbol(ctx, &func.name, SymbolKind::Function);
        Self::insert(ctx, ScopeId::GLOBAL, &func.name, symbol, "identifier");

        let scope = ctx.scopes.push_scope(ScopeKind::Function, ScopeId::GLOBAL, Some(func.name.name.clone()));
        ctx.scopes.bind_node(func.id, scope);
        // The outermost block shares the parameters' scope
        ctx.scopes.bind_node(func.body.id, scope);

        for param in &func.params {
            // Array parameters decay to a pointer: one dimension whatever the written rank
            let dims = if param.is_array() { 1 } else { 0 };
            let symbol = Self::symbol(ctx, &param.name, SymbolKind::Parameter).with_dimensions(dims);
            Self::insert(ctx, scope, &param.name, symbol, "parameter name");
        }

        Self::declare_block_items(ctx, scope, &func.body.items)
    }

    fn declare_block_items(
        ctx: &mut AnalysisContext<'_>,
        scope: ScopeId,
        items: &[BlockItem],
    ) -> AnalysisResult<()> {
        for item in items {
            ctx.checkpoint()?;
            match item {
                BlockItem::Decl(decl) => Self::declare_decl(ctx, scope, decl),
                BlockItem::Stmt(stmt) => Self::declare_in_stmt(ctx, scope, stmt)?,
            }
        }
        Ok(())
    }

    fn declare_in_stmt(ctx: &mut AnalysisContext<'_>, scope: ScopeId, stmt: &Stmt) -> AnalysisResult<()> {
        match &stmt.kind {
            StmtKind::Block(block) => {
                let inner = ctx.scopes.push_scope(ScopeKind::Block, scope, None);
                ctx.scopes.bind_node(block.id, inner);
                Self::declare_block_items(ctx, inner, &block.items)
            }
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                Self::declare_in_stmt(ctx, scope, then_branch)?;
                if let Some(else_branch) = else_branch {
                    Self::declare_in_stmt(ctx, scope, else_branch)?;
                }
                Ok(())
            }
            StmtKind::While { body, .. } => Self::declare_in_stmt(ctx, scope, body),
            StmtKind::Assign { .. }
            | StmtKind::Expr(_)
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Return(_) => Ok(()),
        }
    }

    fn symbol(ctx: &mut AnalysisContext<'_>, ident: &Ident, kind: SymbolKind) -> Symbol {
        let name = ctx.scopes.intern(&ident.name);
        Symbol::new(name, kind, ident.span)
    }

    /// Declare `symbol` in `scope`, reporting a collision at `ident`
    fn insert(
        ctx: &mut AnalysisContext<'_>,
        scope: ScopeId,
        ident: &Ident,
        symbol: Symbol,
        what: &str,
    ) {
        if ctx.config.shadowing == ShadowingPolicy::Forbid {
            Self::check_shadowing(ctx, scope, ident);
        }

        if let Err(redeclaration) = ctx.scopes.declare(scope, symbol) {
            let previous = ctx.scopes.symbol(redeclaration.existing);
            let mut diagnostic = Diagnostic::new(
                DiagnosticKind::DuplicateSymbol,
                format!(
                    "duplicate {} '{}' in {}",
                    what,
                    ident.name,
                    ctx.scopes.describe(scope)
                ),
                ident.span,
            );
            if previous.builtin {
                diagnostic.message.push_str(" (runtime library function)");
            } else {
                diagnostic = diagnostic.with_related(previous.span, "first declared here");
            }
            ctx.emit(diagnostic);
        }
    }

    /// Under [`ShadowingPolicy::Forbid`], report a local that hides a global
    fn check_shadowing(ctx: &mut AnalysisContext<'_>, scope: ScopeId, ident: &Ident) {
        let kind = ctx.scopes.scope(scope).kind;
        if matches!(kind, ScopeKind::Global | ScopeKind::Struct) {
            return;
        }
        let Some(outer) = ctx.scopes.lookup(ScopeId::GLOBAL, &ident.name, ident.span.start) else {
            return;
        };

        let outer_symbol = ctx.scopes.symbol(outer);
        let mut diagnostic = Diagnostic::new(
            DiagnosticKind::DuplicateSymbol,
            format!(
                "'{}' in {} shadows global {} '{}'",
                ident.name,
                ctx.scopes.describe(scope),
                outer_symbol.kind,
                ident.name
            ),
            ident.span,
        );
        if !outer_symbol.builtin {
            diagnostic = diagnostic.with_related(outer_symbol.span, "outer declaration here");
        }
        ctx.emit(diagnostic);
    }
}
