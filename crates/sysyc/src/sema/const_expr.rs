//! Constant-expression validation
//!
//! A constant expression may contain literals, arithmetic and references to
//! `const` symbols. Every offending reference is reported, not only the
//! first. Nesting is bounded by `AnalyzerConfig::max_const_depth`; past the
//! bound the subtree is abandoned with a single diagnostic. A constant may
//! not refer to itself in its own initializer.

use super::context::{AnalysisContext, AnalysisResult};
use super::diagnostic::{Diagnostic, DiagnosticKind};
use super::scope::ScopeId;
use super::symbol::SymbolId;
use crate::frontend::ast::{Expr, ExprKind, LVal};

pub struct ConstExprValidator<'c, 'a> {
    ctx: &'c mut AnalysisContext<'a>,
    scope: ScopeId,
    /// The constant whose initializer is being checked
    defining: Option<SymbolId>,
    max_depth: usize,
    too_deep: bool,
}

impl<'c, 'a> ConstExprValidator<'c, 'a> {
    /// Check `expr` as a constant expression evaluated inside `scope`
    pub fn check(ctx: &'c mut AnalysisContext<'a>, scope: ScopeId, expr: &Expr) -> AnalysisResult<()> {
        Self::check_initializer(ctx, scope, expr, None)
    }

    /// Check the initializer of the constant `defining`
    pub fn check_initializer(
        ctx: &'c mut AnalysisContext<'a>,
        scope: ScopeId,
        expr: &Expr,
        defining: Option<SymbolId>,
    ) -> AnalysisResult<()> {
        let max_depth = ctx.config.max_const_depth;
        let mut validator = Self {
            ctx,
            scope,
            defining,
            max_depth,
            too_deep: false,
        };
        validator.visit(expr, 0)
    }

    fn visit(&mut self, expr: &Expr, depth: usize) -> AnalysisResult<()> {
        self.ctx.checkpoint()?;

        if depth > self.max_depth {
            if !self.too_deep {
                self.too_deep = true;
                self.ctx.emit(Diagnostic::new(
                    DiagnosticKind::ConstExprTooDeep,
                    format!("constant expression nested deeper than {} levels", self.max_depth),
                    expr.span,
                ));
            }
            return Ok(());
        }

        match &expr.kind {
            ExprKind::IntLiteral(_) | ExprKind::FloatLiteral(_) | ExprKind::StringLiteral(_) => Ok(()),
            ExprKind::LVal(lval) => self.visit_lval(lval, depth),
            ExprKind::Call { callee, args } => {
                self.ctx.emit(Diagnostic::new(
                    DiagnosticKind::NonConstantInConstExpr,
                    format!("constant expression cannot call function '{}'", callee.name),
                    callee.span,
                ));
                for arg in args {
                    self.visit(arg, depth + 1)?;
                }
                Ok(())
            }
            ExprKind::Unary { operand, .. } => self.visit(operand, depth + 1),
            ExprKind::Binary { left, right, .. } => {
                self.visit(left, depth + 1)?;
                self.visit(right, depth + 1)
            }
        }
    }

    fn visit_lval(&mut self, lval: &LVal, depth: usize) -> AnalysisResult<()> {
        let name = &lval.name;
        // Unresolved names are reported by the resolver
        if let Some(id) = self.ctx.scopes.lookup(self.scope, &name.name, name.span.start) {
            let symbol = self.ctx.scopes.symbol(id);
            if Some(id) == self.defining {
                self.ctx.emit(Diagnostic::new(
                    DiagnosticKind::NonConstantInConstExpr,
                    format!("constant '{}' is used in its own initializer", name.name),
                    name.span,
                ));
            } else if !symbol.kind.is_compile_time_constant() {
                let diagnostic = Diagnostic::new(
                    DiagnosticKind::NonConstantInConstExpr,
                    format!("constant expression cannot use {} '{}'", symbol.kind, name.name),
                    name.span,
                );
                let diagnostic = if symbol.builtin {
                    diagnostic
                } else {
                    diagnostic.with_related(symbol.span, "declared here")
                };
                self.ctx.emit(diagnostic);
            }
        }

        for index in &lval.indices {
            self.visit(index, depth + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Span;
    use crate::frontend::ast::{BinaryOp, Ident, UnaryOp};
    use crate::sema::{AnalyzerConfig, CancellationToken, Diagnostic, Symbol, SymbolKind};
    use pretty_assertions::assert_eq;

    fn lval(name: &str, at: usize) -> Expr {
        let span = Span::new(at, at + name.len());
        Expr::new(ExprKind::LVal(LVal::new(Ident::new(name, span), Vec::new(), span)), span)
    }

    fn binary(left: Expr, right: Expr) -> Expr {
        let span = left.span.merge(right.span);
        Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Add,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    fn check_with(config: &AnalyzerConfig, expr: &Expr) -> Vec<Diagnostic> {
        let token = CancellationToken::new();
        let mut ctx = AnalysisContext::new(config, &token);
        for (name, kind, at) in [("a", SymbolKind::Variable, 0), ("N", SymbolKind::Constant, 2)] {
            let name = ctx.scopes.intern(name);
            let symbol = Symbol::new(name, kind, Span::new(at, at + 1));
            ctx.scopes.declare(ScopeId::GLOBAL, symbol).unwrap();
        }
        ConstExprValidator::check(&mut ctx, ScopeId::GLOBAL, expr).unwrap();
        ctx.finish().1
    }

    fn check(expr: &Expr) -> Vec<Diagnostic> {
        check_with(&AnalyzerConfig::default(), expr)
    }

    #[test]
    fn test_literal_arithmetic_is_constant() {
        let expr = binary(Expr::int(1, Span::new(10, 11)), Expr::int(2, Span::new(14, 15)));
        assert!(check(&expr).is_empty());
    }

    #[test]
    fn test_constant_reference_is_allowed() {
        let expr = binary(lval("N", 10), Expr::int(1, Span::new(14, 15)));
        assert!(check(&expr).is_empty());
    }

    #[test]
    fn test_every_variable_reference_reported() {
        let expr = binary(lval("a", 10), binary(lval("N", 14), lval("a", 18)));
        let diags = check(&expr);
        let spans: Vec<Span> = diags.iter().map(|d| d.span).collect();
        assert_eq!(spans, vec![Span::new(10, 11), Span::new(18, 19)]);
        assert_eq!(diags[0].message, "constant expression cannot use variable 'a'");
        assert_eq!(diags[0].kind, DiagnosticKind::NonConstantInConstExpr);
    }

    #[test]
    fn test_call_is_not_constant() {
        let callee = Ident::new("f", Span::new(10, 11));
        let expr = Expr::new(
            ExprKind::Call {
                callee,
                args: vec![lval("a", 12)],
            },
            Span::new(10, 14),
        );
        let messages: Vec<String> = check(&expr).into_iter().map(|d| d.message).collect();
        assert_eq!(
            messages,
            vec![
                "constant expression cannot call function 'f'",
                "constant expression cannot use variable 'a'",
            ]
        );
    }

    #[test]
    fn test_unresolved_name_left_to_resolver() {
        assert!(check(&lval("missing", 10)).is_empty());
    }

    #[test]
    fn test_depth_bound_reported_once() {
        let mut expr = lval("a", 10);
        for _ in 0..10 {
            let span = expr.span;
            expr = Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(expr),
                },
                span,
            );
        }
        let expr = binary(expr.clone(), expr);

        let config = AnalyzerConfig::default().with_max_const_depth(4);
        let diags = check_with(&config, &expr);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::ConstExprTooDeep);
        assert_eq!(diags[0].message, "constant expression nested deeper than 4 levels");
    }

    #[test]
    fn test_depth_at_bound_is_accepted() {
        let mut expr = Expr::int(1, Span::new(10, 11));
        for _ in 0..3 {
            let span = expr.span;
            expr = Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(expr),
                },
                span,
            );
        }
        let config = AnalyzerConfig::default().with_max_const_depth(3);
        assert!(check_with(&config, &expr).is_empty());
    }
}
