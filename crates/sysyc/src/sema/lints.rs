//! Usage lints: unused variables and suspicious unary chains
//!
//! Both produce warnings and are controlled by [`AnalyzerConfig`](super::AnalyzerConfig).

use super::context::AnalysisContext;
use super::diagnostic::{Diagnostic, DiagnosticKind};
use super::symbol::SymbolKind;
use crate::frontend::ast::{Expr, ExprKind, UnaryOp};

/// Report every variable that is never read
///
/// Runs after resolution, when the read/write counts are complete.
pub fn check_unused(ctx: &mut AnalysisContext<'_>) {
    if !ctx.config.warn_unused {
        return;
    }

    let mut findings = Vec::new();
    for (id, symbol) in ctx.scopes.symbols() {
        if symbol.kind != SymbolKind::Variable || symbol.builtin {
            continue;
        }
        let usage = ctx.usage(id);
        if usage.reads > 0 {
            continue;
        }

        let what = if ctx.scopes.is_global(id) { "global variable" } else { "variable" };
        let state = if usage.writes > 0 {
            "is assigned but never read"
        } else if symbol.has_initializer {
            "is initialized but never used"
        } else {
            "is declared but never used"
        };
        findings.push(Diagnostic::new(
            DiagnosticKind::UnusedVariable,
            format!("{} '{}' {}", what, ctx.scopes.symbol_name(id), state),
            symbol.span,
        ));
    }

    for diagnostic in findings {
        ctx.emit(diagnostic);
    }
}

/// Check the unary chain starting at `expr`
///
/// Called once per chain, on its outermost operator. Returns the first
/// operand that is not a unary expression.
pub fn check_unary_chain<'e>(ctx: &mut AnalysisContext<'_>, expr: &'e Expr) -> &'e Expr {
    let mut ops: Vec<UnaryOp> = Vec::new();
    let mut current = expr;
    while let ExprKind::Unary { op, operand } = &current.kind {
        ops.push(*op);
        current = operand.as_ref();
    }

    let Some(limit) = ctx.config.unary_chain_limit else {
        return current;
    };

    if ops.len() > limit {
        ctx.emit(Diagnostic::new(
            DiagnosticKind::SuspiciousUnary,
            format!("chain of {} unary operators (more than {})", ops.len(), limit),
            expr.span,
        ));
    } else if let Some(pair) = ops.windows(2).find(|pair| pair[0] == pair[1]) {
        ctx.emit(Diagnostic::new(
            DiagnosticKind::SuspiciousUnary,
            format!("unary operator '{}' applied twice in a row", pair[0].as_str()),
            expr.span,
        ));
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Span;
    use crate::sema::{AnalyzerConfig, CancellationToken};
    use pretty_assertions::assert_eq;

    fn chain(ops: &[UnaryOp]) -> Expr {
        let mut expr = Expr::int(1, Span::new(ops.len(), ops.len() + 1));
        for (i, op) in ops.iter().enumerate().rev() {
            expr = Expr::new(
                ExprKind::Unary {
                    op: *op,
                    operand: Box::new(expr),
                },
                Span::new(i, ops.len() + 1),
            );
        }
        expr
    }

    fn lint(config: &AnalyzerConfig, expr: &Expr) -> Vec<String> {
        let token = CancellationToken::new();
        let mut ctx = AnalysisContext::new(config, &token);
        let operand = check_unary_chain(&mut ctx, expr);
        assert!(operand.is_int_literal());
        ctx.finish().1.into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_mixed_short_chain_is_fine() {
        let expr = chain(&[UnaryOp::Neg, UnaryOp::Not, UnaryOp::Neg]);
        assert!(lint(&AnalyzerConfig::default(), &expr).is_empty());
    }

    #[test]
    fn test_doubled_operator() {
        let expr = chain(&[UnaryOp::Not, UnaryOp::Not]);
        assert_eq!(
            lint(&AnalyzerConfig::default(), &expr),
            vec!["unary operator '!' applied twice in a row"]
        );
    }

    #[test]
    fn test_long_chain_reported_once() {
        let expr = chain(&[UnaryOp::Neg, UnaryOp::Plus, UnaryOp::Neg, UnaryOp::Plus]);
        assert_eq!(
            lint(&AnalyzerConfig::default(), &expr),
            vec!["chain of 4 unary operators (more than 3)"]
        );
    }

    #[test]
    fn test_disabled() {
        let config = AnalyzerConfig::default().with_unary_chain_limit(None);
        let expr = chain(&[UnaryOp::Neg, UnaryOp::Neg, UnaryOp::Neg, UnaryOp::Neg, UnaryOp::Neg]);
        assert!(lint(&config, &expr).is_empty());
    }
}
