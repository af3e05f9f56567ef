//! Semantic analyzer for SysY
//!
//! Runs the passes over one compilation unit:
//! - Scope building and duplicate detection
//! - Identifier grammar checks
//! - Reference resolution with dimension and constant-expression checks
//! - Usage lints
//!
//! Findings never stop the analysis. The only way a run fails is
//! cancellation, in which case no diagnostics are produced at all.

use tracing::{debug, debug_span};

use super::builder::ScopeBuilder;
use super::config::AnalyzerConfig;
use super::context::{AnalysisContext, AnalysisResult, CancellationToken};
use super::diagnostic::Diagnostic;
use super::ident::IdentifierValidator;
use super::lints;
use super::resolver::ReferenceResolver;
use super::scope::ScopeTree;
use crate::frontend::ast::CompUnit;

/// Result of a completed run
#[derive(Debug)]
pub struct Analysis {
    pub scopes: ScopeTree,
    /// Sorted by source position
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Semantic analyzer
#[derive(Debug, Clone, Default)]
pub struct SemanticAnalyzer {
    config: AnalyzerConfig,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Analyze a compilation unit and return its diagnostics in source order
    pub fn analyze(&self, unit: &CompUnit) -> Vec<Diagnostic> {
        let token = CancellationToken::new();
        // A token nobody else holds cannot be cancelled
        self.analyze_with(unit, &token).unwrap_or_default()
    }

    /// Analyze a compilation unit, giving up as soon as `cancel` is set
    pub fn analyze_with(&self, unit: &CompUnit, cancel: &CancellationToken) -> AnalysisResult<Vec<Diagnostic>> {
        self.run(unit, cancel).map(|analysis| analysis.diagnostics)
    }

    /// Like [`analyze_with`](Self::analyze_with) but also hands back the scope tree
    pub fn run(&self, unit: &CompUnit, cancel: &CancellationToken) -> AnalysisResult<Analysis> {
        let _span = debug_span!("analyze", items = unit.items.len()).entered();
        let mut ctx = AnalysisContext::new(&self.config, cancel);
        ctx.ensure_not_cancelled()?;

        ScopeBuilder::build(&mut ctx, unit)?;
        IdentifierValidator::validate(&mut ctx, unit)?;
        ReferenceResolver::resolve(&mut ctx, unit)?;
        lints::check_unused(&mut ctx);

        ctx.ensure_not_cancelled()?;
        let (scopes, diagnostics) = ctx.finish();
        debug!(
            symbols = scopes.symbols().count(),
            diagnostics = diagnostics.len(),
            "analysis finished"
        );
        Ok(Analysis { scopes, diagnostics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Span;
    use crate::frontend::parser::Parser;
    use crate::sema::{
        AnalysisError, DiagnosticKind, DimensionPolicy, Severity, ShadowingPolicy, SymbolKind,
    };
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> CompUnit {
        Parser::new(source).unwrap().parse().unwrap()
    }

    fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
        diagnostics.iter().map(|d| d.kind).collect()
    }

    fn analyze(source: &str) -> Vec<Diagnostic> {
        SemanticAnalyzer::new().analyze(&parse(source))
    }

    #[test]
    fn test_duplicate_global() {
        let diags = analyze("int a; int a;");
        assert_eq!(kinds(&diags), vec![DiagnosticKind::DuplicateSymbol]);
        assert!(diags[0].message.contains("'a'"));
        assert_eq!(diags[0].span, Span::new(11, 12));
    }

    #[test]
    fn test_undefined_in_main() {
        let diags = analyze("int main() { b = 5; }");
        assert_eq!(kinds(&diags), vec![DiagnosticKind::UndefinedSymbol]);
        assert!(diags[0].message.contains("'b'"));
    }

    #[test]
    fn test_dimension_mismatch_names_both_counts() {
        let diags = analyze("int arr[3]; void f() { arr[1][2]; }");
        assert_eq!(kinds(&diags), vec![DiagnosticKind::DimensionMismatch]);
        assert_eq!(diags[0].message, "'arr' is used with 2 subscripts but declared with 1 dimension");
    }

    #[test]
    fn test_constant_dimension_under_both_policies() {
        let unit = parse("const int N = 5; int arr[N];");

        let strict = SemanticAnalyzer::new().analyze(&unit);
        assert_eq!(kinds(&strict), vec![DiagnosticKind::NonConstantDimension]);

        let config = AnalyzerConfig::default().with_dimensions(DimensionPolicy::ConstantExpression);
        assert!(SemanticAnalyzer::with_config(config).analyze(&unit).is_empty());
    }

    #[test]
    fn test_duplicate_struct_field() {
        let diags = analyze("struct P { int age; int age; };");
        assert_eq!(kinds(&diags), vec![DiagnosticKind::DuplicateSymbol]);
        assert_eq!(diags[0].message, "duplicate field name 'age' in struct 'P'");
    }

    #[test]
    fn test_non_constant_initializer() {
        let diags = analyze("int a; const int X = a;");
        assert_eq!(kinds(&diags), vec![DiagnosticKind::NonConstantInConstExpr]);
        assert!(diags[0].message.contains("'a'"));
    }

    #[test]
    fn test_undefined_reference_has_no_dimension_check() {
        let diags = analyze("void f() { ghost[1][2] = 3; }");
        assert_eq!(kinds(&diags), vec![DiagnosticKind::UndefinedSymbol]);
    }

    #[test]
    fn test_const_depth_bound_through_analyzer() {
        let unit = parse("const int X = 1 + 2 + 3 + 4 + 5 + 6 + 7 + 8 + 9 + 10 + 11; int main() { return X; }");
        let config = AnalyzerConfig::default().with_max_const_depth(4);
        let diags = SemanticAnalyzer::with_config(config).analyze(&unit);
        assert_eq!(kinds(&diags), vec![DiagnosticKind::ConstExprTooDeep]);
        assert_eq!(diags[0].message, "constant expression nested deeper than 4 levels");
    }

    #[test]
    fn test_long_operator_chains() {
        let terms = vec!["1"; 50_000].join(" + ");
        let unit = parse(&format!("const int X = {};", terms));
        let diags = SemanticAnalyzer::new().analyze(&unit);
        // Dropping the tree recurses once per nesting level
        std::mem::forget(unit);
        assert_eq!(kinds(&diags), vec![DiagnosticKind::ConstExprTooDeep]);

        let terms = vec!["a"; 50_000].join(" + ");
        let unit = parse(&format!("int a; int main() {{ return {}; }}", terms));
        let diags = SemanticAnalyzer::new().analyze(&unit);
        std::mem::forget(unit);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let unit = parse(
            "int a; int a; struct P { int x; int x; }; \
             int main() { int arr[2]; arr[0][1] = b; const int K = arr[0]; return -!-!0; }",
        );
        let analyzer = SemanticAnalyzer::new();
        let first = analyzer.analyze(&unit);
        let second = analyzer.analyze(&unit);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_diagnostics_sorted_by_position() {
        let diags = analyze("void f() { x = 1; } int g; int g; void h() { y = 2; }");
        let starts: Vec<usize> = diags.iter().map(|d| d.span.start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
        assert_eq!(diags.len(), 3);
    }

    #[test]
    fn test_shadowing_policies() {
        let unit = parse("int x; int main() { int x; x = 1; return x; }");
        assert!(SemanticAnalyzer::new().analyze(&unit).is_empty());

        let config = AnalyzerConfig::default().with_shadowing(ShadowingPolicy::Forbid);
        let diags = SemanticAnalyzer::with_config(config).analyze(&unit);
        assert_eq!(kinds(&diags), vec![DiagnosticKind::DuplicateSymbol]);
    }

    #[test]
    fn test_local_resolves_to_nearest_symbol() {
        let unit = parse("int x[3]; int main() { int x; return x; }");
        let analysis = SemanticAnalyzer::new().run(&unit, &CancellationToken::new()).unwrap();
        assert!(analysis.diagnostics.is_empty());

        let main = unit.functions().next().unwrap();
        let scope = analysis.scopes.scope_of(main.body.id).unwrap();
        let id = analysis.scopes.lookup(scope, "x", 40).unwrap();
        assert!(!analysis.scopes.is_global(id));
        assert_eq!(analysis.scopes.symbol(id).kind, SymbolKind::Variable);
    }

    #[test]
    fn test_cancelled_run_yields_nothing() {
        let unit = parse("int a; int a;");
        let token = CancellationToken::new();
        token.cancel();
        let outcome = SemanticAnalyzer::new().analyze_with(&unit, &token);
        assert_eq!(outcome, Err(AnalysisError::Cancelled));
    }

    #[test]
    fn test_unused_variable_warnings() {
        let source = "int g; int used; \
                      int main() { int a; int b = 1; int c; int d; c = 2; d = used; return d; }";
        let unit = parse(source);

        assert!(SemanticAnalyzer::new().analyze(&unit).is_empty());

        let config = AnalyzerConfig::default().with_warn_unused(true);
        let diags = SemanticAnalyzer::with_config(config).analyze(&unit);
        let messages: Vec<&str> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "global variable 'g' is declared but never used",
                "variable 'a' is declared but never used",
                "variable 'b' is initialized but never used",
                "variable 'c' is assigned but never read",
            ]
        );
        assert!(diags.iter().all(|d| d.severity == Severity::Warning));
    }

    #[test]
    fn test_warnings_are_not_errors() {
        let unit = parse("int main() { return !!1; }");
        let analysis = SemanticAnalyzer::new().run(&unit, &CancellationToken::new()).unwrap();
        assert_eq!(kinds(&analysis.diagnostics), vec![DiagnosticKind::SuspiciousUnary]);
        assert!(!analysis.has_errors());
    }
}
