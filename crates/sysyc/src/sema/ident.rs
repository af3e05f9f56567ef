//! Identifier grammar checks for declared names
//!
//! Names coming out of the parser always satisfy the grammar, but the
//! analyzer also accepts hand-built or generated trees, so every declaration
//! site is checked independently of scoping.

use super::context::{AnalysisContext, AnalysisResult};
use super::diagnostic::{Diagnostic, DiagnosticKind};
use crate::frontend::ast::*;
use crate::frontend::lexer::KEYWORDS;

pub struct IdentifierValidator;

impl IdentifierValidator {
    pub fn validate(ctx: &mut AnalysisContext<'_>, unit: &CompUnit) -> AnalysisResult<()> {
        for item in &unit.items {
            ctx.checkpoint()?;
            match item {
                Item::Decl(decl) => Self::check_decl(ctx, decl),
                Item::Struct(def) => {
                    Self::check(ctx, &def.name, "struct");
                    for field in &def.fields {
                        Self::check(ctx, &field.name, "field");
                    }
                }
                Item::Func(func) => {
                    Self::check(ctx, &func.name, "function");
                    for param in &func.params {
                        Self::check(ctx, &param.name, "parameter");
                    }
                    Self::check_items(ctx, &func.body.items)?;
                }
            }
        }
        Ok(())
    }

    fn check_items(ctx: &mut AnalysisContext<'_>, items: &[BlockItem]) -> AnalysisResult<()> {
        for item in items {
            ctx.checkpoint()?;
            match item {
                BlockItem::Decl(decl) => Self::check_decl(ctx, decl),
                BlockItem::Stmt(stmt) => Self::check_stmt(ctx, stmt)?,
            }
        }
        Ok(())
    }

    fn check_stmt(ctx: &mut AnalysisContext<'_>, stmt: &Stmt) -> AnalysisResult<()> {
        match &stmt.kind {
            StmtKind::Block(block) => Self::check_items(ctx, &block.items),
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                Self::check_stmt(ctx, then_branch)?;
                match else_branch {
                    Some(else_branch) => Self::check_stmt(ctx, else_branch),
                    None => Ok(()),
                }
            }
            StmtKind::While { body, .. } => Self::check_stmt(ctx, body),
            _ => Ok(()),
        }
    }

    fn check_decl(ctx: &mut AnalysisContext<'_>, decl: &Decl) {
        match decl {
            Decl::Var(var) => {
                for def in &var.defs {
                    Self::check(ctx, &def.name, "variable");
                }
            }
            Decl::Const(c) => {
                for def in &c.defs {
                    Self::check(ctx, &def.name, "constant");
                }
            }
        }
    }

    fn check(ctx: &mut AnalysisContext<'_>, ident: &Ident, category: &str) {
        let problem = if !is_valid_identifier(&ident.name) {
            "is not a valid identifier"
        } else if KEYWORDS.contains(&ident.name.as_str()) {
            "is a reserved keyword"
        } else {
            return;
        };

        ctx.emit(Diagnostic::new(
            DiagnosticKind::InvalidIdentifier,
            format!("{} name '{}' {}", category, ident.name, problem),
            ident.span,
        ));
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Span;
    use crate::sema::{AnalyzerConfig, CancellationToken};
    use pretty_assertions::assert_eq;

    fn ident(name: &str, start: usize) -> Ident {
        Ident::new(name, Span::new(start, start + name.len()))
    }

    fn var_decl(names: &[(&str, usize)]) -> Decl {
        let defs = names
            .iter()
            .map(|(name, at)| VarDef::new(ident(name, *at), Vec::new(), Span::new(*at, at + name.len())))
            .collect();
        Decl::Var(VarDecl {
            ty: TypeSpec::int(Span::new(0, 3)),
            defs,
            span: Span::new(0, 40),
        })
    }

    fn run(unit: &CompUnit) -> Vec<String> {
        let config = AnalyzerConfig::default();
        let token = CancellationToken::new();
        let mut ctx = AnalysisContext::new(&config, &token);
        IdentifierValidator::validate(&mut ctx, unit).unwrap();
        let (_, diagnostics) = ctx.finish();
        diagnostics.into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_identifier_grammar() {
        assert!(is_valid_identifier("a"));
        assert!(is_valid_identifier("_tmp1"));
        assert!(is_valid_identifier("Point_2D"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1abc"));
        assert!(!is_valid_identifier("a-b"));
        assert!(!is_valid_identifier("naïve"));
    }

    #[test]
    fn test_invalid_global_names() {
        let unit = CompUnit::new(vec![Item::Decl(var_decl(&[("ok", 4), ("2bad", 8), ("while", 14)]))]);
        assert_eq!(
            run(&unit),
            vec![
                "variable name '2bad' is not a valid identifier",
                "variable name 'while' is a reserved keyword",
            ]
        );
    }

    #[test]
    fn test_function_and_parameter_categories() {
        let func = FuncDef {
            id: NodeId(0),
            return_type: TypeSpec::int(Span::new(0, 3)),
            name: ident("my-func", 4),
            params: vec![FuncParam {
                ty: TypeSpec::int(Span::new(12, 15)),
                name: ident("9p", 16),
                array: None,
                span: Span::new(12, 18),
            }],
            body: Block {
                id: NodeId(1),
                items: vec![BlockItem::Decl(var_decl(&[("x y", 22)]))],
                span: Span::new(20, 30),
            },
            span: Span::new(0, 30),
        };
        let unit = CompUnit::new(vec![Item::Func(func)]);
        assert_eq!(
            run(&unit),
            vec![
                "function name 'my-func' is not a valid identifier",
                "parameter name '9p' is not a valid identifier",
                "variable name 'x y' is not a valid identifier",
            ]
        );
    }

    #[test]
    fn test_parsed_program_is_clean() {
        let unit = crate::frontend::parser::Parser::new("struct P { int a; }; int f(int x) { const int k = 1; { int y; } return x; }")
            .unwrap()
            .parse()
            .unwrap();
        assert!(run(&unit).is_empty());
    }
}
