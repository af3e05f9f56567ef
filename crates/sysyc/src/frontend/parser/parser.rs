//! Recursive descent parser for SysY

use crate::common::{CompileError, CompileResult, Span};
use crate::frontend::ast::*;
use crate::frontend::lexer::{Lexer, Token, TokenKind};

/// Recursive descent parser for SysY
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    prev_span: Span,
    next_node_id: u32,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given source
    pub fn new(source: &'a str) -> CompileResult<Self> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            prev_span: Span::default(),
            next_node_id: 0,
        })
    }

    /// Parse a complete compilation unit
    pub fn parse(&mut self) -> CompileResult<CompUnit> {
        let mut items = Vec::new();

        while !self.at_end() {
            items.push(self.parse_item()?);
        }

        Ok(CompUnit::new(items))
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn at_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> CompileResult<Token> {
        let prev = std::mem::replace(&mut self.current, self.lexer.next_token()?);
        self.prev_span = prev.span;
        Ok(prev)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> CompileResult<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(&kind) {
            self.advance()
        } else {
            Err(CompileError::parser(
                format!("expected {}, found {}", kind, self.current.kind),
                self.current.span,
            ))
        }
    }

    fn expect_ident(&mut self) -> CompileResult<Ident> {
        if let TokenKind::Identifier(name) = &self.current.kind {
            let ident = Ident::new(name.clone(), self.current.span);
            self.advance()?;
            Ok(ident)
        } else {
            Err(CompileError::parser(
                format!("expected identifier, found {}", self.current.kind),
                self.current.span,
            ))
        }
    }

    /// Span from `start` to the end of the last consumed token
    fn span_from(&self, start: Span) -> Span {
        start.merge(self.prev_span)
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    // =========================================================================
    // Top-level items
    // =========================================================================

    fn parse_item(&mut self) -> CompileResult<Item> {
        let start_span = self.current.span;

        if self.check(&TokenKind::Const) {
            return Ok(Item::Decl(Decl::Const(self.parse_const_decl()?)));
        }

        let ty = self.parse_type_spec(true)?;

        // struct Name { ... };
        if self.check(&TokenKind::LBrace) {
            if let TypeKind::Struct(name) = ty.kind {
                return Ok(Item::Struct(self.parse_struct_body(name, start_span)?));
            }
            return Err(CompileError::parser(
                format!("expected identifier, found {}", self.current.kind),
                self.current.span,
            ));
        }

        let name = self.expect_ident()?;

        if self.check(&TokenKind::LParen) {
            return Ok(Item::Func(self.parse_function_rest(ty, name, start_span)?));
        }

        if matches!(ty.kind, TypeKind::Void) {
            return Err(CompileError::parser(
                format!("variable '{}' declared void", name.name),
                name.span,
            ));
        }

        Ok(Item::Decl(Decl::Var(self.parse_var_decl_rest(ty, name, start_span)?)))
    }

    /// Parse `int`, `float`, `char`, `struct Name` and, when allowed, `void`
    fn parse_type_spec(&mut self, allow_void: bool) -> CompileResult<TypeSpec> {
        let start_span = self.current.span;
        let kind = match &self.current.kind {
            TokenKind::Int => TypeKind::Int,
            TokenKind::Float => TypeKind::Float,
            TokenKind::Char => TypeKind::Char,
            TokenKind::Void if allow_void => TypeKind::Void,
            TokenKind::Struct => {
                self.advance()?;
                let name = self.expect_ident()?;
                return Ok(TypeSpec::new(TypeKind::Struct(name), self.span_from(start_span)));
            }
            other => {
                return Err(CompileError::parser(
                    format!("expected type, found {}", other),
                    start_span,
                ));
            }
        };
        self.advance()?;
        Ok(TypeSpec::new(kind, start_span))
    }

    fn parse_struct_body(&mut self, name: Ident, start_span: Span) -> CompileResult<StructDef> {
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let field_start = self.current.span;
            let ty = self.parse_type_spec(false)?;
            loop {
                let name = self.expect_ident()?;
                let dimensions = self.parse_dimensions()?;
                fields.push(StructField {
                    ty: ty.clone(),
                    name,
                    dimensions,
                    span: self.span_from(field_start),
                });
                if !self.match_token(&TokenKind::Comma)? {
                    break;
                }
            }
            self.expect(TokenKind::Semi)?;
        }

        self.expect(TokenKind::RBrace)?;
        self.expect(TokenKind::Semi)?;

        Ok(StructDef {
            name,
            fields,
            span: self.span_from(start_span),
        })
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_decl(&mut self) -> CompileResult<Decl> {
        if self.check(&TokenKind::Const) {
            return Ok(Decl::Const(self.parse_const_decl()?));
        }

        let start_span = self.current.span;
        let ty = self.parse_type_spec(false)?;
        if self.check(&TokenKind::LBrace) {
            return Err(CompileError::parser(
                "struct definitions are only allowed at file scope",
                self.current.span,
            ));
        }
        let name = self.expect_ident()?;
        Ok(Decl::Var(self.parse_var_decl_rest(ty, name, start_span)?))
    }

    fn parse_const_decl(&mut self) -> CompileResult<ConstDecl> {
        let start_span = self.current.span;
        self.expect(TokenKind::Const)?;
        let ty = self.parse_type_spec(false)?;

        let mut defs = Vec::new();
        loop {
            let name = self.expect_ident()?;
            let def_start = name.span;
            let dimensions = self.parse_dimensions()?;
            self.expect(TokenKind::Eq)?;
            let init = self.parse_init_val()?;
            defs.push(ConstDef {
                name,
                dimensions,
                init,
                span: self.span_from(def_start),
            });

            if !self.match_token(&TokenKind::Comma)? {
                break;
            }
        }

        self.expect(TokenKind::Semi)?;
        Ok(ConstDecl {
            ty,
            defs,
            span: self.span_from(start_span),
        })
    }

    /// Parse the declarators of a variable declaration after its first name
    fn parse_var_decl_rest(
        &mut self,
        ty: TypeSpec,
        first: Ident,
        start_span: Span,
    ) -> CompileResult<VarDecl> {
        let mut defs = Vec::new();
        let mut name = first;

        loop {
            let def_start = name.span;
            let dimensions = self.parse_dimensions()?;
            let mut def = VarDef::new(name, dimensions, def_start);
            if self.match_token(&TokenKind::Eq)? {
                def = def.with_init(self.parse_init_val()?);
            }
            def.span = self.span_from(def_start);
            defs.push(def);

            if !self.match_token(&TokenKind::Comma)? {
                break;
            }
            name = self.expect_ident()?;
        }

        self.expect(TokenKind::Semi)?;
        Ok(VarDecl {
            ty,
            defs,
            span: self.span_from(start_span),
        })
    }

    /// Parse `{ '[' Exp ']' }`
    fn parse_dimensions(&mut self) -> CompileResult<Vec<Expr>> {
        let mut dimensions = Vec::new();
        while self.match_token(&TokenKind::LBracket)? {
            dimensions.push(self.parse_expression()?);
            self.expect(TokenKind::RBracket)?;
        }
        Ok(dimensions)
    }

    fn parse_init_val(&mut self) -> CompileResult<InitVal> {
        if !self.check(&TokenKind::LBrace) {
            return Ok(InitVal::Expr(self.parse_expression()?));
        }

        let start_span = self.current.span;
        self.advance()?;
        let mut items = Vec::new();

        if !self.check(&TokenKind::RBrace) {
            loop {
                items.push(self.parse_init_val()?);
                if !self.match_token(&TokenKind::Comma)? {
                    break;
                }
            }
        }

        self.expect(TokenKind::RBrace)?;
        Ok(InitVal::List(items, self.span_from(start_span)))
    }

    // =========================================================================
    // Functions
    // =========================================================================

    fn parse_function_rest(
        &mut self,
        return_type: TypeSpec,
        name: Ident,
        start_span: Span,
    ) -> CompileResult<FuncDef> {
        let id = self.fresh_id();
        self.expect(TokenKind::LParen)?;

        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.parse_param()?);
                if !self.match_token(&TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let body = self.parse_block()?;
        Ok(FuncDef {
            id,
            return_type,
            name,
            params,
            body,
            span: self.span_from(start_span),
        })
    }

    fn parse_param(&mut self) -> CompileResult<FuncParam> {
        let start_span = self.current.span;
        let ty = self.parse_type_spec(false)?;
        let name = self.expect_ident()?;

        let array = if self.match_token(&TokenKind::LBracket)? {
            self.expect(TokenKind::RBracket)?;
            Some(self.parse_dimensions()?)
        } else {
            None
        };

        Ok(FuncParam {
            ty,
            name,
            array,
            span: self.span_from(start_span),
        })
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_block(&mut self) -> CompileResult<Block> {
        let start_span = self.current.span;
        let id = self.fresh_id();
        self.expect(TokenKind::LBrace)?;

        let mut items = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.current.kind.can_start_declaration() {
                items.push(BlockItem::Decl(self.parse_decl()?));
            } else {
                items.push(BlockItem::Stmt(self.parse_statement()?));
            }
        }

        self.expect(TokenKind::RBrace)?;
        Ok(Block::new(id, items, self.span_from(start_span)))
    }

    fn parse_statement(&mut self) -> CompileResult<Stmt> {
        let start_span = self.current.span;

        let kind = match &self.current.kind {
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),

            TokenKind::If => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let condition = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                let then_branch = Box::new(self.parse_statement()?);
                let else_branch = if self.match_token(&TokenKind::Else)? {
                    Some(Box::new(self.parse_statement()?))
                } else {
                    None
                };
                StmtKind::If {
                    condition,
                    then_branch,
                    else_branch,
                }
            }

            TokenKind::While => {
                self.advance()?;
                self.expect(TokenKind::LParen)?;
                let condition = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                let body = Box::new(self.parse_statement()?);
                StmtKind::While { condition, body }
            }

            TokenKind::Break => {
                self.advance()?;
                self.expect(TokenKind::Semi)?;
                StmtKind::Break
            }

            TokenKind::Continue => {
                self.advance()?;
                self.expect(TokenKind::Semi)?;
                StmtKind::Continue
            }

            TokenKind::Return => {
                self.advance()?;
                let value = if self.check(&TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect(TokenKind::Semi)?;
                StmtKind::Return(value)
            }

            TokenKind::Semi => {
                self.advance()?;
                StmtKind::Expr(None)
            }

            _ => {
                let expr = self.parse_expression()?;
                if self.check(&TokenKind::Eq) {
                    let eq_span = self.current.span;
                    self.advance()?;
                    let ExprKind::LVal(target) = expr.kind else {
                        return Err(CompileError::parser(
                            "left-hand side of assignment must be a variable or array element",
                            eq_span,
                        ));
                    };
                    let value = self.parse_expression()?;
                    self.expect(TokenKind::Semi)?;
                    StmtKind::Assign { target, value }
                } else {
                    self.expect(TokenKind::Semi)?;
                    StmtKind::Expr(Some(expr))
                }
            }
        };

        Ok(Stmt::new(kind, self.span_from(start_span)))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression(&mut self) -> CompileResult<Expr> {
        self.parse_logical_or_expression()
    }

    fn parse_logical_or_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_logical_and_expression()?;

        while self.match_token(&TokenKind::PipePipe)? {
            let right = self.parse_logical_and_expression()?;
            left = Self::binary(BinaryOp::LogOr, left, right);
        }

        Ok(left)
    }

    fn parse_logical_and_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_equality_expression()?;

        while self.match_token(&TokenKind::AmpAmp)? {
            let right = self.parse_equality_expression()?;
            left = Self::binary(BinaryOp::LogAnd, left, right);
        }

        Ok(left)
    }

    fn parse_equality_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_relational_expression()?;

        loop {
            let op = match self.current.kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_relational_expression()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_relational_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_additive_expression()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::Le,
                TokenKind::GtEq => BinaryOp::Ge,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_additive_expression()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_additive_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_multiplicative_expression()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_multiplicative_expression()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_unary_expression()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance()?;
            let right = self.parse_unary_expression()?;
            left = Self::binary(op, left, right);
        }

        Ok(left)
    }

    fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        let span = left.span.merge(right.span);
        Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    fn parse_unary_expression(&mut self) -> CompileResult<Expr> {
        let start_span = self.current.span;

        let op = match self.current.kind {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };

        if let Some(op) = op {
            self.advance()?;
            let operand = self.parse_unary_expression()?;
            let span = start_span.merge(operand.span);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }

        self.parse_primary_expression()
    }

    fn parse_primary_expression(&mut self) -> CompileResult<Expr> {
        let start_span = self.current.span;

        match &self.current.kind {
            TokenKind::IntLiteral(text) | TokenKind::HexLiteral(text) => {
                let value = parse_int_literal(text).ok_or_else(|| {
                    CompileError::parser(
                        format!("integer literal '{}' out of range", text),
                        start_span,
                    )
                })?;
                self.advance()?;
                Ok(Expr::int(value, start_span))
            }

            TokenKind::FloatLiteral(text) => {
                let value: f64 = text.parse().map_err(|_| {
                    CompileError::parser(format!("invalid float literal '{}'", text), start_span)
                })?;
                self.advance()?;
                Ok(Expr::new(ExprKind::FloatLiteral(value), start_span))
            }

            TokenKind::StringLiteral(text) => {
                let value = text.trim_matches('"').to_string();
                self.advance()?;
                Ok(Expr::new(ExprKind::StringLiteral(value), start_span))
            }

            TokenKind::Identifier(_) => {
                let name = self.expect_ident()?;

                if self.match_token(&TokenKind::LParen)? {
                    let mut args = Vec::new();
                    if !self.check(&TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expression()?);
                            if !self.match_token(&TokenKind::Comma)? {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                    return Ok(Expr::new(
                        ExprKind::Call { callee: name, args },
                        self.span_from(start_span),
                    ));
                }

                let indices = self.parse_dimensions()?;
                let span = self.span_from(start_span);
                Ok(Expr::new(ExprKind::LVal(LVal::new(name, indices, span)), span))
            }

            TokenKind::LParen => {
                self.advance()?;
                let mut expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                expr.span = self.span_from(start_span);
                Ok(expr)
            }

            other => Err(CompileError::parser(
                format!("expected expression, found {}", other),
                start_span,
            )),
        }
    }
}

/// Parse a decimal, octal (leading `0`) or hexadecimal (`0x`) literal
fn parse_int_literal(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else if text.len() > 1 && text.starts_with('0') {
        i64::from_str_radix(&text[1..], 8).ok()
    } else {
        text.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> CompUnit {
        Parser::new(source).unwrap().parse().unwrap()
    }

    #[test]
    fn test_parse_simple_function() {
        let unit = parse("int main() { return 0; }");

        assert_eq!(unit.items.len(), 1);
        let func = unit.functions().next().unwrap();
        assert_eq!(func.name.name, "main");
        assert!(func.params.is_empty());
        assert_eq!(func.body.items.len(), 1);
    }

    #[test]
    fn test_parse_multiple_declarators() {
        let unit = parse("int a, b[2][3] = {{1, 2, 3}, {4, 5, 6}}, c = 4;");

        let Some(Decl::Var(var)) = unit.declarations().next() else {
            panic!("expected variable declaration");
        };
        let names: Vec<&str> = var.defs.iter().map(|d| d.name.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(var.defs[1].dimensions.len(), 2);
        assert_eq!(var.defs[1].init.as_ref().unwrap().exprs().len(), 6);
        assert!(var.defs[0].init.is_none());
    }

    #[test]
    fn test_parse_const_decl() {
        let unit = parse("const int N = 10, M[2] = {1, 2};");

        let Some(Decl::Const(c)) = unit.declarations().next() else {
            panic!("expected const declaration");
        };
        assert_eq!(c.defs.len(), 2);
        assert!(matches!(c.defs[0].init, InitVal::Expr(_)));
        assert!(matches!(c.defs[1].init, InitVal::List(ref items, _) if items.len() == 2));
    }

    #[test]
    fn test_parse_struct_definition() {
        let unit = parse("struct P { int age, height; float w[3]; };");

        let def = unit.structs().next().unwrap();
        assert_eq!(def.name.name, "P");
        let fields: Vec<&str> = def.fields.iter().map(|f| f.name.name.as_str()).collect();
        assert_eq!(fields, vec!["age", "height", "w"]);
        assert_eq!(def.fields[2].dimensions.len(), 1);
    }

    #[test]
    fn test_parse_struct_typed_variable() {
        let unit = parse("struct P { int x; }; struct P p;");

        let Some(Decl::Var(var)) = unit.declarations().next() else {
            panic!("expected variable declaration");
        };
        assert_eq!(var.ty.struct_name().map(|n| n.name.as_str()), Some("P"));
    }

    #[test]
    fn test_parse_array_params() {
        let unit = parse("void f(int a, int b[], int c[][4]) { }");

        let func = unit.functions().next().unwrap();
        assert!(!func.params[0].is_array());
        assert_eq!(func.params[1].array.as_ref().map(Vec::len), Some(0));
        assert_eq!(func.params[2].array.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_parse_statements() {
        let source = "int f(int x) {
            int i = 0;
            while (i < x) {
                if (i % 2 == 0) i = i + 1; else { i = i + 2; }
                if (!x) break;
                continue;
            }
            ;
            putint(i);
            return i;
        }";
        let unit = parse(source);
        let func = unit.functions().next().unwrap();
        assert_eq!(func.body.items.len(), 5);
    }

    #[test]
    fn test_node_ids_are_unique() {
        let unit = parse("void f() { { } { { } } } void g() { }");
        let f = unit.functions().next().unwrap();
        let g = unit.functions().nth(1).unwrap();
        let mut ids = vec![f.id, f.body.id, g.id, g.body.id];
        for item in &f.body.items {
            if let BlockItem::Stmt(Stmt { kind: StmtKind::Block(b), .. }) = item {
                ids.push(b.id);
            }
        }
        let count = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_expression_precedence() {
        let unit = parse("int x = 1 + 2 * 3;");
        let Some(Decl::Var(var)) = unit.declarations().next() else {
            panic!("expected variable declaration");
        };
        let Some(InitVal::Expr(expr)) = &var.defs[0].init else {
            panic!("expected scalar initializer");
        };
        let ExprKind::Binary { op, right, .. } = &expr.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_int_literal_radixes() {
        assert_eq!(parse_int_literal("42"), Some(42));
        assert_eq!(parse_int_literal("0"), Some(0));
        assert_eq!(parse_int_literal("017"), Some(15));
        assert_eq!(parse_int_literal("0x1F"), Some(31));
        assert_eq!(parse_int_literal("99999999999999999999"), None);
    }

    #[test]
    fn test_rejects_invalid_assignment_target() {
        let mut parser = Parser::new("void f() { 1 = 2; }").unwrap();
        assert!(matches!(parser.parse(), Err(CompileError::Parser { .. })));
    }

    #[test]
    fn test_rejects_local_struct_definition() {
        let mut parser = Parser::new("void f() { struct P { int x; }; }").unwrap();
        assert!(matches!(parser.parse(), Err(CompileError::Parser { .. })));
    }

    #[test]
    fn test_ident_spans() {
        let unit = parse("int abc;");
        let Some(Decl::Var(var)) = unit.declarations().next() else {
            panic!("expected variable declaration");
        };
        assert_eq!(var.defs[0].name.span, Span::new(4, 7));
        assert_eq!(var.span, Span::new(0, 8));
    }
}
