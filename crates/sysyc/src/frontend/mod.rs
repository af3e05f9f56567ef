//! SysY frontend
//!
//! - Lexing source code into tokens
//! - Parsing tokens into a typed AST
//!
//! Semantic checks live in [`crate::sema`] and only ever read the AST.

pub mod ast;
pub mod lexer;
pub mod parser;

use tracing::debug;

use crate::common::CompileResult;

pub use ast::CompUnit;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;

/// File extensions handled by the frontend
pub const EXTENSIONS: &[&str] = &[".sy", ".c"];

/// Parse a whole source file
pub fn parse(source: &str) -> CompileResult<CompUnit> {
    debug!(bytes = source.len(), "parsing");
    let mut parser = Parser::new(source)?;
    let unit = parser.parse()?;
    debug!(items = unit.items.len(), "parsed");
    Ok(unit)
}

/// One token per line, for `--dump-tokens`
pub fn dump_tokens(source: &str) -> CompileResult<String> {
    let tokens = Lexer::new(source).tokenize_all()?;
    let mut output = String::new();
    for token in &tokens {
        output.push_str(&format!("{:?}\n", token));
    }
    Ok(output)
}

/// Pretty-printed AST, for `--dump-ast`
pub fn dump_ast(source: &str) -> CompileResult<String> {
    Ok(format!("{:#?}", parse(source)?))
}
