//! Lexer module for tokenizing SysY source code

mod token;
mod scanner;

pub use token::{Token, TokenKind, KEYWORDS};
pub use scanner::Lexer;
