//! Parser module building the SysY AST

mod parser;

pub use parser::Parser;
