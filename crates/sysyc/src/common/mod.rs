//! Common infrastructure shared by the frontend and the analyzer

mod error;
mod span;

pub use error::{CompileError, CompileResult, DiagnosticReporter};
pub use span::Span;
