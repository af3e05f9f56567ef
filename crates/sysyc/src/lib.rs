//! SysY semantic checker
//!
//! Parses programs written in the SysY teaching language (a C subset) and
//! reports static-semantic problems without generating code.
//!
//! ## Architecture
//!
//! - **Frontend** (`frontend/`): lexer, recursive-descent parser and typed AST
//! - **Sema** (`sema/`): scope tree, name resolution and constant checks
//! - **Driver** (`driver/`): per-file pipeline and latest-wins scheduling
//! - **Common** (`common/`): spans, fatal errors and diagnostic rendering

pub mod common;
pub mod driver;
pub mod frontend;
pub mod sema;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, DiagnosticReporter, Span};
pub use driver::{AnalysisScheduler, CheckError, Driver, DriverConfig, FileOutcome};
pub use sema::{AnalyzerConfig, CancellationToken, Diagnostic, DiagnosticKind, SemanticAnalyzer, Severity};
