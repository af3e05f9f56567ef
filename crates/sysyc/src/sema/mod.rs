//! Semantic analysis for SysY
//!
//! Builds the scope tree of a compilation unit and checks every
//! declaration and reference against it.

mod analyzer;
mod builder;
mod config;
mod const_expr;
mod context;
mod diagnostic;
mod ident;
mod lints;
mod resolver;
mod scope;
mod symbol;

pub use analyzer::{Analysis, SemanticAnalyzer};
pub use builder::RUNTIME_FUNCTIONS;
pub use config::{AnalyzerConfig, DimensionPolicy, ShadowingPolicy};
pub use context::{AnalysisError, AnalysisResult, CancellationToken};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use ident::is_valid_identifier;
pub use scope::{Name, Scope, ScopeId, ScopeKind, ScopeTree};
pub use symbol::{Symbol, SymbolId, SymbolKind};
