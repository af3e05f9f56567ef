//! Checking pipeline: read, lex, parse, analyze, report

mod scheduler;

pub use scheduler::{AnalysisScheduler, AnalysisTicket};

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info_span};

use crate::common::{CompileError, DiagnosticReporter};
use crate::frontend;
use crate::sema::{Analysis, AnalysisError, AnalyzerConfig, CancellationToken, SemanticAnalyzer, Severity};

/// Why a source could not be checked
#[derive(Error, Debug)]
pub enum CheckError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl CheckError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CheckError::Analysis(AnalysisError::Cancelled))
    }
}

/// Options for one checker invocation
#[derive(Debug, Clone, Default)]
pub struct DriverConfig {
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub analyzer: AnalyzerConfig,
}

/// Per-file summary after diagnostics have been reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOutcome {
    pub syntax_error: bool,
    pub errors: usize,
    pub warnings: usize,
}

impl FileOutcome {
    /// Whether the file should fail the run
    pub fn failed(&self, deny_warnings: bool) -> bool {
        self.syntax_error || self.errors > 0 || (deny_warnings && self.warnings > 0)
    }
}

/// Runs the frontend and the analyzer over source files
pub struct Driver {
    config: DriverConfig,
    analyzer: SemanticAnalyzer,
}

impl Driver {
    pub fn new(config: DriverConfig) -> Self {
        let analyzer = SemanticAnalyzer::with_config(config.analyzer.clone());
        Self { config, analyzer }
    }

    /// Parse and analyze one source text
    pub fn check_source(&self, source: &str, cancel: &CancellationToken) -> Result<Analysis, CheckError> {
        let unit = frontend::parse(source)?;
        Ok(self.analyzer.run(&unit, cancel)?)
    }

    /// Check a file on disk, rendering everything through `reporter`
    ///
    /// Syntax errors and semantic diagnostics are reported and summarized in
    /// the outcome. Only I/O failures are returned as errors.
    pub fn check_file(&self, path: &Path, reporter: &mut DiagnosticReporter) -> Result<FileOutcome, CheckError> {
        let _span = info_span!("check", file = %path.display()).entered();
        let source = fs::read_to_string(path).map_err(CompileError::from)?;
        let file_id = reporter.add_file(path.display().to_string(), source.clone());

        match self.check_text(&source) {
            Ok(analysis) => {
                let mut outcome = FileOutcome::default();
                for diagnostic in &analysis.diagnostics {
                    reporter.report_diagnostic(file_id, diagnostic);
                    match diagnostic.severity {
                        Severity::Error => outcome.errors += 1,
                        Severity::Warning => outcome.warnings += 1,
                    }
                }
                debug!(errors = outcome.errors, warnings = outcome.warnings, "file checked");
                Ok(outcome)
            }
            Err(CheckError::Compile(err @ (CompileError::Lexer { .. } | CompileError::Parser { .. }))) => {
                debug!(span = ?err.span(), "syntax error");
                reporter.report_error(file_id, &err);
                Ok(FileOutcome {
                    syntax_error: true,
                    ..FileOutcome::default()
                })
            }
            Err(err) => Err(err),
        }
    }

    /// [`check_source`](Self::check_source) plus the optional dumps
    fn check_text(&self, source: &str) -> Result<Analysis, CheckError> {
        if self.config.dump_tokens {
            eprintln!("=== Tokens ===");
            eprint!("{}", frontend::dump_tokens(source)?);
            eprintln!("=== End Tokens ===\n");
        }

        if self.config.dump_ast {
            eprintln!("=== AST ===");
            eprintln!("{}", frontend::dump_ast(source)?);
            eprintln!("=== End AST ===\n");
        }

        self.check_source(source, &CancellationToken::new())
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new(DriverConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::{DiagnosticKind, DimensionPolicy};
    use codespan_reporting::term::termcolor::ColorChoice;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn temp_source(name: &str, source: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("sysyc-{}-{}.sy", name, std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(source.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_check_source_returns_diagnostics() {
        let driver = Driver::default();
        let analysis = driver
            .check_source("int main() { b = 5; return 0; }", &CancellationToken::new())
            .unwrap();
        let kinds: Vec<DiagnosticKind> = analysis.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::UndefinedSymbol]);
    }

    #[test]
    fn test_check_source_uses_analyzer_config() {
        let config = DriverConfig {
            analyzer: AnalyzerConfig::default().with_dimensions(DimensionPolicy::ConstantExpression),
            ..DriverConfig::default()
        };
        let analysis = Driver::new(config)
            .check_source("const int N = 5; int arr[N];", &CancellationToken::new())
            .unwrap();
        assert!(analysis.diagnostics.is_empty());
    }

    #[test]
    fn test_syntax_error_is_a_compile_error() {
        let err = Driver::default()
            .check_source("int = ;", &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, CheckError::Compile(CompileError::Parser { .. })));
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_cancelled_check() {
        let token = CancellationToken::new();
        token.cancel();
        let err = Driver::default().check_source("int a;", &token).unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_check_file_outcomes() {
        let driver = Driver::default();
        let mut reporter = DiagnosticReporter::with_color(ColorChoice::Never);

        let clean = temp_source("clean", "int main() { return 0; }");
        let outcome = driver.check_file(&clean, &mut reporter).unwrap();
        assert_eq!(outcome, FileOutcome::default());
        assert!(!outcome.failed(true));

        let broken = temp_source("broken", "int a; int a; int main() { return !!a; }");
        let outcome = driver.check_file(&broken, &mut reporter).unwrap();
        assert_eq!(
            outcome,
            FileOutcome {
                syntax_error: false,
                errors: 1,
                warnings: 1
            }
        );
        assert!(outcome.failed(false));

        let syntax = temp_source("syntax", "int main( {");
        let outcome = driver.check_file(&syntax, &mut reporter).unwrap();
        assert!(outcome.syntax_error);

        for path in [clean, broken, syntax] {
            let _ = fs::remove_file(path);
        }
    }

    #[test]
    fn test_warnings_fail_only_when_denied() {
        let outcome = FileOutcome {
            warnings: 2,
            ..FileOutcome::default()
        };
        assert!(!outcome.failed(false));
        assert!(outcome.failed(true));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut reporter = DiagnosticReporter::with_color(ColorChoice::Never);
        let err = Driver::default()
            .check_file(Path::new("/nonexistent/sysyc/input.sy"), &mut reporter)
            .unwrap_err();
        assert!(matches!(err, CheckError::Compile(CompileError::Io(_))));
    }
}
