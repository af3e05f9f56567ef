//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};
use thiserror::Error;

use super::Span;
use crate::sema;

/// Fatal frontend error with source location
///
/// Semantic findings are never reported through this type; they are
/// accumulated as [`sema::Diagnostic`] values instead.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Lexer error at {span:?}: {message}")]
    Lexer { message: String, span: Span },

    #[error("Parser error at {span:?}: {message}")]
    Parser { message: String, span: Span },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Lexer { span, .. } | CompileError::Parser { span, .. } => Some(*span),
            CompileError::Io(_) => None,
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::with_color(ColorChoice::Auto)
    }

    pub fn with_color(choice: ColorChoice) -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(choice),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    pub fn report_error(&self, file_id: usize, error: &CompileError) {
        let diagnostic = Self::compile_error_to_report(file_id, error);
        self.emit(&mut self.writer.lock(), &diagnostic);
    }

    pub fn report_diagnostic(&self, file_id: usize, diagnostic: &sema::Diagnostic) {
        self.emit(&mut self.writer.lock(), &diagnostic.to_report(file_id));
    }

    fn compile_error_to_report(file_id: usize, error: &CompileError) -> Diagnostic<usize> {
        match error {
            CompileError::Lexer { message, span } => Diagnostic::error()
                .with_message("Lexer error")
                .with_labels(vec![
                    Label::primary(file_id, span.range()).with_message(message)
                ]),

            CompileError::Parser { message, span } => Diagnostic::error()
                .with_message("Syntax error")
                .with_labels(vec![
                    Label::primary(file_id, span.range()).with_message(message)
                ]),

            CompileError::Io(err) => {
                Diagnostic::error().with_message(format!("IO error: {}", err))
            }
        }
    }

    fn emit(&self, writer: &mut dyn WriteColor, diagnostic: &Diagnostic<usize>) {
        let _ = term::emit(writer, &self.config, &self.files, diagnostic);
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::{Diagnostic as SemaDiagnostic, DiagnosticKind};
    use codespan_reporting::term::termcolor::Buffer;

    #[test]
    fn test_compile_error_span() {
        let err = CompileError::parser("expected ';'", Span::new(3, 4));
        assert_eq!(err.span(), Some(Span::new(3, 4)));
        assert_eq!(err.to_string(), "Parser error at Span { start: 3, end: 4 }: expected ';'");

        let io = CompileError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.span(), None);
    }

    #[test]
    fn test_render_diagnostic_with_related_label() {
        let mut reporter = DiagnosticReporter::with_color(ColorChoice::Never);
        let file_id = reporter.add_file("dup.sy", "int a; int a;");
        let diagnostic = SemaDiagnostic::new(
            DiagnosticKind::DuplicateSymbol,
            "duplicate identifier 'a' in global scope",
            Span::new(11, 12),
        )
        .with_related(Span::new(4, 5), "first declared here");

        let mut buffer = Buffer::no_color();
        reporter.emit(&mut buffer, &diagnostic.to_report(file_id));
        let rendered = String::from_utf8_lossy(buffer.as_slice()).into_owned();
        assert!(rendered.contains("error[S0001]: duplicate identifier 'a' in global scope"));
        assert!(rendered.contains("dup.sy:1:12"));
        assert!(rendered.contains("first declared here"));
    }
}
