//! Semantic diagnostics
//!
//! Every finding of the analyzer is a plain [`Diagnostic`] value. None of
//! them abort the analysis; they are collected by the
//! [`AnalysisContext`](super::AnalysisContext) and returned in source order.

use codespan_reporting::diagnostic::{Diagnostic as Report, Label};

use crate::common::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
}

/// The diagnostic taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Name already declared in the same scope or struct
    DuplicateSymbol,
    /// Declared name is not a valid identifier
    InvalidIdentifier,
    /// Referenced name not found in any enclosing scope
    UndefinedSymbol,
    /// Number of subscripts differs from the declared dimension count
    DimensionMismatch,
    /// Array size is not a bare integer literal
    NonConstantDimension,
    /// Constant expression refers to a variable or a call
    NonConstantInConstExpr,
    /// Constant expression nested beyond the depth bound
    ConstExprTooDeep,
    /// Call of a name that is not a function
    NotCallable,
    /// Variable that is never read
    UnusedVariable,
    /// Over-long or doubled chain of unary operators
    SuspiciousUnary,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::UnusedVariable | DiagnosticKind::SuspiciousUnary => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Stable code shown next to the rendered message
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::DuplicateSymbol => "S0001",
            DiagnosticKind::InvalidIdentifier => "S0002",
            DiagnosticKind::UndefinedSymbol => "S0003",
            DiagnosticKind::DimensionMismatch => "S0004",
            DiagnosticKind::NonConstantDimension => "S0005",
            DiagnosticKind::NonConstantInConstExpr => "S0006",
            DiagnosticKind::ConstExprTooDeep => "S0007",
            DiagnosticKind::NotCallable => "S0008",
            DiagnosticKind::UnusedVariable => "W0001",
            DiagnosticKind::SuspiciousUnary => "W0002",
        }
    }
}

/// A single semantic finding anchored to a source span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
    /// Secondary location, e.g. the earlier declaration of a duplicate
    pub related: Option<(Span, String)>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            message: message.into(),
            span,
            related: None,
        }
    }

    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related = Some((span, message.into()));
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Convert into a codespan report for terminal rendering
    pub fn to_report(&self, file_id: usize) -> Report<usize> {
        let report = match self.severity {
            Severity::Error => Report::error(),
            Severity::Warning => Report::warning(),
        };

        let mut labels = vec![Label::primary(file_id, self.span.range())];
        if let Some((span, message)) = &self.related {
            labels.push(Label::secondary(file_id, span.range()).with_message(message));
        }

        report
            .with_message(&self.message)
            .with_code(self.kind.code())
            .with_labels(labels)
    }
}

/// `1 dimension`, `2 dimensions`
pub(crate) fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_kind() {
        assert_eq!(Diagnostic::new(DiagnosticKind::UndefinedSymbol, "x", Span::default()).severity, Severity::Error);
        assert_eq!(Diagnostic::new(DiagnosticKind::UnusedVariable, "x", Span::default()).severity, Severity::Warning);
        assert_eq!(DiagnosticKind::SuspiciousUnary.severity(), Severity::Warning);
    }

    #[test]
    fn test_report_carries_related_label() {
        let diag = Diagnostic::new(DiagnosticKind::DuplicateSymbol, "duplicate identifier 'a'", Span::new(8, 9))
            .with_related(Span::new(4, 5), "first declared here");
        let report = diag.to_report(0);
        assert_eq!(report.labels.len(), 2);
        assert_eq!(report.code.as_deref(), Some("S0001"));
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "dimension"), "1 dimension");
        assert_eq!(plural(0, "dimension"), "0 dimensions");
        assert_eq!(plural(3, "subscript"), "3 subscripts");
    }
}
