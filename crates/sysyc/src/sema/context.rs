//! Per-run analysis state

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use super::config::AnalyzerConfig;
use super::diagnostic::Diagnostic;
use super::scope::ScopeTree;
use super::symbol::SymbolId;

/// How often (in visited nodes) the traversals poll for cancellation
const CANCEL_POLL_INTERVAL: u32 = 64;

/// Reasons an analysis run produces no diagnostics at all
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("analysis cancelled")]
    Cancelled,
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Cooperative cancellation flag shared between a run and whoever supersedes it
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// How a resolved reference touches a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Read/write counts of one symbol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub reads: u32,
    pub writes: u32,
}

/// State of exactly one analysis run: the scope tree, the diagnostic
/// accumulator and the usage counts gathered while resolving
pub struct AnalysisContext<'a> {
    pub config: &'a AnalyzerConfig,
    pub scopes: ScopeTree,
    diagnostics: Vec<Diagnostic>,
    usage: HashMap<SymbolId, Usage>,
    cancel: &'a CancellationToken,
    steps: u32,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(config: &'a AnalyzerConfig, cancel: &'a CancellationToken) -> Self {
        Self {
            config,
            scopes: ScopeTree::new(),
            diagnostics: Vec::new(),
            usage: HashMap::new(),
            cancel,
            steps: 0,
        }
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Count one visited node and bail out if the run was superseded
    pub fn checkpoint(&mut self) -> AnalysisResult<()> {
        self.steps = self.steps.wrapping_add(1);
        if self.steps % CANCEL_POLL_INTERVAL == 0 && self.cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }
        Ok(())
    }

    /// Final check before results are handed out
    pub fn ensure_not_cancelled(&self) -> AnalysisResult<()> {
        if self.cancel.is_cancelled() {
            Err(AnalysisError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub fn record_use(&mut self, symbol: SymbolId, access: Access) {
        let usage = self.usage.entry(symbol).or_default();
        match access {
            Access::Read => usage.reads += 1,
            Access::Write => usage.writes += 1,
        }
    }

    pub fn usage(&self, symbol: SymbolId) -> Usage {
        self.usage.get(&symbol).copied().unwrap_or_default()
    }

    /// Consume the context, returning the scope tree and the diagnostics
    /// ordered by source position
    pub fn finish(self) -> (ScopeTree, Vec<Diagnostic>) {
        let mut diagnostics = self.diagnostics;
        diagnostics.sort_by_key(|d| d.span.start);
        (self.scopes, diagnostics)
    }
}
