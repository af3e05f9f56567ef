//! Latest-wins scheduling of analyses per document
//!
//! Starting a new analysis of a document cancels the one in flight for the
//! same document, and a result is only published if no newer analysis has
//! been started since.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use super::{CheckError, Driver};
use crate::sema::{Analysis, CancellationToken};

#[derive(Debug)]
struct DocumentState {
    generation: u64,
    token: CancellationToken,
}

/// Handle of one analysis run of one document
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    document: String,
    generation: u64,
    token: CancellationToken,
}

impl AnalysisTicket {
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Token to pass to the analyzer for this run
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

#[derive(Debug, Default)]
pub struct AnalysisScheduler {
    documents: Mutex<HashMap<String, DocumentState>>,
}

impl AnalysisScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> MutexGuard<'_, HashMap<String, DocumentState>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new run for `document`, superseding any run in flight
    pub fn begin(&self, document: &str) -> AnalysisTicket {
        let mut documents = self.documents();
        let token = CancellationToken::new();

        let generation = match documents.get_mut(document) {
            Some(state) => {
                state.token.cancel();
                state.generation += 1;
                state.token = token.clone();
                state.generation
            }
            None => {
                documents.insert(
                    document.to_string(),
                    DocumentState {
                        generation: 0,
                        token: token.clone(),
                    },
                );
                0
            }
        };

        trace!(document, generation, "analysis started");
        AnalysisTicket {
            document: document.to_string(),
            generation,
            token,
        }
    }

    /// Whether `ticket` is still the newest run of its document
    pub fn is_current(&self, ticket: &AnalysisTicket) -> bool {
        self.documents()
            .get(&ticket.document)
            .is_some_and(|state| state.generation == ticket.generation)
    }

    /// Hand out `value` only if `ticket` has not been superseded
    pub fn publish<T>(&self, ticket: &AnalysisTicket, value: T) -> Option<T> {
        if self.is_current(ticket) && !ticket.token.is_cancelled() {
            Some(value)
        } else {
            debug!(document = %ticket.document, generation = ticket.generation, "dropping stale result");
            None
        }
    }

    /// Forget a document, cancelling its run in flight
    pub fn close(&self, document: &str) {
        if let Some(state) = self.documents().remove(document) {
            state.token.cancel();
        }
    }

    /// Check `source` as the newest version of `document`
    ///
    /// Returns `None` when the run was cancelled or superseded.
    pub fn analyze_document(
        &self,
        driver: &Driver,
        document: &str,
        source: &str,
    ) -> Option<Result<Analysis, CheckError>> {
        let ticket = self.begin(document);
        match driver.check_source(source, ticket.token()) {
            Err(err) if err.is_cancelled() => None,
            outcome => self.publish(&ticket, outcome),
        }
    }
}
