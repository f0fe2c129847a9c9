//! Whole-store repair runs.

use std::fmt;

use saros_error::{Result, SarosError};
use saros_store::RecordStore;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::chain::validate_chain;
use crate::config::RepairConfig;
use crate::repair::{AppliedCorrection, ChainRepairer};

// ---------------------------------------------------------------------------
// Per-document pass state
// ---------------------------------------------------------------------------

/// Where a single document's pass stands.
///
/// `Start -> Validated -> Done` for a linked document,
/// `Start -> Validated -> Repairing -> Done` when links were written, and
/// `Failed` from any state on error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassState {
    Start,
    Validated,
    Repairing,
    Done,
    Failed,
}

impl PassState {
    /// Whether the pass has finished, successfully or not.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for PassState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Start => "start",
            Self::Validated => "validated",
            Self::Repairing => "repairing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Result of one document's pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameOutcome {
    pub name: String,
    pub state: PassState,
    /// Number of links the store reported for the document.
    pub links: usize,
    pub corrections: Vec<AppliedCorrection>,
    /// Rendered error for a failed pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NameOutcome {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            state: PassState::Start,
            links: 0,
            corrections: Vec::new(),
            error: None,
        }
    }

    fn advance(&mut self, next: PassState) {
        debug!(document = %self.name, from = %self.state, to = %next, "pass transition");
        self.state = next;
    }
}

/// Per-document outcomes of a run, in name order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RepairReport {
    pub outcomes: Vec<NameOutcome>,
}

impl RepairReport {
    /// Total corrective writes across all documents.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.outcomes.iter().map(|outcome| outcome.corrections.len()).sum()
    }

    /// Names whose pass failed.
    #[must_use]
    pub fn failed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.state == PassState::Failed)
            .map(|outcome| outcome.name.as_str())
            .collect()
    }

    /// Whether every document finished linked.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.outcomes
            .iter()
            .all(|outcome| outcome.state == PassState::Done)
    }

    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&NameOutcome> {
        self.outcomes.iter().find(|outcome| outcome.name == name)
    }

    /// Pretty-printed JSON form of the report.
    ///
    /// # Errors
    /// Returns `SarosError::Internal` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| SarosError::internal(format!("report serialization failed: {err}")))
    }
}

// ---------------------------------------------------------------------------
// RepairDriver
// ---------------------------------------------------------------------------

/// Walks every document in a store and links its revisions.
///
/// Documents are processed one at a time in name order. Each one is fully
/// validated before its first write, so a structurally broken document is
/// never touched.
pub struct RepairDriver<'a, S: RecordStore + ?Sized> {
    store: &'a mut S,
    config: RepairConfig,
}

impl<'a, S: RecordStore + ?Sized> RepairDriver<'a, S> {
    pub fn new(store: &'a mut S, config: RepairConfig) -> Self {
        Self { store, config }
    }

    /// Link every document in the store.
    ///
    /// # Errors
    /// With `fail_fast`, the first document error. Otherwise failures are
    /// recorded in the report and this only fails on internal errors.
    pub fn run(&mut self) -> Result<RepairReport> {
        let names = self.store.doc_names();
        info!(documents = names.len(), fail_fast = self.config.fail_fast, "repair run started");

        let mut report = RepairReport::default();
        for name in &names {
            let mut outcome = NameOutcome::new(name);
            match self.link_into(&mut outcome) {
                Ok(()) => report.outcomes.push(outcome),
                Err(err) if self.config.fail_fast => {
                    error!(document = %name, error = %err, "repair run aborted");
                    return Err(err);
                }
                Err(SarosError::Internal(msg)) => return Err(SarosError::Internal(msg)),
                Err(err) => {
                    warn!(document = %name, error = %err, "skipping document");
                    outcome.error = Some(err.to_string());
                    report.outcomes.push(outcome);
                }
            }
        }

        info!(
            documents = report.outcomes.len(),
            writes = report.writes(),
            failed = report.failed().len(),
            "repair run finished"
        );
        Ok(report)
    }

    /// Link a single document.
    ///
    /// # Errors
    /// Any validation, store or convergence error for `name`.
    pub fn link_document(&mut self, name: &str) -> Result<NameOutcome> {
        let mut outcome = NameOutcome::new(name);
        self.link_into(&mut outcome)?;
        Ok(outcome)
    }

    fn link_into(&mut self, outcome: &mut NameOutcome) -> Result<()> {
        let result = self.pass(outcome);
        if result.is_err() {
            outcome.advance(PassState::Failed);
        }
        if !outcome.state.is_terminal() {
            return Err(SarosError::internal(format!(
                "pass over {} stopped in state {}",
                outcome.name, outcome.state
            )));
        }
        result
    }

    fn pass(&mut self, outcome: &mut NameOutcome) -> Result<()> {
        let links = self.store.last_revs(&outcome.name)?;
        outcome.links = links.len();

        let chain = validate_chain(&outcome.name, links).inspect_err(|err| {
            error!(document = %outcome.name, error = %err, "revision links invalid");
        })?;
        outcome.advance(PassState::Validated);

        let broken = chain.broken_pairs().len();
        if broken > 0 {
            info!(document = %outcome.name, broken, "broken revision links found");
            outcome.advance(PassState::Repairing);
            outcome.corrections = ChainRepairer::new(&mut *self.store, self.config).repair(&chain)?;
        }
        outcome.advance(PassState::Done);
        Ok(())
    }
}
