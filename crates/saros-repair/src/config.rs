//! Repair run configuration.

use serde::{Deserialize, Serialize};

/// Options for a [`RepairDriver`](crate::RepairDriver) run.
///
/// All fields have defaults, so `RepairConfig::default()` reproduces the
/// reference behaviour: stop at the first failing document and re-read each
/// repaired document to confirm it collapsed into a single chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Abort the whole run on the first document that fails.
    ///
    /// When false, failures are recorded in the report and the run moves on
    /// to the next document name.
    pub fail_fast: bool,

    /// After the last corrective write for a document, re-read its links and
    /// fail unless they form one chain ending at the revision count.
    pub verify_convergence: bool,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            fail_fast: true,
            verify_convergence: true,
        }
    }
}

impl RepairConfig {
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    #[must_use]
    pub const fn with_verify_convergence(mut self, verify: bool) -> Self {
        self.verify_convergence = verify;
        self
    }
}
