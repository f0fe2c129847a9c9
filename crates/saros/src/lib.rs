//! Saros: link broken revision chains in a document repository.
//!
//! ```
//! use saros::Saros;
//!
//! let mut saros = Saros::reference();
//! let report = saros.link_revs()?;
//! assert_eq!(report.writes(), 4);
//! assert!(saros.render().starts_with("JE00-1: "));
//! # Ok::<(), saros::SarosError>(())
//! ```

use std::fmt::Write as _;

use saros_store::MemStore;
use tracing::info;

pub use saros_error::{ErrorKind, Result, SarosError};
pub use saros_repair::{
    AppliedCorrection, NameOutcome, PassState, RepairConfig, RepairDriver, RepairReport,
};
pub use saros_store::{DocDump, LoadOptions, RecordStore};
pub use saros_types::{CorrectedLink, DocRecord, RevisionLink};

/// A repository handle that owns its store.
#[derive(Debug, Clone)]
pub struct Saros<S: RecordStore = MemStore> {
    store: S,
    config: RepairConfig,
}

impl Saros<MemStore> {
    /// The reference repository, `JE00` through `JE04`, before linking.
    #[must_use]
    pub fn reference() -> Self {
        Self::new(saros_store::saros_fixture())
    }
}

impl<S: RecordStore> Saros<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, RepairConfig::default())
    }

    pub const fn with_config(store: S, config: RepairConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub const fn config(&self) -> RepairConfig {
        self.config
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Link the revisions of every document in the repository.
    ///
    /// # Errors
    /// See [`RepairDriver::run`].
    pub fn link_revs(&mut self) -> Result<RepairReport> {
        let report = RepairDriver::new(&mut self.store, self.config).run()?;
        info!(writes = report.writes(), clean = report.is_clean(), "revisions linked");
        Ok(report)
    }

    /// One line per record, keyed and ordered by stored id:
    ///
    /// ```text
    /// JE00-1: name=JE00 rev=1 prev=0 last=3 content="i am JE00-1"
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (idx, (id, record)) in self.store.entries().iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            let _ = write!(
                out,
                "{id}: name={} rev={} prev={} last={} content={:?}",
                record.name,
                record.rev,
                record.prev,
                record.last,
                record.content
            );
        }
        out
    }
}

impl Default for Saros<MemStore> {
    fn default() -> Self {
        Self::new(MemStore::new())
    }
}
