//! The record-store seam consumed by the link repairer.

use saros_error::Result;
use saros_types::{DocRecord, RevisionLink};
use serde::{Deserialize, Serialize};

use crate::dump::DocDump;

/// Options controlling a single [`RecordStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Raise `last` on lower revisions of the same document after the replace.
    pub cascade: bool,
}

impl LoadOptions {
    /// Replace the record only; used when restoring a store from dumps.
    #[must_use]
    pub const fn without_cascade() -> Self {
        Self { cascade: false }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { cascade: true }
    }
}

/// What a successful load changed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadOutcome {
    /// Id of the replaced record.
    pub id: String,
    /// Ids whose `last` was raised by the cascade, ascending by revision.
    pub cascaded: Vec<String>,
}

/// A keyed table of document records.
///
/// The only write path is [`load`](Self::load): whole-record replacement of
/// an existing record from a dump. There is no partial field update.
pub trait RecordStore {
    /// All distinct document names, sorted.
    fn doc_names(&self) -> Vec<String>;

    /// `(rev, last)` for every record of document `name`, in no particular
    /// order. Unknown names yield an empty list.
    fn last_revs(&self, name: &str) -> Result<Vec<RevisionLink>>;

    /// Export the record for `name`, revision `rev`.
    ///
    /// # Errors
    /// Returns `SarosError::NoSuchDocId` if there is no such record.
    fn doc_dump(&self, name: &str, rev: i64) -> Result<DocDump>;

    /// Validate `dump`, replace the matching record, then cascade `last` to
    /// lower revisions unless `options.cascade` is false.
    ///
    /// Validation finishes before anything is written: on error the store is
    /// unchanged.
    ///
    /// # Errors
    /// Schema and data errors from [`crate::decode_record`], or
    /// `SarosError::NoSuchDocId` if the dump names a record that does not
    /// exist.
    fn load(&mut self, dump: &DocDump, options: LoadOptions) -> Result<LoadOutcome>;

    /// Every record, sorted by id.
    fn records(&self) -> Vec<DocRecord>;

    /// Every record with the id it is stored under, sorted by id.
    ///
    /// A store that can hold a record under an id other than its `name-rev`
    /// must override this.
    fn entries(&self) -> Vec<(String, DocRecord)> {
        self.records()
            .into_iter()
            .map(|record| (record.id(), record))
            .collect()
    }
}
