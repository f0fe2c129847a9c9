//! In-memory record store.

use std::collections::{BTreeMap, BTreeSet};

use saros_error::{Result, SarosError};
use saros_types::{Column, DocRecord, RevisionLink, doc_id};
use tracing::debug;

use crate::dump::DocDump;
use crate::schema::decode_record;
use crate::traits::{LoadOptions, LoadOutcome, RecordStore};

/// A [`RecordStore`] backed by an ordered map keyed by doc id.
///
/// Each instance owns its table, so tests get isolation by building a fresh
/// store.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    docs: BTreeMap<String, DocRecord>,
    /// Number of successful loads, for asserting how many writes happened.
    loads: u64,
}

impl MemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding `records`, as if each had been uploaded.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = DocRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Upload a record as-is, without schema checks or cascade.
    ///
    /// This models external uploads, which may carry broken links or even
    /// malformed linkage; the repairer has to cope with whatever it finds.
    pub fn insert(&mut self, record: DocRecord) -> Option<DocRecord> {
        self.docs.insert(record.id(), record)
    }

    /// Upload a record under an explicit id, which need not match
    /// `name-rev`. Lets a store hold duplicate or displaced revisions.
    pub fn insert_as(&mut self, id: impl Into<String>, record: DocRecord) -> Option<DocRecord> {
        self.docs.insert(id.into(), record)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DocRecord> {
        self.docs.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Number of successful loads since the store was created.
    #[must_use]
    pub const fn load_count(&self) -> u64 {
        self.loads
    }

    /// Raise `last` of every lower revision of `name` whose `last` is below
    /// the loaded one.
    fn cascade_last(&mut self, name: &str, rev: i64, last: i64) -> Vec<String> {
        let mut cascaded: Vec<(i64, String)> = Vec::new();
        for (id, record) in &mut self.docs {
            if record.name == name && record.rev < rev && record.last < last {
                record.last = last;
                cascaded.push((record.rev, id.clone()));
            }
        }
        cascaded.sort_unstable();
        cascaded.into_iter().map(|(_, id)| id).collect()
    }
}

impl RecordStore for MemStore {
    fn doc_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self.docs.values().map(|doc| doc.name.as_str()).collect();
        names.into_iter().map(str::to_owned).collect()
    }

    fn last_revs(&self, name: &str) -> Result<Vec<RevisionLink>> {
        Ok(self
            .docs
            .values()
            .filter(|doc| doc.name == name)
            .map(DocRecord::link)
            .collect())
    }

    fn doc_dump(&self, name: &str, rev: i64) -> Result<DocDump> {
        let id = doc_id(name, rev);
        let record = self
            .docs
            .get(&id)
            .ok_or_else(|| SarosError::no_such_doc(id.clone()))?;
        let mut dump = DocDump::from_record(record);
        // The stored key wins over whatever name-rev the record claims.
        dump.set(Column::Id, id);
        Ok(dump)
    }

    fn load(&mut self, dump: &DocDump, options: LoadOptions) -> Result<LoadOutcome> {
        let record = decode_record(dump)?;
        let id = record.id();
        if !self.docs.contains_key(&id) {
            return Err(SarosError::no_such_doc(id));
        }

        let (rev, last) = (record.rev, record.last);
        let name = record.name.clone();
        self.docs.insert(id.clone(), record);
        self.loads += 1;

        let cascaded = if options.cascade {
            self.cascade_last(&name, rev, last)
        } else {
            Vec::new()
        };

        debug!(
            doc_id = %id,
            rev,
            last,
            cascade = options.cascade,
            cascaded = cascaded.len(),
            "record loaded"
        );

        Ok(LoadOutcome { id, cascaded })
    }

    fn records(&self) -> Vec<DocRecord> {
        self.docs.values().cloned().collect()
    }

    fn entries(&self) -> Vec<(String, DocRecord)> {
        self.docs
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chain(name: &str, spans: &[(i64, i64)]) -> MemStore {
        // spans: (first rev, last) for each sub-chain
        let mut store = MemStore::new();
        for &(first, last) in spans {
            for rev in first..=last {
                let prev = if rev == first { 0 } else { rev - 1 };
                store.insert(DocRecord::new(name, rev, prev, last, format!("i am {name}-{rev}")));
            }
        }
        store
    }

    #[test]
    fn names_are_distinct_and_sorted() {
        let mut store = chain("b", &[(1, 2)]);
        store.insert(DocRecord::new("a", 1, 0, 1, ""));
        assert_eq!(store.doc_names(), vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn last_revs_matches_exact_name() {
        let mut store = chain("JE0", &[(1, 2)]);
        store.insert(DocRecord::new("JE00", 1, 0, 1, ""));
        let mut links = store.last_revs("JE0").unwrap();
        links.sort_unstable();
        assert_eq!(links, vec![RevisionLink::new(1, 2), RevisionLink::new(2, 2)]);
        assert!(store.last_revs("JE").unwrap().is_empty());
    }

    #[test]
    fn dump_unknown_revision_is_lookup_error() {
        let store = chain("a", &[(1, 2)]);
        let err = store.doc_dump("a", 3).unwrap_err();
        assert!(matches!(err, SarosError::NoSuchDocId { ref id } if id == "a-3"));
    }

    #[test]
    fn load_cascades_last_to_lower_revisions() {
        let mut store = chain("JE00", &[(1, 3), (4, 6)]);
        let mut dump = store.doc_dump("JE00", 4).unwrap();
        dump.set_int(Column::Prev, 3);

        let outcome = store.load(&dump, LoadOptions::default()).unwrap();
        assert_eq!(outcome.id, "JE00-4");
        assert_eq!(outcome.cascaded, vec!["JE00-1", "JE00-2", "JE00-3"]);
        assert!(store.records().iter().all(|doc| doc.last == 6));
        assert_eq!(store.get("JE00-4").map(|doc| doc.prev), Some(3));
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn cascade_never_lowers_last_or_touches_higher_revisions() {
        let mut store = chain("a", &[(1, 2), (3, 5)]);
        // Loading revision 1 with its own last must not disturb anything.
        let dump = store.doc_dump("a", 1).unwrap();
        let outcome = store.load(&dump, LoadOptions::default()).unwrap();
        assert!(outcome.cascaded.is_empty());
        assert_eq!(store.get("a-3").map(|doc| doc.last), Some(5));
        assert_eq!(store.get("a-2").map(|doc| doc.last), Some(2));
    }

    #[test]
    fn load_without_cascade_replaces_only() {
        let mut store = chain("a", &[(1, 1), (2, 2)]);
        let mut dump = store.doc_dump("a", 2).unwrap();
        dump.set_int(Column::Prev, 1);
        let outcome = store.load(&dump, LoadOptions::without_cascade()).unwrap();
        assert!(outcome.cascaded.is_empty());
        assert_eq!(store.get("a-1").map(|doc| doc.last), Some(1));
        assert_eq!(store.get("a-2").map(|doc| doc.prev), Some(1));
    }

    #[test]
    fn cascade_does_not_cross_names() {
        let mut store = chain("a", &[(1, 1), (2, 2)]);
        store.insert(DocRecord::new("b", 1, 0, 1, ""));
        let mut dump = store.doc_dump("a", 2).unwrap();
        dump.set_int(Column::Prev, 1);
        store.load(&dump, LoadOptions::default()).unwrap();
        assert_eq!(store.get("b-1").map(|doc| doc.last), Some(1));
    }

    #[test]
    fn displaced_record_dumps_under_its_stored_id() {
        let mut store = MemStore::new();
        store.insert_as("JE00-5", DocRecord::new("JE00", 7, 4, 6, "i am JE00-5"));
        let mut links = store.last_revs("JE00").unwrap();
        links.sort_unstable();
        assert_eq!(links, vec![RevisionLink::new(7, 6)]);
        assert!(store.doc_dump("JE00", 7).is_err());
    }

    #[test]
    fn entries_keep_the_stored_id() {
        let mut store = chain("JE00", &[(1, 1)]);
        store.insert_as("JE00-5", DocRecord::new("JE00", 7, 4, 6, "i am JE00-5"));
        let ids: Vec<String> = store.entries().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["JE00-1", "JE00-5"]);
        assert_eq!(store.entries()[1].1.rev, 7);
    }

    #[test]
    fn load_of_unknown_id_leaves_store_unchanged() {
        let mut store = chain("JE04", &[(1, 1), (2, 2)]);
        let before = store.records();
        let dump = DocDump::from_record(&DocRecord::new("JE04", 4, 3, 4, "x"));
        let err = store.load(&dump, LoadOptions::default()).unwrap_err();
        assert!(matches!(err, SarosError::NoSuchDocId { ref id } if id == "JE04-4"));
        assert_eq!(store.records(), before);
        assert_eq!(store.load_count(), 0);
    }

    proptest! {
        #[test]
        fn cascade_raises_exactly_the_lower_short_revisions(
            lasts in prop::collection::vec(1_i64..12, 1..10),
            pick in 0_usize..10,
        ) {
            // Revision r gets last max(r, lasts[r-1]) so every record is valid.
            let records: Vec<DocRecord> = lasts
                .iter()
                .zip(1_i64..)
                .map(|(&last, rev)| DocRecord::new("P", rev, 0, last.max(rev), ""))
                .collect();
            let mut store = MemStore::from_records(records.clone());
            let loaded = &records[pick % records.len()];

            let outcome = store
                .load(&DocDump::from_record(loaded), LoadOptions::default())
                .unwrap();

            for before in &records {
                let after = store.get(&before.id()).unwrap();
                let raised = before.rev < loaded.rev && before.last < loaded.last;
                let expected = if raised { loaded.last } else { before.last };
                prop_assert_eq!(after.last, expected);
                prop_assert_eq!(outcome.cascaded.contains(&before.id()), raised);
            }
        }
    }
}
