//! Applying corrections through the store's whole-record load path.

use saros_error::{Result, SarosError};
use saros_store::{LoadOptions, RecordStore};
use saros_types::{Column, CorrectedLink, RevisionLink};
use serde::Serialize;
use tracing::{debug, info};

use crate::chain::{BrokenPair, ValidatedChain};
use crate::config::RepairConfig;

/// One corrective write and what the store's cascade did with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedCorrection {
    pub correction: CorrectedLink,
    /// Ids whose `last` the store raised after the load.
    pub cascaded: Vec<String>,
}

/// Links one validated document.
///
/// The repairer only ever writes `prev`: it exports the broken revision,
/// points `prev` at the revision before it, and loads the dump back. The
/// store's cascade then carries the later chain's `last` down to every lower
/// revision. Boundaries are fixed in ascending order, so each load raises
/// the whole prefix at once.
pub struct ChainRepairer<'a, S: RecordStore + ?Sized> {
    store: &'a mut S,
    config: RepairConfig,
}

impl<'a, S: RecordStore + ?Sized> ChainRepairer<'a, S> {
    pub fn new(store: &'a mut S, config: RepairConfig) -> Self {
        Self { store, config }
    }

    /// Write one correction per broken pair of `chain`.
    ///
    /// Every correction is computed and checked before the first write. An
    /// already linked chain performs no writes.
    ///
    /// # Errors
    /// `InvalidCorrection` before any write; lookup and load errors from the
    /// store; `RepairDidNotConverge` if verification is on and the document
    /// still has more than one chain afterwards.
    pub fn repair(&mut self, chain: &ValidatedChain) -> Result<Vec<AppliedCorrection>> {
        let name = chain.name();
        let corrections: Vec<CorrectedLink> = chain
            .broken_pairs()
            .iter()
            .map(BrokenPair::correction)
            .collect();
        if corrections.is_empty() {
            debug!(document = name, links = chain.len(), "document already linked");
            return Ok(Vec::new());
        }
        for correction in &corrections {
            correction.validate(name)?;
        }

        let mut applied = Vec::with_capacity(corrections.len());
        for correction in corrections {
            applied.push(self.apply(name, correction)?);
        }

        if self.config.verify_convergence {
            self.verify(chain)?;
        }
        Ok(applied)
    }

    fn apply(&mut self, name: &str, correction: CorrectedLink) -> Result<AppliedCorrection> {
        let mut dump = self.store.doc_dump(name, correction.rev)?;
        if !dump.set_int(Column::Prev, correction.prev) {
            return Err(SarosError::internal(format!(
                "dump of {name}-{} has no prev column",
                correction.rev
            )));
        }
        let outcome = self.store.load(&dump, LoadOptions::default())?;

        info!(
            document = name,
            %correction,
            cascaded = outcome.cascaded.len(),
            "linked broken revision"
        );
        Ok(AppliedCorrection {
            correction,
            cascaded: outcome.cascaded,
        })
    }

    /// Re-read the document and check it is one chain `1..=n` where `n` is
    /// the validated chain's final revision.
    fn verify(&self, chain: &ValidatedChain) -> Result<()> {
        let name = chain.name();
        let mut links = self.store.last_revs(name)?;
        links.sort_unstable();
        let last = chain.final_revision().unwrap_or(0);
        if !is_single_chain(&links, last) {
            return Err(SarosError::RepairDidNotConverge {
                name: name.to_owned(),
                links: links.iter().map(|link| link.pair()).collect(),
            });
        }
        debug!(document = name, links = links.len(), "document converged");
        Ok(())
    }
}

/// Sorted `links` are exactly revisions `1..=last`, all with `last`.
fn is_single_chain(links: &[RevisionLink], last: i64) -> bool {
    let closed = links.last().map_or(last == 0, |end| end.rev == last);
    closed
        && links
            .iter()
            .zip(1_i64..)
            .all(|(link, rev)| link.rev == rev && link.last == last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::validate_chain;
    use saros_store::{DocDump, LoadOutcome, MemStore};
    use saros_types::DocRecord;

    fn store_with(name: &str, spans: &[(i64, i64)]) -> MemStore {
        let mut store = MemStore::new();
        for &(first, last) in spans {
            for rev in first..=last {
                let prev = if rev == first { 0 } else { rev - 1 };
                store.insert(DocRecord::new(name, rev, prev, last, format!("i am {name}-{rev}")));
            }
        }
        store
    }

    fn validated(store: &MemStore, name: &str) -> ValidatedChain {
        validate_chain(name, store.last_revs(name).unwrap()).unwrap()
    }

    #[test]
    fn single_chain_check() {
        let links: Vec<RevisionLink> = [(1, 3), (2, 3), (3, 3)]
            .into_iter()
            .map(RevisionLink::from)
            .collect();
        assert!(is_single_chain(&links, 3));
        assert!(is_single_chain(&[], 0));
        assert!(!is_single_chain(&links[1..], 3));
        assert!(!is_single_chain(&links[..2], 3));
    }

    #[test]
    fn repairs_two_chains_with_one_write() {
        let mut store = store_with("X", &[(1, 3), (4, 6)]);
        let chain = validated(&store, "X");

        let applied = ChainRepairer::new(&mut store, RepairConfig::default())
            .repair(&chain)
            .unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].correction, CorrectedLink::new(3, 4, 6));
        assert_eq!(applied[0].cascaded, vec!["X-1", "X-2", "X-3"]);
        assert_eq!(store.load_count(), 1);
        assert_eq!(store.get("X-4").map(|doc| doc.prev), Some(3));
        assert!(store.records().iter().all(|doc| doc.last == 6));
    }

    #[test]
    fn linked_chain_is_left_alone() {
        let mut store = store_with("Y", &[(1, 2)]);
        let chain = validated(&store, "Y");
        let applied = ChainRepairer::new(&mut store, RepairConfig::default())
            .repair(&chain)
            .unwrap();
        assert!(applied.is_empty());
        assert_eq!(store.load_count(), 0);
    }

    #[test]
    fn content_passes_through_untouched() {
        let mut store = store_with("X", &[(1, 1), (2, 2)]);
        let chain = validated(&store, "X");
        ChainRepairer::new(&mut store, RepairConfig::default())
            .repair(&chain)
            .unwrap();
        assert_eq!(store.get("X-2").map(|doc| doc.content.as_str()), Some("i am X-2"));
    }

    /// A store whose loads never cascade, so repairs cannot converge.
    struct NoCascade(MemStore);

    impl RecordStore for NoCascade {
        fn doc_names(&self) -> Vec<String> {
            self.0.doc_names()
        }
        fn last_revs(&self, name: &str) -> Result<Vec<RevisionLink>> {
            self.0.last_revs(name)
        }
        fn doc_dump(&self, name: &str, rev: i64) -> Result<DocDump> {
            self.0.doc_dump(name, rev)
        }
        fn load(&mut self, dump: &DocDump, _options: LoadOptions) -> Result<LoadOutcome> {
            self.0.load(dump, LoadOptions::without_cascade())
        }
        fn records(&self) -> Vec<DocRecord> {
            self.0.records()
        }
    }

    #[test]
    fn missing_cascade_is_caught_by_verification() {
        let mut store = NoCascade(store_with("X", &[(1, 3), (4, 6)]));
        let chain = validated(&store.0, "X");

        let err = ChainRepairer::new(&mut store, RepairConfig::default())
            .repair(&chain)
            .unwrap_err();
        assert!(matches!(
            err,
            SarosError::RepairDidNotConverge { ref name, ref links }
                if name == "X" && links[0] == (1, 3)
        ));

        let mut store = NoCascade(store_with("X", &[(1, 3), (4, 6)]));
        let unverified = RepairConfig::default().with_verify_convergence(false);
        let applied = ChainRepairer::new(&mut store, unverified)
            .repair(&chain)
            .unwrap();
        assert_eq!(applied.len(), 1);
    }

    #[test]
    fn single_chain_must_close_at_the_final_revision() {
        let linked = [RevisionLink::new(1, 3), RevisionLink::new(2, 3), RevisionLink::new(3, 3)];
        assert!(is_single_chain(&linked, 3));
        assert!(!is_single_chain(&linked, 4));
        assert!(!is_single_chain(&linked[..2], 3));
        assert!(is_single_chain(&[], 0));
    }
}
