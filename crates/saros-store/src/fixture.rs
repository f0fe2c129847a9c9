//! The reference Saros repository used by tests and demos.
//!
//! Five documents, `JE00` through `JE04`. `JE00` has three sub-chains, `JE02`
//! and `JE04` two each, `JE01` and `JE03` are already linked.

use saros_types::DocRecord;

use crate::memory::MemStore;

/// `(name, [(first rev, last)])` per document, before linking.
const CHAINS: &[(&str, &[(i64, i64)])] = &[
    ("JE00", &[(1, 3), (4, 6), (7, 8)]),
    ("JE01", &[(1, 2)]),
    ("JE02", &[(1, 4), (5, 7)]),
    ("JE03", &[(1, 1)]),
    ("JE04", &[(1, 1), (2, 2)]),
];

fn content(name: &str, rev: i64) -> String {
    format!("i am {name}-{rev}")
}

/// Records of the reference repository as uploaded, broken links included.
#[must_use]
pub fn unlinked_records() -> Vec<DocRecord> {
    let mut records = Vec::new();
    for &(name, chains) in CHAINS {
        for &(first, last) in chains {
            for rev in first..=last {
                let prev = if rev == first { 0 } else { rev - 1 };
                records.push(DocRecord::new(name, rev, prev, last, content(name, rev)));
            }
        }
    }
    records
}

/// Records of the reference repository once every chain is linked.
#[must_use]
pub fn linked_records() -> Vec<DocRecord> {
    let mut records = Vec::new();
    for &(name, chains) in CHAINS {
        let last = chains.last().map_or(0, |&(_, last)| last);
        for rev in 1..=last {
            records.push(DocRecord::new(name, rev, rev - 1, last, content(name, rev)));
        }
    }
    records
}

/// A fresh store holding [`unlinked_records`].
#[must_use]
pub fn saros_fixture() -> MemStore {
    MemStore::from_records(unlinked_records())
}
