//! Structural validation of a document's revision links.
//!
//! The store hands back `(rev, last)` pairs in no particular order. They are
//! sorted by revision and each link is checked against its predecessor, with
//! [`RevisionLink::DUMMY`] standing in before revision 1. Per link the checks
//! run in a fixed order and the first violation aborts:
//!
//! 1. `rev <= 0` or `last <= 0`
//! 2. `last < rev`
//! 3. same revision as the predecessor
//! 4. revision is not the predecessor's plus one
//! 5. `last` below the predecessor's `last`
//! 6. a new chain starts while the predecessor's chain still expected
//!    revisions past it
//!
//! Finally the last link must close its chain (`rev == last`).
//!
//! A chain that passes is a run of sub-chains, contiguous from revision 1,
//! where each sub-chain ends exactly at its declared `last`. The first link of
//! every sub-chain after the first is a broken link.

use saros_error::{Result, SarosError};
use saros_types::{CorrectedLink, RevisionLink};
use serde::Serialize;

/// A pair of adjacent links whose `last` values disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrokenPair {
    /// Final link of the earlier sub-chain.
    pub previous: RevisionLink,
    /// First link of the later sub-chain; its record has the wrong `prev`.
    pub link: RevisionLink,
}

impl BrokenPair {
    /// The linkage `link` should carry.
    #[must_use]
    pub const fn correction(&self) -> CorrectedLink {
        CorrectedLink::new(self.previous.rev, self.link.rev, self.link.last)
    }
}

/// Links of one document that passed structural validation, sorted by
/// revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedChain {
    name: String,
    links: Vec<RevisionLink>,
}

impl ValidatedChain {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn links(&self) -> &[RevisionLink] {
        &self.links
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Every adjacent pair whose `last` values differ, ascending.
    #[must_use]
    pub fn broken_pairs(&self) -> Vec<BrokenPair> {
        self.links
            .windows(2)
            .filter(|pair| !pair[1].is_linked_to(pair[0]))
            .map(|pair| BrokenPair {
                previous: pair[0],
                link: pair[1],
            })
            .collect()
    }

    /// Whether the document already forms a single chain.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.links
            .windows(2)
            .all(|pair| pair[1].is_linked_to(pair[0]))
    }

    /// The `last` every link shares once repaired.
    #[must_use]
    pub fn final_revision(&self) -> Option<i64> {
        self.links.last().map(|link| link.last)
    }
}

/// Sort `links` by revision and check them.
///
/// An empty list validates to an empty chain.
///
/// # Errors
/// The first structural violation found, as one of the chain variants of
/// [`SarosError`].
pub fn validate_chain(name: &str, mut links: Vec<RevisionLink>) -> Result<ValidatedChain> {
    links.sort_unstable();

    let mut pred = RevisionLink::DUMMY;
    for &link in &links {
        check_link(name, pred, link)?;
        pred = link;
    }

    if let Some((end, missing)) = links
        .last()
        .and_then(|&end| end.missing_span().map(|span| (end, span)))
    {
        return Err(SarosError::MissingLinksAtEnd {
            name: name.to_owned(),
            link: end.pair(),
            missing,
        });
    }

    Ok(ValidatedChain {
        name: name.to_owned(),
        links,
    })
}

fn check_link(name: &str, pred: RevisionLink, link: RevisionLink) -> Result<()> {
    if link.rev <= 0 || link.last <= 0 {
        return Err(SarosError::NonPositiveLink {
            name: name.to_owned(),
            link: link.pair(),
        });
    }
    if link.last < link.rev {
        return Err(SarosError::LastBelowRevision {
            name: name.to_owned(),
            link: link.pair(),
        });
    }
    if link.rev == pred.rev {
        return Err(SarosError::DuplicateLink {
            name: name.to_owned(),
            previous: pred.pair(),
            link: link.pair(),
        });
    }
    // Sorted and distinct, so `pred.rev < link.rev` and neither bound overflows.
    if link.rev != pred.rev + 1 {
        return Err(SarosError::NonConsecutiveRevisions {
            name: name.to_owned(),
            previous: pred.pair(),
            link: link.pair(),
            missing: (pred.rev + 1, link.rev - 1),
        });
    }
    if link.last < pred.last {
        return Err(SarosError::DecreasingLast {
            name: name.to_owned(),
            previous: pred.pair(),
            link: link.pair(),
        });
    }
    if let Some(missing) = pred.missing_span().filter(|_| !link.is_linked_to(pred)) {
        return Err(SarosError::MissingLinksInPrecedingChain {
            name: name.to_owned(),
            previous: pred.pair(),
            link: link.pair(),
            missing,
        });
    }
    Ok(())
}
