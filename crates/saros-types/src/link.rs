//! Revision links: the `(rev, last)` pairs the repairer reasons about.
//!
//! A link says "revision `rev` belongs to a chain whose final revision is
//! `last`". Links are value types; the predecessor relation is contextual and
//! comes from the position of a link in a revision-sorted sequence.

use std::fmt;

use saros_error::{LinkPair, Result, RevisionSpan, SarosError};
use serde::{Deserialize, Serialize};

/// One revision's `(rev, last)` pair.
///
/// Ordering is by `rev`, then `last`, so sorting a slice of links yields
/// ascending revision order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RevisionLink {
    /// Revision number (1-based).
    pub rev: i64,
    /// Final revision of the chain `rev` currently belongs to.
    pub last: i64,
}

impl RevisionLink {
    /// Synthetic predecessor of revision 1.
    pub const DUMMY: Self = Self { rev: 0, last: 0 };

    #[must_use]
    pub const fn new(rev: i64, last: i64) -> Self {
        Self { rev, last }
    }

    /// The link as a plain `(rev, last)` tuple, for error context.
    #[must_use]
    pub const fn pair(self) -> LinkPair {
        (self.rev, self.last)
    }

    /// Whether this link is the final revision of its chain.
    #[must_use]
    pub const fn is_end_of_chain(self) -> bool {
        self.rev >= self.last
    }

    /// Revision expected after this one in the same chain.
    ///
    /// Returns `None` on an end-of-chain link.
    #[must_use]
    pub const fn next_revision(self) -> Option<i64> {
        if self.is_end_of_chain() {
            None
        } else {
            Some(self.rev + 1)
        }
    }

    /// Whether this link belongs to the same chain as `pred`.
    #[must_use]
    pub const fn is_linked_to(self, pred: Self) -> bool {
        self.last == pred.last
    }

    /// Links `(r, last)` for every `r` in `after + 1 ..= through`, lazily.
    ///
    /// Empty when `through <= after`. Never overflows, even at `i64::MAX`.
    pub fn missing_revisions(after: i64, through: i64, last: i64) -> impl Iterator<Item = Self> {
        (after..through).map(move |rev| Self::new(rev + 1, last))
    }

    /// Bounds of the revisions this link's own chain still expects after it.
    #[must_use]
    pub const fn missing_span(self) -> Option<RevisionSpan> {
        match self.next_revision() {
            Some(first) => Some((first, self.last)),
            None => None,
        }
    }
}

impl From<LinkPair> for RevisionLink {
    fn from((rev, last): LinkPair) -> Self {
        Self::new(rev, last)
    }
}

impl fmt::Display for RevisionLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rev, self.last)
    }
}

/// Corrected linkage for a single broken revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectedLink {
    /// The revision's true predecessor.
    pub prev: i64,
    /// The broken revision.
    pub rev: i64,
    /// Final revision of the chain the revision belongs to.
    pub last: i64,
}

impl CorrectedLink {
    #[must_use]
    pub const fn new(prev: i64, rev: i64, last: i64) -> Self {
        Self { prev, rev, last }
    }

    /// Check `rev > 0`, `rev == prev + 1` and `last >= rev`.
    ///
    /// # Errors
    /// Returns `SarosError::InvalidCorrection` naming `name` otherwise.
    pub fn validate(&self, name: &str) -> Result<()> {
        if self.rev <= 0 || self.rev != self.prev + 1 || self.last < self.rev {
            return Err(SarosError::InvalidCorrection {
                name: name.to_owned(),
                prev: self.prev,
                rev: self.rev,
                last: self.last,
            });
        }
        Ok(())
    }
}

impl fmt::Display for CorrectedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "prev: {}, rev: {}, last: {}",
            self.prev, self.rev, self.last
        )
    }
}
