//! Document records as stored in the Saros db.

use serde::{Deserialize, Serialize};

use crate::link::RevisionLink;

/// Id of the record for document `name`, revision `rev`.
#[must_use]
pub fn doc_id(name: &str, rev: i64) -> String {
    format!("{name}-{rev}")
}

/// One row of the Saros db: a single revision of a named document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocRecord {
    pub name: String,
    pub rev: i64,
    pub prev: i64,
    pub last: i64,
    pub content: String,
}

impl DocRecord {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        rev: i64,
        prev: i64,
        last: i64,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            rev,
            prev,
            last,
            content: content.into(),
        }
    }

    /// Record id, `name-rev`.
    #[must_use]
    pub fn id(&self) -> String {
        doc_id(&self.name, self.rev)
    }

    /// The record's `(rev, last)` link.
    #[must_use]
    pub const fn link(&self) -> RevisionLink {
        RevisionLink::new(self.rev, self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_joins_name_and_revision() {
        let record = DocRecord::new("JE00", 4, 0, 6, "i am JE00-4");
        assert_eq!(record.id(), "JE00-4");
        assert_eq!(doc_id("JE00", 12), "JE00-12");
        assert_eq!(record.link(), RevisionLink::new(4, 6));
    }
}
