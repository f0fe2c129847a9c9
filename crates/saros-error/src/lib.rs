use std::ops::RangeInclusive;

use thiserror::Error;

/// Raw `(column, value)` pairs exactly as parsed from a document dump.
///
/// Carried by schema and data errors so a rejected load can be diagnosed
/// without re-reading the dump.
pub type RawFields = Vec<(String, String)>;

/// A `(rev, last)` pair as seen by the chain validator.
pub type LinkPair = (i64, i64);

/// Inclusive `(first, through)` bounds of a run of absent revisions.
///
/// Chain errors carry bounds rather than every revision number, so an
/// error stays small however far apart the offending revisions are.
pub type RevisionSpan = (i64, i64);

/// Primary error type for Saros operations.
///
/// Variants are grouped by [`ErrorKind`]. Each one carries the document id or
/// name plus the offending revisions, so callers never have to query the
/// store again to explain a failure.
#[derive(Error, Debug)]
pub enum SarosError {
    // === Schema Errors ===
    /// A dump line is not a `<tag>value</tag>` element.
    #[error("malformed dump element at line {line}: {element:?}")]
    MalformedElement { line: usize, element: String },

    /// A schema column is absent from the dump.
    #[error("db column '{column}' missing in dump {fields:?}")]
    MissingColumn {
        column: &'static str,
        fields: RawFields,
    },

    /// A schema column appears more than once.
    #[error("db column '{column}' duplicated {count} times in dump {fields:?}")]
    DuplicateColumn {
        column: &'static str,
        count: usize,
        fields: RawFields,
    },

    /// A schema column is present at the wrong position.
    #[error(
        "db column '{column}' in wrong order: expected position {expected}, found {found} in dump {fields:?}"
    )]
    ColumnPositionMismatch {
        column: &'static str,
        expected: usize,
        found: usize,
        fields: RawFields,
    },

    /// The last schema column is followed by foreign fields.
    #[error(
        "the last column is not '{column}': dump has {found} fields, schema has {expected} in dump {fields:?}"
    )]
    SchemaSizeMismatch {
        column: &'static str,
        expected: usize,
        found: usize,
        fields: RawFields,
    },

    /// A column value does not have the schema's data type.
    #[error("db column '{column}' data type wrong: {value:?} is not an integer in dump {fields:?}")]
    BadDataType {
        column: &'static str,
        value: String,
        fields: RawFields,
    },

    // === Data Errors ===
    /// Document name is empty or whitespace.
    #[error("doc name is whitespace or empty for id {id:?}")]
    BadName { id: String, fields: RawFields },

    /// Revision is below 1.
    #[error("doc {id:?}: revision {rev} < 1")]
    BadRevision {
        id: String,
        rev: i64,
        fields: RawFields,
    },

    /// The id is not `name-rev`.
    #[error("doc id {id:?} does not match name {name:?} and revision {rev}")]
    BadId {
        id: String,
        name: String,
        rev: i64,
        fields: RawFields,
    },

    /// The previous revision is neither 0 nor `rev - 1`.
    #[error("doc {id:?}: previous revision {prev} is neither 0 nor {rev} - 1")]
    BadPrev {
        id: String,
        rev: i64,
        prev: i64,
        fields: RawFields,
    },

    /// The last revision is below the revision.
    #[error("doc {id:?}: last revision {last} < revision {rev}")]
    BadLast {
        id: String,
        rev: i64,
        last: i64,
        fields: RawFields,
    },

    // === Chain Errors ===
    /// A link with `rev <= 0` or `last <= 0`.
    #[error("document {name:?}: non-positive link {link:?}")]
    NonPositiveLink { name: String, link: LinkPair },

    /// A link with `last < rev`.
    #[error("document {name:?}: last below revision in link {link:?}")]
    LastBelowRevision { name: String, link: LinkPair },

    /// Two links share a revision number.
    #[error("document {name:?}: duplicate revision in links {previous:?} and {link:?}")]
    DuplicateLink {
        name: String,
        previous: LinkPair,
        link: LinkPair,
    },

    /// Adjacent links skip one or more revision numbers.
    #[error(
        "document {name:?}: non-consecutive revisions {previous:?} -> {link:?}, missing revisions {}..={}",
        .missing.0,
        .missing.1
    )]
    NonConsecutiveRevisions {
        name: String,
        previous: LinkPair,
        link: LinkPair,
        missing: RevisionSpan,
    },

    /// A link's `last` is below its predecessor's `last`.
    #[error("document {name:?}: decreasing last {previous:?} -> {link:?}")]
    DecreasingLast {
        name: String,
        previous: LinkPair,
        link: LinkPair,
    },

    /// The chain ending at `previous` never reached its declared `last`.
    ///
    /// The absent links are `(r, previous.1)` for every `r` in `missing`.
    #[error(
        "document {name:?}: chain ending at {previous:?} is incomplete before {link:?}, missing revisions {}..={}",
        .missing.0,
        .missing.1
    )]
    MissingLinksInPrecedingChain {
        name: String,
        previous: LinkPair,
        link: LinkPair,
        missing: RevisionSpan,
    },

    /// The final chain stops short of its declared `last`.
    #[error(
        "document {name:?}: chain ends at {link:?}, missing revisions {}..={}",
        .missing.0,
        .missing.1
    )]
    MissingLinksAtEnd {
        name: String,
        link: LinkPair,
        missing: RevisionSpan,
    },

    /// A computed correction violates `rev > 0`, `rev == prev + 1` or `last >= rev`.
    #[error(
        "document {name:?}: invalid revision link prev: {prev}, rev: {rev}, last: {last} (rev <= 0 or rev != prev + 1 or last < rev)"
    )]
    InvalidCorrection {
        name: String,
        prev: i64,
        rev: i64,
        last: i64,
    },

    /// Links still form more than one chain after every correction was applied.
    #[error("document {name:?}: links did not converge to a single chain: {links:?}")]
    RepairDidNotConverge { name: String, links: Vec<LinkPair> },

    // === Lookup Errors ===
    /// No record exists for the id.
    #[error("doc id {id:?} generated from name and revision does not exist in the db")]
    NoSuchDocId { id: String },

    // === I/O Errors ===
    /// Dump file I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Internal Errors ===
    /// Internal logic error (should never happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of [`SarosError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed transport data; raised before any store mutation.
    Schema,
    /// Well-formed but semantically invalid record.
    Data,
    /// Structural violation in a document's revision links.
    Chain,
    /// Reference to a record that does not exist.
    Lookup,
    /// Filesystem failure during dump exchange.
    Io,
    /// Logic error.
    Internal,
}

impl SarosError {
    /// Classify this error.
    #[allow(clippy::match_same_arms)]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedElement { .. }
            | Self::MissingColumn { .. }
            | Self::DuplicateColumn { .. }
            | Self::ColumnPositionMismatch { .. }
            | Self::SchemaSizeMismatch { .. }
            | Self::BadDataType { .. } => ErrorKind::Schema,
            Self::BadName { .. }
            | Self::BadRevision { .. }
            | Self::BadId { .. }
            | Self::BadPrev { .. }
            | Self::BadLast { .. } => ErrorKind::Data,
            Self::NonPositiveLink { .. }
            | Self::LastBelowRevision { .. }
            | Self::DuplicateLink { .. }
            | Self::NonConsecutiveRevisions { .. }
            | Self::DecreasingLast { .. }
            | Self::MissingLinksInPrecedingChain { .. }
            | Self::MissingLinksAtEnd { .. }
            | Self::InvalidCorrection { .. }
            | Self::RepairDidNotConverge { .. } => ErrorKind::Chain,
            Self::NoSuchDocId { .. } => ErrorKind::Lookup,
            Self::Io(_) => ErrorKind::Io,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether revisions are absent from a document's sequence.
    ///
    /// A gap between adjacent revisions counts: once links are sorted by
    /// revision, a skipped number is a missing link.
    pub const fn is_missing_links(&self) -> bool {
        matches!(
            self,
            Self::NonConsecutiveRevisions { .. }
                | Self::MissingLinksInPrecedingChain { .. }
                | Self::MissingLinksAtEnd { .. }
        )
    }

    /// Revision numbers reported missing, as an inclusive range.
    ///
    /// `None` for variants that do not report absent revisions.
    pub const fn missing_revisions(&self) -> Option<RangeInclusive<i64>> {
        match self {
            Self::NonConsecutiveRevisions { missing, .. }
            | Self::MissingLinksInPrecedingChain { missing, .. }
            | Self::MissingLinksAtEnd { missing, .. } => Some(missing.0..=missing.1),
            _ => None,
        }
    }

    /// Document name the error refers to, when it is known.
    pub fn document_name(&self) -> Option<&str> {
        match self {
            Self::NonPositiveLink { name, .. }
            | Self::LastBelowRevision { name, .. }
            | Self::DuplicateLink { name, .. }
            | Self::NonConsecutiveRevisions { name, .. }
            | Self::DecreasingLast { name, .. }
            | Self::MissingLinksInPrecedingChain { name, .. }
            | Self::MissingLinksAtEnd { name, .. }
            | Self::InvalidCorrection { name, .. }
            | Self::RepairDidNotConverge { name, .. }
            | Self::BadId { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Human-friendly suggestion for fixing this error.
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self.kind() {
            ErrorKind::Schema => {
                Some("Re-export the document and edit only the prev/last values in place")
            }
            ErrorKind::Data => Some("Check id, name, rev, prev and last against the db schema"),
            ErrorKind::Chain => Some("Re-upload the missing or conflicting revisions, then re-link"),
            ErrorKind::Lookup => Some("Check the document name and revision"),
            ErrorKind::Io | ErrorKind::Internal => None,
        }
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a lookup error for `id`.
    pub fn no_such_doc(id: impl Into<String>) -> Self {
        Self::NoSuchDocId { id: id.into() }
    }
}

/// Result type alias using `SarosError`.
pub type Result<T> = std::result::Result<T, SarosError>;
