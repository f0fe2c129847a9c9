//! Core type definitions shared by the Saros store and the link repairer.

pub mod link;
pub mod record;
pub mod schema;

pub use link::{CorrectedLink, RevisionLink};
pub use record::{DocRecord, doc_id};
pub use schema::{Column, ColumnType};
