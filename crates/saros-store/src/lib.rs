//! The Saros document repository.
//!
//! Records are only ever written whole: a client asks for a [`DocDump`] of a
//! single revision, edits it, and hands it back to [`RecordStore::load`]. After
//! a load the store raises `last` on every lower revision of the same
//! document (the cascade), unless the caller opts out via [`LoadOptions`].

pub mod dump;
pub mod fixture;
pub mod memory;
pub mod schema;
pub mod traits;

pub use dump::DocDump;
pub use fixture::{linked_records, saros_fixture, unlinked_records};
pub use memory::MemStore;
pub use schema::decode_record;
pub use traits::{LoadOptions, LoadOutcome, RecordStore};
