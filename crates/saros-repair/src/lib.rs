//! Detection and repair of broken revision links.
//!
//! A document is repaired in two steps. [`validate_chain`] sorts the
//! document's `(rev, last)` pairs and rejects anything that is not a run of
//! complete sub-chains; [`ChainRepairer`] then fixes each sub-chain boundary
//! through the store's dump/load path. [`RepairDriver`] does both for every
//! document in a store.

pub mod chain;
pub mod config;
pub mod driver;
pub mod repair;

pub use chain::{BrokenPair, ValidatedChain, validate_chain};
pub use config::RepairConfig;
pub use driver::{NameOutcome, PassState, RepairDriver, RepairReport};
pub use repair::{AppliedCorrection, ChainRepairer};
