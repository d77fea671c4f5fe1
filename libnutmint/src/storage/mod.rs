//! Persistence for proofs, seeds, recovery signatures and quotes.
//!
//! Every read and write goes through a [`StoreTransaction`]. A transaction holds the store exclusively until it is
//! committed or dropped; dropping it without committing discards every staged change.

mod file_store;
mod memory;
mod traits;

pub use file_store::FileStore;
pub use memory::{MemoryStore, StagedTransaction, StoreState};
pub use traits::{MintStore, StoreTransaction};

use crate::crypto::CurvePoint;
use crate::keyset::KeysetId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not serialize the store: {0}")]
    Serialize(#[from] ron::Error),
    #[error("Could not read the store file: {0}")]
    Deserialize(#[from] ron::error::SpannedError),
    #[error("The store lock was poisoned by a panicking writer")]
    LockPoisoned,
    #[error("A proof with Y = {0} is already stored")]
    DuplicateProof(CurvePoint),
    #[error("A seed with id {0} is already stored")]
    DuplicateSeed(KeysetId),
    #[error("No seed with id {0}")]
    SeedNotFound(KeysetId),
}
