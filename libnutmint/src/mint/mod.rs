//! Mint orchestration: quotes, swaps, melts, state checks and restores on top of a store, a signer and a
//! Lightning backend.
//!
//! Every operation that moves proofs between states runs inside one store transaction, so a failed request leaves
//! the store exactly as it found it. No store transaction is held across an `.await`.

pub mod error;
pub mod fees;
mod melt;
mod mint_quote;
pub mod quote;
mod settings;
mod state;
mod swap;
#[cfg(test)]
mod tests;
pub mod types;
mod verification;

pub use error::{ErrorResponse, MintError};
pub use melt::{messages_for_change, MeltResponse};
pub use settings::MintSettings;

use crate::keyset::{KeysetId, KeysetInfo, KeysetKeys};
use crate::lightning::LightningBackend;
use crate::signer::Signer;
use crate::storage::MintStore;
use std::sync::Arc;

pub struct Mint<S: MintStore, G: Signer, L: LightningBackend> {
    store: Arc<S>,
    signer: G,
    lightning: L,
    settings: MintSettings,
}

impl<S: MintStore, G: Signer, L: LightningBackend> Mint<S, G, L> {
    pub fn new(store: Arc<S>, signer: G, lightning: L, settings: MintSettings) -> Self {
        Self { store, signer, lightning, settings }
    }

    pub fn settings(&self) -> &MintSettings {
        &self.settings
    }

    pub fn signer(&self) -> &G {
        &self.signer
    }

    pub fn lightning(&self) -> &L {
        &self.lightning
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn keys(&self) -> Result<Vec<KeysetKeys>, MintError> {
        Ok(self.signer.get_active_keys()?)
    }

    pub fn keys_by_id(&self, id: &KeysetId) -> Result<KeysetKeys, MintError> {
        Ok(self.signer.get_keys_by_id(id)?)
    }

    pub fn keysets(&self) -> Result<Vec<KeysetInfo>, MintError> {
        Ok(self.signer.get_keysets()?)
    }
}
