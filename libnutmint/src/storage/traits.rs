use crate::amount::Unit;
use crate::crypto::CurvePoint;
use crate::keyset::{KeysetId, Seed};
use crate::mint::quote::{MeltQuote, MintQuote};
use crate::mint::types::{BlindedMessage, ProofState, RecoverSig, StoredProof};
use crate::storage::StoreError;

/// A store that hands out exclusive transactions.
pub trait MintStore: Send + Sync {
    type Tx<'a>: StoreTransaction
    where
        Self: 'a;

    /// Blocks until no other transaction is open.
    fn begin(&self) -> Result<Self::Tx<'_>, StoreError>;
}

/// Reads see the transaction's own staged writes. Nothing is visible to other transactions until [`commit`].
///
/// [`commit`]: StoreTransaction::commit
pub trait StoreTransaction {
    fn get_proofs_by_y(&self, ys: &[CurvePoint]) -> Result<Vec<StoredProof>, StoreError>;
    fn get_proofs_by_secret(&self, secrets: &[String]) -> Result<Vec<StoredProof>, StoreError>;
    fn get_proofs_by_quote(&self, quote: &str) -> Result<Vec<StoredProof>, StoreError>;
    /// Fails with [`StoreError::DuplicateProof`] if any Y is already present.
    fn save_proofs(&mut self, proofs: &[StoredProof]) -> Result<(), StoreError>;
    /// Unknown Ys are ignored.
    fn set_proof_state(&mut self, ys: &[CurvePoint], state: ProofState) -> Result<(), StoreError>;
    fn delete_proofs(&mut self, ys: &[CurvePoint]) -> Result<(), StoreError>;

    fn get_seeds(&self, unit: Unit) -> Result<Vec<Seed>, StoreError>;
    fn get_all_seeds(&self) -> Result<Vec<Seed>, StoreError>;
    fn save_seed(&mut self, seed: &Seed) -> Result<(), StoreError>;
    fn set_seed_active(&mut self, id: &KeysetId, active: bool) -> Result<(), StoreError>;

    fn save_recover_sigs(&mut self, sigs: &[RecoverSig]) -> Result<(), StoreError>;
    /// Stored signatures for the given `B'`, in request order, skipping unknown ones.
    fn get_recover_sigs(&self, blinded: &[CurvePoint]) -> Result<Vec<RecoverSig>, StoreError>;

    /// Inserts or replaces.
    fn save_mint_quote(&mut self, quote: &MintQuote) -> Result<(), StoreError>;
    fn get_mint_quote(&self, quote: &str) -> Result<Option<MintQuote>, StoreError>;
    fn get_mint_quote_by_request(&self, request: &str) -> Result<Option<MintQuote>, StoreError>;
    /// Inserts or replaces.
    fn save_melt_quote(&mut self, quote: &MeltQuote) -> Result<(), StoreError>;
    fn get_melt_quote(&self, quote: &str) -> Result<Option<MeltQuote>, StoreError>;

    fn save_melt_change(&mut self, quote: &str, outputs: &[BlindedMessage]) -> Result<(), StoreError>;
    fn get_melt_change(&self, quote: &str) -> Result<Vec<BlindedMessage>, StoreError>;
    fn delete_melt_change(&mut self, quote: &str) -> Result<(), StoreError>;

    fn commit(self) -> Result<(), StoreError>;
}
