use crate::amount::Unit;
use crate::crypto::CurvePoint;
use crate::keyset::{KeysetId, Seed};
use crate::mint::quote::{MeltQuote, MintQuote};
use crate::mint::types::{BlindedMessage, ProofState, RecoverSig, StoredProof};
use crate::storage::file_store::write_state;
use crate::storage::traits::{MintStore, StoreTransaction};
use crate::storage::StoreError;
use log::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Everything the mint persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    pub proofs: BTreeMap<CurvePoint, StoredProof>,
    pub seeds: Vec<Seed>,
    pub recover_sigs: BTreeMap<CurvePoint, RecoverSig>,
    pub mint_quotes: BTreeMap<String, MintQuote>,
    pub melt_quotes: BTreeMap<String, MeltQuote>,
    pub melt_change: BTreeMap<String, Vec<BlindedMessage>>,
}

impl StoreState {
    fn apply(&mut self, changes: WriteSet) {
        for (y, proof) in changes.proofs {
            match proof {
                Some(proof) => self.proofs.insert(y, proof),
                None => self.proofs.remove(&y),
            };
        }
        if let Some(seeds) = changes.seeds {
            self.seeds = seeds;
        }
        self.recover_sigs.extend(changes.recover_sigs);
        self.mint_quotes.extend(changes.mint_quotes);
        self.melt_quotes.extend(changes.melt_quotes);
        for (quote, outputs) in changes.melt_change {
            match outputs {
                Some(outputs) => self.melt_change.insert(quote, outputs),
                None => self.melt_change.remove(&quote),
            };
        }
    }
}

/// Writes made inside a transaction. `None` marks a deletion.
#[derive(Debug, Default)]
struct WriteSet {
    proofs: BTreeMap<CurvePoint, Option<StoredProof>>,
    seeds: Option<Vec<Seed>>,
    recover_sigs: BTreeMap<CurvePoint, RecoverSig>,
    mint_quotes: BTreeMap<String, MintQuote>,
    melt_quotes: BTreeMap<String, MeltQuote>,
    melt_change: BTreeMap<String, Option<Vec<BlindedMessage>>>,
}

impl WriteSet {
    fn is_empty(&self) -> bool {
        self.proofs.is_empty()
            && self.seeds.is_none()
            && self.recover_sigs.is_empty()
            && self.mint_quotes.is_empty()
            && self.melt_quotes.is_empty()
            && self.melt_change.is_empty()
    }
}

/// A transaction over a [`StoreState`] behind a mutex.
///
/// Reads see the committed state overlaid with the transaction's own writes, which are applied on commit and
/// discarded on drop. The mutex stays locked for the transaction's lifetime, so two transactions can never both see
/// a proof as unspent.
pub struct StagedTransaction<'a> {
    guard: MutexGuard<'a, StoreState>,
    changes: WriteSet,
    persist_to: Option<&'a Path>,
}

impl<'a> StagedTransaction<'a> {
    pub(super) fn begin(state: &'a Mutex<StoreState>, persist_to: Option<&'a Path>) -> Result<Self, StoreError> {
        let guard = state.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(Self { guard, changes: WriteSet::default(), persist_to })
    }

    fn proof(&self, y: &CurvePoint) -> Option<&StoredProof> {
        match self.changes.proofs.get(y) {
            Some(staged) => staged.as_ref(),
            None => self.guard.proofs.get(y),
        }
    }

    fn proofs(&self) -> impl Iterator<Item = &StoredProof> {
        let committed = self.guard.proofs.iter().filter(|(y, _)| !self.changes.proofs.contains_key(*y)).map(|(_, p)| p);
        committed.chain(self.changes.proofs.values().flatten())
    }

    fn seeds(&self) -> &[Seed] {
        self.changes.seeds.as_deref().unwrap_or(self.guard.seeds.as_slice())
    }

    fn seeds_mut(&mut self) -> &mut Vec<Seed> {
        let StagedTransaction { guard, changes, .. } = self;
        changes.seeds.get_or_insert_with(|| guard.seeds.clone())
    }
}

impl StoreTransaction for StagedTransaction<'_> {
    fn get_proofs_by_y(&self, ys: &[CurvePoint]) -> Result<Vec<StoredProof>, StoreError> {
        Ok(ys.iter().filter_map(|y| self.proof(y)).cloned().collect())
    }

    fn get_proofs_by_secret(&self, secrets: &[String]) -> Result<Vec<StoredProof>, StoreError> {
        Ok(self.proofs().filter(|p| secrets.contains(&p.proof.secret)).cloned().collect())
    }

    fn get_proofs_by_quote(&self, quote: &str) -> Result<Vec<StoredProof>, StoreError> {
        Ok(self.proofs().filter(|p| p.quote.as_deref() == Some(quote)).cloned().collect())
    }

    fn save_proofs(&mut self, proofs: &[StoredProof]) -> Result<(), StoreError> {
        if let Some(dup) = proofs.iter().find(|p| self.proof(&p.y).is_some()) {
            return Err(StoreError::DuplicateProof(dup.y));
        }
        for proof in proofs {
            self.changes.proofs.insert(proof.y, Some(proof.clone()));
        }
        Ok(())
    }

    fn set_proof_state(&mut self, ys: &[CurvePoint], state: ProofState) -> Result<(), StoreError> {
        for y in ys {
            if let Some(mut proof) = self.proof(y).cloned() {
                proof.state = state;
                self.changes.proofs.insert(*y, Some(proof));
            }
        }
        Ok(())
    }

    fn delete_proofs(&mut self, ys: &[CurvePoint]) -> Result<(), StoreError> {
        for y in ys {
            self.changes.proofs.insert(*y, None);
        }
        Ok(())
    }

    fn get_seeds(&self, unit: Unit) -> Result<Vec<Seed>, StoreError> {
        Ok(self.seeds().iter().filter(|s| s.unit == unit).cloned().collect())
    }

    fn get_all_seeds(&self) -> Result<Vec<Seed>, StoreError> {
        Ok(self.seeds().to_vec())
    }

    fn save_seed(&mut self, seed: &Seed) -> Result<(), StoreError> {
        if self.seeds().iter().any(|s| s.id == seed.id) {
            return Err(StoreError::DuplicateSeed(seed.id.clone()));
        }
        self.seeds_mut().push(seed.clone());
        Ok(())
    }

    fn set_seed_active(&mut self, id: &KeysetId, active: bool) -> Result<(), StoreError> {
        if !self.seeds().iter().any(|s| &s.id == id) {
            return Err(StoreError::SeedNotFound(id.clone()));
        }
        for seed in self.seeds_mut().iter_mut().filter(|s| &s.id == id) {
            seed.active = active;
        }
        Ok(())
    }

    fn save_recover_sigs(&mut self, sigs: &[RecoverSig]) -> Result<(), StoreError> {
        for sig in sigs {
            self.changes.recover_sigs.insert(sig.blinded, sig.clone());
        }
        Ok(())
    }

    fn get_recover_sigs(&self, blinded: &[CurvePoint]) -> Result<Vec<RecoverSig>, StoreError> {
        let found = blinded
            .iter()
            .filter_map(|b| self.changes.recover_sigs.get(b).or_else(|| self.guard.recover_sigs.get(b)))
            .cloned()
            .collect();
        Ok(found)
    }

    fn save_mint_quote(&mut self, quote: &MintQuote) -> Result<(), StoreError> {
        self.changes.mint_quotes.insert(quote.quote.clone(), quote.clone());
        Ok(())
    }

    fn get_mint_quote(&self, quote: &str) -> Result<Option<MintQuote>, StoreError> {
        Ok(self.changes.mint_quotes.get(quote).or_else(|| self.guard.mint_quotes.get(quote)).cloned())
    }

    fn get_mint_quote_by_request(&self, request: &str) -> Result<Option<MintQuote>, StoreError> {
        let staged = self.changes.mint_quotes.values().find(|q| q.request == request);
        let found = staged.or_else(|| {
            self.guard
                .mint_quotes
                .values()
                .find(|q| q.request == request && !self.changes.mint_quotes.contains_key(&q.quote))
        });
        Ok(found.cloned())
    }

    fn save_melt_quote(&mut self, quote: &MeltQuote) -> Result<(), StoreError> {
        self.changes.melt_quotes.insert(quote.quote.clone(), quote.clone());
        Ok(())
    }

    fn get_melt_quote(&self, quote: &str) -> Result<Option<MeltQuote>, StoreError> {
        Ok(self.changes.melt_quotes.get(quote).or_else(|| self.guard.melt_quotes.get(quote)).cloned())
    }

    fn save_melt_change(&mut self, quote: &str, outputs: &[BlindedMessage]) -> Result<(), StoreError> {
        self.changes.melt_change.insert(quote.to_string(), Some(outputs.to_vec()));
        Ok(())
    }

    fn get_melt_change(&self, quote: &str) -> Result<Vec<BlindedMessage>, StoreError> {
        let outputs = match self.changes.melt_change.get(quote) {
            Some(staged) => staged.as_ref(),
            None => self.guard.melt_change.get(quote),
        };
        Ok(outputs.cloned().unwrap_or_default())
    }

    fn delete_melt_change(&mut self, quote: &str) -> Result<(), StoreError> {
        self.changes.melt_change.insert(quote.to_string(), None);
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        let StagedTransaction { mut guard, changes, persist_to } = self;
        if changes.is_empty() {
            return Ok(());
        }
        match persist_to {
            // the file is rewritten whole, so build the next state aside and only swap it in once it is on disk
            Some(path) => {
                let mut next = guard.clone();
                next.apply(changes);
                write_state(path, &next)?;
                *guard = next;
            }
            None => guard.apply(changes),
        }
        trace!("Store transaction committed");
        Ok(())
    }
}

/// A store that lives and dies with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MintStore for MemoryStore {
    type Tx<'a> = StagedTransaction<'a>;

    fn begin(&self) -> Result<Self::Tx<'_>, StoreError> {
        StagedTransaction::begin(&self.state, None)
    }
}
