use crate::amount::Unit;
use crate::keyset::derivation::MasterKey;
use crate::keyset::id::KeysetId;
use crate::keyset::seed::{Keyset, MintKey, Seed};
use crate::keyset::KeysetError;
use std::collections::HashMap;
use std::sync::Arc;

/// An immutable view of every keyset the signer knows, rebuilt wholesale on rotation.
#[derive(Debug, Clone, Default)]
pub struct KeysetSnapshot {
    keysets: HashMap<KeysetId, Arc<Keyset>>,
    active: HashMap<Unit, KeysetId>,
}

impl KeysetSnapshot {
    pub fn from_seeds(master: &MasterKey, seeds: &[Seed]) -> Result<Self, KeysetError> {
        let mut snapshot = KeysetSnapshot::default();
        for seed in seeds {
            let keyset = seed.derive_keyset(master)?;
            if keyset.is_active() {
                snapshot.active.insert(keyset.unit(), keyset.id().clone());
            }
            snapshot.keysets.insert(keyset.id().clone(), Arc::new(keyset));
        }
        Ok(snapshot)
    }

    pub fn get(&self, id: &KeysetId) -> Option<&Arc<Keyset>> {
        self.keysets.get(id)
    }

    /// The key for `(id, amount)`, whether or not the keyset is still active.
    pub fn key(&self, id: &KeysetId, amount: u64) -> Option<(&Keyset, &MintKey)> {
        let keyset = self.keysets.get(id)?;
        keyset.key(amount).map(|key| (keyset.as_ref(), key))
    }

    pub fn active_for(&self, unit: Unit) -> Option<&Arc<Keyset>> {
        self.active.get(&unit).and_then(|id| self.keysets.get(id))
    }

    pub fn active(&self) -> impl Iterator<Item = &Arc<Keyset>> {
        self.active.values().filter_map(|id| self.keysets.get(id))
    }

    pub fn all(&self) -> impl Iterator<Item = &Arc<Keyset>> {
        self.keysets.values()
    }

    pub fn len(&self) -> usize {
        self.keysets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keysets.is_empty()
    }
}
