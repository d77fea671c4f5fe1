use crate::amount::{keyset_amounts, Unit};
use crate::crypto::{CurvePoint, MintSecret};
use crate::helpers::Timestamp;
use crate::keyset::derivation::{derivation_path, derive_secrets, legacy_path, parse_derivation_path, MasterKey};
use crate::keyset::id::{keyset_id, IdVersion, KeysetId};
use crate::keyset::KeysetError;
use log::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The persisted descriptor a keyset is derived from. Only `active` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    pub id: KeysetId,
    pub unit: Unit,
    pub version: u32,
    pub input_fee_ppk: u64,
    pub active: bool,
    pub amounts: Vec<u64>,
    pub derivation_path: String,
    #[serde(default)]
    pub legacy: bool,
    #[serde(default)]
    pub id_version: IdVersion,
    #[serde(default)]
    pub final_expiry: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Per-seed settings chosen by whoever creates the seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedParams {
    pub input_fee_ppk: u64,
    pub id_version: IdVersion,
    pub final_expiry: Option<Timestamp>,
}

impl Seed {
    /// A fresh active seed at `version`, with its id computed from the derived keys.
    pub fn new(master: &MasterKey, unit: Unit, version: u32, params: SeedParams) -> Result<Self, KeysetError> {
        let mut seed = Seed {
            id: KeysetId::from(""),
            unit,
            version,
            input_fee_ppk: params.input_fee_ppk,
            active: true,
            amounts: keyset_amounts(unit),
            derivation_path: derivation_path(unit, version),
            legacy: false,
            id_version: params.id_version,
            final_expiry: params.final_expiry,
            created_at: Timestamp::now(),
        };
        let keys = seed.derive_keys(master)?;
        seed.id = seed.compute_id(&keys)?;
        debug!("Created {unit} seed version {version} with id {}", seed.id);
        Ok(seed)
    }

    /// Derives the keyset, checking that it reproduces the stored id.
    ///
    /// Panics on a mismatch: the store holds a seed this master key did not create, and signing with it would
    /// issue tokens nobody can redeem.
    pub fn derive_keyset(&self, master: &MasterKey) -> Result<Keyset, KeysetError> {
        let keys = self.derive_keys(master)?;
        let id = self.compute_id(&keys)?;
        if id != self.id {
            panic!("Seed id mismatch. Stored: {}. Derived: {id}", self.id);
        }
        let keys = self
            .amounts
            .iter()
            .zip(keys)
            .map(|(amount, secret)| {
                let pubkey = secret.public_key();
                (*amount, MintKey { amount: *amount, secret, pubkey })
            })
            .collect();
        Ok(Keyset { seed: self.clone(), keys })
    }

    fn derive_keys(&self, master: &MasterKey) -> Result<Vec<MintSecret>, KeysetError> {
        let path = if self.legacy {
            legacy_path(self.unit, self.version)?
        } else {
            parse_derivation_path(&self.derivation_path)?
        };
        derive_secrets(master, &path, self.amounts.len(), self.legacy)
    }

    fn compute_id(&self, keys: &[MintSecret]) -> Result<KeysetId, KeysetError> {
        let mut pairs: Vec<(u64, CurvePoint)> = self.amounts.iter().copied().zip(keys.iter().map(MintSecret::public_key)).collect();
        pairs.sort_by_key(|(amount, _)| *amount);
        let pubkeys: Vec<CurvePoint> = pairs.into_iter().map(|(_, key)| key).collect();
        keyset_id(self.id_version, &pubkeys, self.unit, self.final_expiry)
    }
}

/// A single denomination's key pair.
#[derive(Debug, Clone)]
pub struct MintKey {
    pub amount: u64,
    pub(crate) secret: MintSecret,
    pub pubkey: CurvePoint,
}

/// All keys derived from one seed, indexed by amount.
#[derive(Debug, Clone)]
pub struct Keyset {
    pub seed: Seed,
    pub keys: BTreeMap<u64, MintKey>,
}

impl Keyset {
    pub fn id(&self) -> &KeysetId {
        &self.seed.id
    }

    pub fn unit(&self) -> Unit {
        self.seed.unit
    }

    pub fn is_active(&self) -> bool {
        self.seed.active
    }

    pub fn key(&self, amount: u64) -> Option<&MintKey> {
        self.keys.get(&amount)
    }

    /// Public keys by amount, ascending.
    pub fn public_keys(&self) -> BTreeMap<u64, CurvePoint> {
        self.keys.iter().map(|(amount, key)| (*amount, key.pubkey)).collect()
    }
}
