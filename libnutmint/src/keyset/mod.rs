//! Deterministic keysets: derivation paths, ids, seeds and the in-memory snapshot the signer serves from.

pub mod derivation;
pub mod id;
pub mod seed;
pub mod snapshot;

pub use derivation::MasterKey;
pub use id::{derive_keyset_id, derive_keyset_id_v2, IdVersion, KeysetId};
pub use seed::{Keyset, MintKey, Seed, SeedParams};
pub use snapshot::KeysetSnapshot;

use crate::amount::Unit;
use crate::crypto::{CurvePoint, KeyError};
use crate::helpers::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeysetError {
    #[error("Invalid derivation path: {0}")]
    InvalidDerivationPath(String),
    #[error("BIP-32 derivation failed: {0}")]
    Bip32(#[from] bip32::Error),
    #[error("Derived key is not usable: {0}")]
    Key(#[from] KeyError),
    #[error("The mint private key is not valid hex")]
    InvalidMasterKey,
    #[error("A keyset id needs at least one public key")]
    EmptyKeyset,
}

/// Public description of a keyset, as listed to wallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysetInfo {
    pub id: KeysetId,
    pub unit: Unit,
    pub active: bool,
    pub input_fee_ppk: u64,
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_expiry: Option<Timestamp>,
}

impl From<&Seed> for KeysetInfo {
    fn from(seed: &Seed) -> Self {
        Self {
            id: seed.id.clone(),
            unit: seed.unit,
            active: seed.active,
            input_fee_ppk: seed.input_fee_ppk,
            version: seed.version,
            final_expiry: seed.final_expiry,
        }
    }
}

/// A keyset's public keys by amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysetKeys {
    pub id: KeysetId,
    pub unit: Unit,
    pub active: bool,
    pub input_fee_ppk: u64,
    pub keys: BTreeMap<u64, CurvePoint>,
}

impl From<&Keyset> for KeysetKeys {
    fn from(keyset: &Keyset) -> Self {
        Self {
            id: keyset.id().clone(),
            unit: keyset.unit(),
            active: keyset.is_active(),
            input_fee_ppk: keyset.seed.input_fee_ppk,
            keys: keyset.public_keys(),
        }
    }
}
