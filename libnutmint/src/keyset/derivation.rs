//! BIP-32 derivation of per-amount mint keys.
//!
//! Current seeds follow `master / 129372' / unit_int' / version' / i'`. Legacy seeds follow
//! `master / unit_index / version / i`, all unhardened.

use crate::amount::Unit;
use crate::crypto::MintSecret;
use crate::keyset::KeysetError;
use bip32::{ChildNumber, XPrv};
use sha2::{Digest, Sha256};
use std::fmt::Debug;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

/// U+1F95C, the peanut emoji, as the purpose segment of every derivation path.
pub const PEANUT_PURPOSE: u32 = 129_372;

/// The BIP-32 master key built from the raw mint private key bytes.
pub struct MasterKey(XPrv);

impl MasterKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeysetError> {
        Ok(Self(XPrv::new(bytes)?))
    }

    pub fn from_hex(hex: &str) -> Result<Self, KeysetError> {
        let bytes = Zeroizing::new(hex::decode(hex.trim()).map_err(|_| KeysetError::InvalidMasterKey)?);
        Self::from_bytes(&bytes)
    }

    /// The key the signer identifies itself with.
    pub fn signer_secret(&self) -> Result<MintSecret, KeysetError> {
        secret_of(&self.0)
    }

    fn derive(&self, steps: &[ChildNumber]) -> Result<XPrv, KeysetError> {
        let mut key = self.0.clone();
        for step in steps {
            key = key.derive_child(*step)?;
        }
        Ok(key)
    }
}

impl Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey")
    }
}

/// Normalises a unit string (trim, NFC, upper case) and maps it onto a 31-bit integer.
pub fn unit_to_index(unit: &str) -> u32 {
    let normalized = unit.trim().nfc().collect::<String>().to_uppercase();
    let hash = Sha256::digest(normalized.as_bytes());
    let head = u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]]);
    head & !(1 << 31)
}

/// `129372'/{unit_int}'/{version}'`
pub fn derivation_path(unit: Unit, version: u32) -> String {
    format!("{PEANUT_PURPOSE}'/{}'/{version}'", unit_to_index(unit.as_str()))
}

/// Parses `a'/b/c'` into child numbers. A trailing `'` marks a hardened step; a leading `m` is not accepted.
pub fn parse_derivation_path(path: &str) -> Result<Vec<ChildNumber>, KeysetError> {
    path.split('/')
        .map(|segment| {
            let (index, hardened) = match segment.strip_suffix('\'') {
                Some(index) => (index, true),
                None => (segment, false),
            };
            let index = index.parse::<u32>().map_err(|_| KeysetError::InvalidDerivationPath(path.to_string()))?;
            ChildNumber::new(index, hardened).map_err(|_| KeysetError::InvalidDerivationPath(path.to_string()))
        })
        .collect()
}

/// Derives one secret per amount position under `path`, hardened unless `legacy`.
pub fn derive_secrets(
    master: &MasterKey,
    path: &[ChildNumber],
    count: usize,
    legacy: bool,
) -> Result<Vec<MintSecret>, KeysetError> {
    let parent = master.derive(path)?;
    (0..count)
        .map(|i| {
            let index = u32::try_from(i).map_err(|_| KeysetError::InvalidDerivationPath(format!("index {i}")))?;
            let child = parent.derive_child(ChildNumber::new(index, !legacy)?)?;
            secret_of(&child)
        })
        .collect()
}

/// The unhardened parent path legacy seeds derive from.
pub fn legacy_path(unit: Unit, version: u32) -> Result<Vec<ChildNumber>, KeysetError> {
    Ok(vec![ChildNumber::new(unit.enum_index(), false)?, ChildNumber::new(version, false)?])
}

fn secret_of(key: &XPrv) -> Result<MintSecret, KeysetError> {
    let bytes = Zeroizing::new(key.to_bytes());
    Ok(MintSecret::from_bytes(&bytes)?)
}
