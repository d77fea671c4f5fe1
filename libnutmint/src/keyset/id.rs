use crate::amount::Unit;
use crate::crypto::CurvePoint;
use crate::helpers::Timestamp;
use crate::keyset::KeysetError;
use log::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Display;
use std::str::FromStr;

/// A keyset identifier as it appears on the wire: `00` + 14 hex chars, or `01` + 64 hex chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeysetId(String);

impl KeysetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id scheme, read off the version prefix.
    pub fn version(&self) -> Option<IdVersion> {
        match self.0.get(..2) {
            Some("00") => Some(IdVersion::Legacy),
            Some("01") => Some(IdVersion::V2),
            _ => None,
        }
    }
}

impl Display for KeysetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeysetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for KeysetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdVersion {
    #[default]
    Legacy,
    V2,
}

impl FromStr for IdVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "legacy" | "00" => Ok(IdVersion::Legacy),
            "v2" | "01" => Ok(IdVersion::V2),
            other => Err(format!("Unknown keyset id version: {other}")),
        }
    }
}

/// `"00"` + the first 14 hex chars of `sha256(K_1 ‖ … ‖ K_n)`.
///
/// `pubkeys` must already be sorted by amount.
pub fn derive_keyset_id(pubkeys: &[CurvePoint]) -> Result<KeysetId, KeysetError> {
    let hash = hash_pubkeys(pubkeys, &[])?;
    Ok(KeysetId(format!("00{}", &hex::encode(hash)[..14])))
}

/// `"01"` + hex `sha256(K_1 ‖ … ‖ K_n ‖ "unit:" unit [‖ "final_expiry:" unix])`.
pub fn derive_keyset_id_v2(
    pubkeys: &[CurvePoint],
    unit: Unit,
    final_expiry: Option<Timestamp>,
) -> Result<KeysetId, KeysetError> {
    let mut salt = format!("unit:{unit}").into_bytes();
    if let Some(expiry) = final_expiry {
        salt.extend_from_slice(format!("final_expiry:{}", expiry.as_secs()).as_bytes());
    }
    Ok(KeysetId(format!("01{}", hex::encode(hash_pubkeys(pubkeys, &salt)?))))
}

pub fn keyset_id(
    version: IdVersion,
    pubkeys: &[CurvePoint],
    unit: Unit,
    final_expiry: Option<Timestamp>,
) -> Result<KeysetId, KeysetError> {
    match version {
        IdVersion::Legacy => derive_keyset_id(pubkeys),
        IdVersion::V2 => derive_keyset_id_v2(pubkeys, unit, final_expiry),
    }
}

fn hash_pubkeys(pubkeys: &[CurvePoint], salt: &[u8]) -> Result<[u8; 32], KeysetError> {
    if pubkeys.is_empty() {
        error!("Keyset id requested for a keyset without public keys");
        return Err(KeysetError::EmptyKeyset);
    }
    let mut hasher = Sha256::new();
    for key in pubkeys {
        hasher.update(key.as_bytes());
    }
    hasher.update(salt);
    Ok(hasher.finalize().into())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::MintSecret;

    fn keys(n: u8) -> Vec<CurvePoint> {
        (1..=n)
            .map(|i| {
                let mut bytes = [0u8; 32];
                bytes[31] = i;
                MintSecret::from_bytes(&bytes).unwrap().public_key()
            })
            .collect()
    }

    #[test]
    fn legacy_id_shape() {
        let id = derive_keyset_id(&keys(4)).unwrap();
        assert_eq!(id.as_str().len(), 16);
        assert!(id.as_str().starts_with("00"));
        assert_eq!(id.version(), Some(IdVersion::Legacy));
    }

    #[test]
    fn legacy_id_of_generator() {
        let g = CurvePoint::from_hex("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798").unwrap();
        let expected = hex::encode(Sha256::digest(g.as_bytes()));
        assert_eq!(derive_keyset_id(&[g]).unwrap().as_str(), format!("00{}", &expected[..14]));
    }

    #[test]
    fn id_depends_on_every_key() {
        let mut pubkeys = keys(5);
        let id = derive_keyset_id(&pubkeys).unwrap();
        pubkeys[3] = keys(6)[5];
        assert_ne!(derive_keyset_id(&pubkeys).unwrap(), id);
        pubkeys.swap(0, 1);
        let swapped = derive_keyset_id(&pubkeys).unwrap();
        pubkeys.swap(0, 1);
        assert_ne!(derive_keyset_id(&pubkeys).unwrap(), swapped);
    }

    #[test]
    fn v2_id_salts() {
        let pubkeys = keys(3);
        let sat = derive_keyset_id_v2(&pubkeys, Unit::Sat, None).unwrap();
        assert_eq!(sat.as_str().len(), 66);
        assert_eq!(sat.version(), Some(IdVersion::V2));
        assert_ne!(sat, derive_keyset_id_v2(&pubkeys, Unit::Msat, None).unwrap());
        assert_ne!(sat, derive_keyset_id_v2(&pubkeys, Unit::Sat, Some(Timestamp::new(2_000_000_000))).unwrap());

        let mut preimage: Vec<u8> = pubkeys.iter().flat_map(|k| k.as_bytes().to_vec()).collect();
        preimage.extend_from_slice(b"unit:sat");
        assert_eq!(sat.as_str(), format!("01{}", hex::encode(Sha256::digest(&preimage))));
    }

    #[test]
    fn empty_keyset_has_no_id() {
        assert!(matches!(derive_keyset_id(&[]), Err(KeysetError::EmptyKeyset)));
        assert!(matches!(derive_keyset_id_v2(&[], Unit::Sat, None), Err(KeysetError::EmptyKeyset)));
    }

    #[test]
    fn parse_id_version() {
        assert_eq!("legacy".parse::<IdVersion>().unwrap(), IdVersion::Legacy);
        assert_eq!("v2".parse::<IdVersion>().unwrap(), IdVersion::V2);
        assert!("v3".parse::<IdVersion>().is_err());
        assert_eq!(KeysetId::from("zz").version(), None);
    }
}
