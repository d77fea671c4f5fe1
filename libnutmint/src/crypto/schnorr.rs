use crate::crypto::keys::{CurvePoint, MintSecret};
use crate::crypto::CryptoError;
use k256::schnorr::{Signature, SigningKey, VerifyingKey};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Debug;

/// A 64-byte BIP-340 signature, hex encoded on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchnorrSignature([u8; 64]);

impl SchnorrSignature {
    pub fn from_hex(hex: &str) -> Result<Self, CryptoError> {
        let mut bytes = [0u8; 64];
        hex::decode_to_slice(hex, &mut bytes).map_err(|_| CryptoError::InvalidSignature)?;
        Ok(Self(bytes))
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl Debug for SchnorrSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl Serialize for SchnorrSignature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for SchnorrSignature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        SchnorrSignature::from_hex(&hex_str).map_err(serde::de::Error::custom)
    }
}

/// `sha256(message)`, the digest every spend-condition signature commits to.
pub fn message_digest(message: &[u8]) -> [u8; 32] {
    Sha256::digest(message).into()
}

/// Signs a 32-byte digest with BIP-340.
pub fn sign<R: CryptoRng + RngCore>(
    rng: &mut R,
    key: &MintSecret,
    digest: &[u8; 32],
) -> Result<SchnorrSignature, CryptoError> {
    let signing_key = SigningKey::from_bytes(key.to_bytes().as_ref()).map_err(|_| CryptoError::InvalidSigningKey)?;
    let mut aux = [0u8; 32];
    rng.fill_bytes(&mut aux);
    let signature = signing_key.sign_raw(digest, &aux).map_err(|_| CryptoError::InvalidSignature)?;
    Ok(SchnorrSignature(signature.to_bytes()))
}

/// Verifies a BIP-340 signature against the x-only form of `pubkey`.
pub fn verify(pubkey: &CurvePoint, digest: &[u8; 32], signature: &SchnorrSignature) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(pubkey.x_only()) else {
        return false;
    };
    let Ok(sig) = Signature::try_from(signature.0.as_slice()) else {
        return false;
    };
    key.verify_raw(digest, &sig).is_ok()
}
