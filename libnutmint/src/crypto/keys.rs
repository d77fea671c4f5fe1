use hex::FromHexError;
use k256::elliptic_curve::ff::{Field, PrimeField};
use k256::elliptic_curve::group::Group;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{FieldBytes, ProjectivePoint, PublicKey, Scalar, U256};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};
use thiserror::Error;
use zeroize::Zeroizing;

/// Length of a SEC1-compressed secp256k1 point.
pub const COMPRESSED_POINT_LEN: usize = 33;

/// A non-zero secp256k1 scalar used as a private key or blinding factor. The scalar is wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct MintSecret(Zeroizing<Scalar>);

impl MintSecret {
    pub fn as_scalar(&self) -> &Scalar {
        &self.0
    }

    pub fn random<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        loop {
            let mut bytes = Zeroizing::new([0u8; 32]);
            rng.fill_bytes(bytes.as_mut());
            let scalar = <Scalar as Reduce<U256>>::reduce_bytes(FieldBytes::from_slice(bytes.as_ref()));
            if !bool::from(scalar.is_zero()) {
                return Self(Zeroizing::new(scalar));
            }
        }
    }

    /// Interprets 32 big-endian bytes as a canonical, non-zero scalar.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, KeyError> {
        let scalar =
            Option::<Scalar>::from(Scalar::from_repr(*FieldBytes::from_slice(bytes))).ok_or(KeyError::NonCanonicalScalar)?;
        Self::try_from(scalar)
    }

    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        if hex.len() != 64 {
            return Err(KeyError::InvalidStringLength);
        }
        let mut bytes = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(hex.as_bytes(), bytes.as_mut())?;
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        let mut out = Zeroizing::new([0u8; 32]);
        out.copy_from_slice(&self.0.to_bytes());
        out
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.to_bytes().as_ref())
    }

    /// `a·G`
    pub fn public_key(&self) -> CurvePoint {
        // A non-zero scalar times the generator is never the identity.
        CurvePoint::from_nonidentity(ProjectivePoint::GENERATOR * self.as_scalar())
    }
}

impl TryFrom<Scalar> for MintSecret {
    type Error = KeyError;

    fn try_from(value: Scalar) -> Result<Self, Self::Error> {
        if bool::from(value.is_zero()) {
            return Err(KeyError::ZeroScalar);
        }
        Ok(Self(Zeroizing::new(value)))
    }
}

impl Debug for MintSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MintSecret")
    }
}

impl Serialize for MintSecret {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for MintSecret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        MintSecret::from_hex(&hex_str).map_err(serde::de::Error::custom)
    }
}

/// A secp256k1 point that is never the identity, kept together with its SEC1-compressed encoding.
///
/// Equality and hashing use the compressed bytes, so two points compare equal exactly when they encode the same way.
#[derive(Clone, Copy)]
pub struct CurvePoint {
    compressed: [u8; COMPRESSED_POINT_LEN],
    point: ProjectivePoint,
}

impl CurvePoint {
    /// Builds a point from a projective value that the caller knows is not the identity.
    pub(crate) fn from_nonidentity(point: ProjectivePoint) -> Self {
        let encoded = point.to_affine().to_encoded_point(true);
        let mut compressed = [0u8; COMPRESSED_POINT_LEN];
        compressed.copy_from_slice(encoded.as_bytes());
        Self { compressed, point }
    }

    pub fn from_point(point: ProjectivePoint) -> Result<Self, KeyError> {
        if bool::from(point.is_identity()) {
            return Err(KeyError::IdentityPoint);
        }
        Ok(Self::from_nonidentity(point))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != COMPRESSED_POINT_LEN {
            return Err(KeyError::InvalidPoint);
        }
        let key = PublicKey::from_sec1_bytes(bytes).map_err(|_| KeyError::InvalidPoint)?;
        Ok(Self::from_nonidentity(key.to_projective()))
    }

    /// Parses a 66-character hex string holding a compressed point.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        if hex.len() != COMPRESSED_POINT_LEN * 2 {
            return Err(KeyError::InvalidStringLength);
        }
        let mut bytes = [0u8; COMPRESSED_POINT_LEN];
        hex::decode_to_slice(hex.as_bytes(), &mut bytes)?;
        Self::from_bytes(&bytes)
    }

    pub fn as_point(&self) -> ProjectivePoint {
        self.point
    }

    pub fn as_bytes(&self) -> &[u8; COMPRESSED_POINT_LEN] {
        &self.compressed
    }

    /// The BIP-340 x-only form of the point.
    pub fn x_only(&self) -> &[u8] {
        &self.compressed[1..]
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.compressed)
    }

    /// The 65-byte uncompressed SEC1 encoding, as hex.
    pub fn uncompressed_hex(&self) -> String {
        hex::encode(self.point.to_affine().to_encoded_point(false).as_bytes())
    }
}

impl PartialEq for CurvePoint {
    fn eq(&self, other: &Self) -> bool {
        self.compressed == other.compressed
    }
}

impl Eq for CurvePoint {}

impl Hash for CurvePoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.compressed.hash(state);
    }
}

impl PartialOrd for CurvePoint {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CurvePoint {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.compressed.cmp(&other.compressed)
    }
}

impl Debug for CurvePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl Display for CurvePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl Serialize for CurvePoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for CurvePoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        CurvePoint::from_hex(&hex_str).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum KeyError {
    #[error("Invalid point on curve")]
    InvalidPoint,
    #[error("The point at infinity cannot be used here")]
    IdentityPoint,
    #[error("Could not deserialize from hex: {0}")]
    HexDeserializationError(#[from] FromHexError),
    #[error("Invalid string length")]
    InvalidStringLength,
    #[error("Scalar is not canonical")]
    NonCanonicalScalar,
    #[error("Scalar must not be zero")]
    ZeroScalar,
}
