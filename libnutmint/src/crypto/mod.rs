//! secp256k1 primitives: hash-to-curve, blind Diffie-Hellman key exchange, DLEQ proofs and BIP-340 signatures.
//!
//! Everything in here is pure and stateless.

pub mod bdhke;
pub mod dleq;
pub mod hash_to_curve;
pub mod keys;
pub mod schnorr;

pub use keys::{CurvePoint, KeyError, MintSecret};

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CryptoError {
    #[error("No valid curve point found for message")]
    HashToCurveExhausted,
    #[error("Blinding produced the point at infinity")]
    IdentityResult,
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
    #[error("Invalid schnorr signature encoding")]
    InvalidSignature,
    #[error("Key cannot be used for BIP-340 signing")]
    InvalidSigningKey,
}
