//! Spending conditions attached to proof secrets (NUT-10/11/14).
//!
//! A secret is either an opaque random string (anyone holding the proof may spend it) or a JSON tuple
//! `["P2PK"|"HTLC", {nonce, data, tags}]`. [`Secret::parse`] decides which, and [`verify_condition`] runs the
//! witness checks for a conditioned secret. Requests that declare `SIG_ALL` are checked with the helpers in
//! [`sig_all`].

pub mod secret;
pub mod sig_all;
pub mod tags;
pub mod verify;
pub mod witness;

pub use secret::{ConditionKind, Secret, SpendCondition};
pub use tags::{SigFlag, Tags};
pub use verify::{verify_condition, verify_proof_conditions};
pub use witness::Witness;

use crate::crypto::CryptoError;
use thiserror::Error;

/// The largest number of `pubkeys` plus `refund` entries a condition may carry.
pub const MAX_CONDITION_KEYS: usize = 10;

/// Length of an anyone-can-spend secret (32 random bytes, hex encoded).
pub const UNLOCKED_SECRET_LEN: usize = 64;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SpendConditionError {
    #[error("Invalid spend condition")]
    InvalidSpendCondition,
    #[error("Malformed tag: {0}")]
    MalformedTag(String),
    #[error("Invalid tag name: {0}")]
    InvalidTagName(String),
    #[error("Invalid tag value: {0}")]
    InvalidTagValue(String),
    #[error("Invalid sig flag: {0}")]
    InvalidSigFlag(String),
    #[error("Could not parse witness")]
    CouldNotParseWitness,
    #[error("Witness is empty")]
    EmptyWitness,
    #[error("No valid signatures found")]
    NoValidSignatures,
    #[error("Not enough signatures")]
    NotEnoughSignatures,
    #[error("Locktime has passed and no refund signature was provided")]
    LocktimePassed,
    #[error("Preimage is not a valid hex string")]
    InvalidHexPreimage,
    #[error("Invalid preimage")]
    InvalidPreimage,
    #[error("Proof secret is not the correct size")]
    CommonSecretNotCorrectSize,
    #[error("Spend condition carries {0} keys, more than the allowed maximum")]
    TooManyKeys(usize),
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}
