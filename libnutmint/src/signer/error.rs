use crate::crypto::CryptoError;
use crate::keyset::{KeysetError, KeysetId};
use crate::spend_condition::SpendConditionError;
use crate::storage::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("No keyset {0} holds the key for this proof")]
    KeysetForProofNotFound(KeysetId),
    #[error("Unknown keyset {0}")]
    UnknownKeyset(KeysetId),
    #[error("Keyset {id} has no key for amount {amount}")]
    AmountNotInKeyset { id: KeysetId, amount: u64 },
    #[error("Keyset {0} is inactive and cannot sign")]
    UsingInactiveKeyset(KeysetId),
    #[error("Proof signature does not verify")]
    InvalidProof,
    #[error("Spend condition not met: {0}")]
    SpendCondition(#[from] SpendConditionError),
    #[error("Cryptographic failure: {0}")]
    Crypto(#[from] CryptoError),
    #[error("Keyset derivation failed: {0}")]
    Keyset(#[from] KeysetError),
    #[error("Signer store failed: {0}")]
    Store(#[from] StoreError),
    #[error("The keyset lock was poisoned by a panicking writer")]
    LockPoisoned,
    #[error("Signer transport failed: {0}")]
    Transport(String),
    #[error("Remote signer error ({kind:?}): {message}")]
    Remote { kind: SignerErrorKind, message: String },
}

/// The coarse error classes that survive a trip over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerErrorKind {
    KeysetForProofNotFound,
    UnknownKeyset,
    InactiveKeyset,
    InvalidProof,
    /// The witness is missing, or a lock expired without a refund signature.
    ConditionNotMet,
    Internal,
}

impl SignerError {
    pub fn kind(&self) -> SignerErrorKind {
        match self {
            SignerError::KeysetForProofNotFound(_) => SignerErrorKind::KeysetForProofNotFound,
            SignerError::UnknownKeyset(_) | SignerError::AmountNotInKeyset { .. } => SignerErrorKind::UnknownKeyset,
            SignerError::UsingInactiveKeyset(_) => SignerErrorKind::InactiveKeyset,
            SignerError::SpendCondition(SpendConditionError::EmptyWitness | SpendConditionError::LocktimePassed) => {
                SignerErrorKind::ConditionNotMet
            }
            SignerError::InvalidProof | SignerError::SpendCondition(_) | SignerError::Crypto(_) => {
                SignerErrorKind::InvalidProof
            }
            SignerError::Remote { kind, .. } => *kind,
            _ => SignerErrorKind::Internal,
        }
    }
}
