use crate::amount::Unit;
use crate::crypto::CurvePoint;
use crate::keyset::{KeysetId, KeysetInfo, KeysetKeys};
use crate::mint::types::{BlindSignature, BlindedMessage, Proof, RecoverSig};
use crate::signer::error::SignerError;
use crate::spend_condition::sig_all::{melt_message, swap_message};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotateArgs {
    pub unit: Unit,
    pub input_fee_ppk: u64,
    /// Lifetime of the new keyset. Zero means it never expires.
    pub expiry_limit_hours: u64,
}

/// The request a set of proofs is spent in. A `SIG_ALL` witness signs a message built from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum SpendContext {
    Swap,
    Melt { quote: String },
}

impl SpendContext {
    pub fn sig_all_message(&self, proofs: &[Proof], outputs: &[BlindedMessage]) -> String {
        match self {
            SpendContext::Swap => swap_message(proofs, outputs),
            SpendContext::Melt { quote } => melt_message(proofs, outputs, quote),
        }
    }
}

pub trait Signer: Send + Sync {
    /// Public keys of every active keyset.
    fn get_active_keys(&self) -> Result<Vec<KeysetKeys>, SignerError>;

    /// Public keys of any known keyset, active or not.
    fn get_keys_by_id(&self, id: &KeysetId) -> Result<KeysetKeys, SignerError>;

    fn get_keysets(&self) -> Result<Vec<KeysetInfo>, SignerError>;

    /// Creates the next keyset version for a unit and makes it the only active one.
    fn rotate_keyset(&self, args: RotateArgs) -> Result<KeysetInfo, SignerError>;

    /// Signs each message with the active keyset it names, returning the signatures and their recovery records.
    fn sign_blind_messages(
        &self,
        messages: &[BlindedMessage],
    ) -> Result<(Vec<BlindSignature>, Vec<RecoverSig>), SignerError>;

    /// Checks every proof's mint signature and spend condition. When an input is locked with `SIG_ALL` the first
    /// witness must sign the message `context` builds over `proofs` and `outputs`.
    fn verify_proofs(
        &self,
        proofs: &[Proof],
        outputs: &[BlindedMessage],
        context: &SpendContext,
    ) -> Result<(), SignerError>;

    fn get_signer_pubkey(&self) -> Result<CurvePoint, SignerError>;
}
