use crate::amount::Unit;
use crate::crypto::dleq::DleqProof;
use crate::crypto::hash_to_curve::hash_to_curve;
use crate::crypto::{CryptoError, CurvePoint};
use crate::helpers::Timestamp;
use crate::keyset::KeysetId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// An unblinded token presented by a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub amount: u64,
    pub id: KeysetId,
    pub secret: String,
    #[serde(rename = "C")]
    pub c: CurvePoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witness: Option<String>,
}

impl Proof {
    /// `Y = hash_to_curve(secret)`, the double-spend index.
    pub fn y(&self) -> Result<CurvePoint, CryptoError> {
        hash_to_curve(self.secret.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindedMessage {
    pub amount: u64,
    pub id: KeysetId,
    #[serde(rename = "B_")]
    pub blinded: CurvePoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witness: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindSignature {
    pub amount: u64,
    pub id: KeysetId,
    #[serde(rename = "C_")]
    pub signed: CurvePoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dleq: Option<DleqProof>,
}

/// A blind signature kept so a wallet that lost its tokens can ask for it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverSig {
    pub amount: u64,
    pub id: KeysetId,
    #[serde(rename = "B_")]
    pub blinded: CurvePoint,
    #[serde(rename = "C_")]
    pub signed: CurvePoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dleq: Option<DleqProof>,
    pub created_at: Timestamp,
}

impl RecoverSig {
    pub fn new(message: &BlindedMessage, signature: &BlindSignature) -> Self {
        Self {
            amount: signature.amount,
            id: signature.id.clone(),
            blinded: message.blinded,
            signed: signature.signed,
            dleq: signature.dleq,
            created_at: Timestamp::now(),
        }
    }

    pub fn blinded_message(&self) -> BlindedMessage {
        BlindedMessage { amount: self.amount, id: self.id.clone(), blinded: self.blinded, witness: None }
    }

    pub fn blind_signature(&self) -> BlindSignature {
        BlindSignature { amount: self.amount, id: self.id.clone(), signed: self.signed, dleq: self.dleq }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProofState {
    Unspent,
    Pending,
    Spent,
}

impl Display for ProofState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProofState::Unspent => "UNSPENT",
            ProofState::Pending => "PENDING",
            ProofState::Spent => "SPENT",
        };
        f.write_str(s)
    }
}

/// A proof the mint has seen, with its spend state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProof {
    pub proof: Proof,
    pub y: CurvePoint,
    pub unit: Unit,
    pub state: ProofState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    pub seen_at: Timestamp,
}

impl StoredProof {
    pub fn new(proof: Proof, y: CurvePoint, unit: Unit, state: ProofState, quote: Option<String>) -> Self {
        Self { proof, y, unit, state, quote, seen_at: Timestamp::now() }
    }
}

/// One entry of a state check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStateEntry {
    #[serde(rename = "Y")]
    pub y: CurvePoint,
    pub state: ProofState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witness: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub inputs: Vec<Proof>,
    pub outputs: Vec<BlindedMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    pub quote: String,
    pub outputs: Vec<BlindedMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltRequest {
    pub quote: String,
    pub inputs: Vec<Proof>,
    #[serde(default)]
    pub outputs: Vec<BlindedMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreResponse {
    pub outputs: Vec<BlindedMessage>,
    pub signatures: Vec<BlindSignature>,
}
