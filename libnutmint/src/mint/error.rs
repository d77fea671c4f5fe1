use crate::amount::Unit;
use crate::crypto::CryptoError;
use crate::keyset::KeysetId;
use crate::lightning::LightningError;
use crate::signer::{SignerError, SignerErrorKind};
use crate::spend_condition::SpendConditionError;
use crate::storage::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MintError {
    #[error("Blinded message of output already signed")]
    BlindedMessageAlreadySigned,
    #[error("Proof could not be verified: {0}")]
    Signer(#[from] SignerError),
    #[error("Spend condition not met: {0}")]
    SpendCondition(#[from] SpendConditionError),
    #[error("Proof could not be verified: {0}")]
    Crypto(#[from] CryptoError),
    #[error("Token is already spent")]
    ProofAlreadySpent,
    #[error("Token is pending in another transaction")]
    ProofPending,
    #[error("Transaction is not balanced. Inputs: {inputs}, outputs: {outputs}, fee: {fee}")]
    Unbalanced { inputs: u64, outputs: u64, fee: u64 },
    #[error("Amounts in the request overflow")]
    AmountOverflow,
    #[error("Inputs of {inputs} do not cover outputs of {outputs} plus a fee of {fee}")]
    InsufficientFee { inputs: u64, outputs: u64, fee: u64 },
    #[error("Unit {0} is not supported")]
    UnitNotSupported(Unit),
    #[error("Duplicate inputs provided")]
    DuplicateInputs,
    #[error("Duplicate outputs provided")]
    DuplicateOutputs,
    #[error("Inputs or outputs span multiple units")]
    MultipleUnits,
    #[error("Inputs are in {inputs} but outputs are in {outputs}")]
    UnitMismatch { inputs: Unit, outputs: Unit },
    #[error("Keyset {0} is not known")]
    KeysetUnknown(KeysetId),
    #[error("Keyset {0} is inactive, cannot sign messages")]
    KeysetInactive(KeysetId),
    #[error("Quote request is not paid")]
    QuoteNotPaid,
    #[error("Tokens have already been issued for quote")]
    TokensAlreadyIssued,
    #[error("Minting is disabled")]
    MintingDisabled,
    #[error("Lightning payment failed")]
    LightningPaymentFailed,
    #[error("Quote is pending")]
    QuotePending,
    #[error("Invoice already paid")]
    InvoiceAlreadyPaid,
    #[error("Quote {0} not found")]
    QuoteNotFound(String),
    #[error("Quote {0} has expired")]
    QuoteExpired(String),
    #[error("Request has no {0}")]
    EmptyRequest(&'static str),
    #[error("Request has more than {0} {1}")]
    RequestTooLarge(usize, &'static str),
    #[error("Store failure: {0}")]
    Store(#[from] StoreError),
    #[error("Lightning backend failure: {0}")]
    Lightning(#[from] LightningError),
}

impl MintError {
    /// The protocol error code reported to wallets.
    pub fn code(&self) -> u32 {
        match self {
            MintError::BlindedMessageAlreadySigned => 10002,
            MintError::Signer(e) => match e.kind() {
                SignerErrorKind::KeysetForProofNotFound | SignerErrorKind::UnknownKeyset => 12001,
                SignerErrorKind::InactiveKeyset => 12002,
                SignerErrorKind::InvalidProof => 10003,
                SignerErrorKind::ConditionNotMet | SignerErrorKind::Internal => 99999,
            },
            MintError::SpendCondition(e) => spend_condition_code(e),
            MintError::Crypto(_) => 10003,
            MintError::ProofAlreadySpent | MintError::ProofPending => 11001,
            MintError::Unbalanced { .. } | MintError::AmountOverflow => 11002,
            MintError::UnitNotSupported(_) => 11005,
            MintError::InsufficientFee { .. } => 11006,
            MintError::DuplicateInputs => 11007,
            MintError::DuplicateOutputs => 11008,
            MintError::MultipleUnits => 11009,
            MintError::UnitMismatch { .. } => 11010,
            MintError::KeysetUnknown(_) => 12001,
            MintError::KeysetInactive(_) => 12002,
            MintError::QuoteNotPaid => 20001,
            MintError::TokensAlreadyIssued => 20002,
            MintError::MintingDisabled => 20003,
            MintError::LightningPaymentFailed => 20004,
            MintError::QuotePending => 20005,
            MintError::InvoiceAlreadyPaid => 20006,
            MintError::Lightning(LightningError::UnitNotSupported(_)) => 11005,
            MintError::QuoteNotFound(_)
            | MintError::QuoteExpired(_)
            | MintError::EmptyRequest(_)
            | MintError::RequestTooLarge(..)
            | MintError::Store(_)
            | MintError::Lightning(_) => 99999,
        }
    }
}

fn spend_condition_code(e: &SpendConditionError) -> u32 {
    match e {
        SpendConditionError::EmptyWitness | SpendConditionError::LocktimePassed => 99999,
        _ => 10003,
    }
}

/// The generic text wallets see for each code.
pub fn code_text(code: u32) -> &'static str {
    match code {
        10002 => "Blinded message of output already signed",
        10003 => "Proof could not be verified",
        11001 => "Token is already spent",
        11002 => "Transaction is not balanced (inputs != outputs)",
        11005 => "Unit in request is not supported",
        11006 => "Insufficient fee",
        11007 => "Duplicate inputs provided",
        11008 => "Duplicate outputs provided",
        11009 => "Inputs/Outputs of multiple units",
        11010 => "Inputs and outputs are not same unit",
        12001 => "Keyset is not known",
        12002 => "Keyset is inactive, cannot sign messages",
        20001 => "Quote request is not paid",
        20002 => "Tokens have already been issued for quote",
        20003 => "Minting is disabled",
        20004 => "Lightning payment failed",
        20005 => "Quote is pending",
        20006 => "Invoice already paid",
        _ => "Unknown error",
    }
}

/// The error body returned to wallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub detail: Option<String>,
}

impl From<&MintError> for ErrorResponse {
    fn from(e: &MintError) -> Self {
        let code = e.code();
        Self { code, error: code_text(code).to_string(), detail: Some(e.to_string()) }
    }
}
