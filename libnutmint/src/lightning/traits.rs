use crate::amount::Unit;
use crate::lightning::error::LightningError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;

/// Where a payment stands according to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Settled,
    Failed,
    Pending,
    Unknown,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatus::Settled => "SETTLED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub request: String,
    pub checking_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub status: PaymentStatus,
    pub preimage: Option<String>,
    /// Routing fee actually spent, in the quote's unit.
    pub fee_paid: u64,
    pub checking_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesResponse {
    /// Amount the request asks for.
    pub amount: u64,
    /// Fee reserve to hold back while paying.
    pub fee: u64,
    pub checking_id: String,
}

/// A Lightning node (or something pretending to be one).
///
/// The mint never holds a lock on its store while awaiting any of these calls.
pub trait LightningBackend: Send + Sync {
    /// Create an invoice the wallet pays to fund a mint quote.
    fn request_invoice(
        &self,
        amount: u64,
        unit: Unit,
    ) -> impl Future<Output = Result<InvoiceResponse, LightningError>> + Send;

    /// Whether the invoice behind `checking_id` has been paid to us.
    fn check_received(&self, checking_id: &str) -> impl Future<Output = Result<PaymentStatus, LightningError>> + Send;

    /// Pay `request`, spending at most `fee_reserve` on routing.
    fn pay_invoice(
        &self,
        request: &str,
        amount: u64,
        fee_reserve: u64,
        checking_id: &str,
    ) -> impl Future<Output = Result<PaymentResponse, LightningError>> + Send;

    /// Where an outgoing payment stands.
    fn check_paid(&self, checking_id: &str) -> impl Future<Output = Result<PaymentResponse, LightningError>> + Send;

    /// Amount and fee reserve for paying `request`.
    fn query_fees(&self, request: &str, unit: Unit) -> impl Future<Output = Result<FeesResponse, LightningError>> + Send;

    fn verify_unit_support(&self, unit: Unit) -> bool;
}
