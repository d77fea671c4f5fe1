use crate::amount::Unit;
use crate::helpers::Timestamp;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MintQuoteState {
    Unpaid,
    Paid,
    Issued,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeltQuoteState {
    Unpaid,
    Pending,
    Paid,
}

impl Display for MintQuoteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MintQuoteState::Unpaid => "UNPAID",
            MintQuoteState::Paid => "PAID",
            MintQuoteState::Issued => "ISSUED",
        };
        f.write_str(s)
    }
}

impl Display for MeltQuoteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MeltQuoteState::Unpaid => "UNPAID",
            MeltQuoteState::Pending => "PENDING",
            MeltQuoteState::Paid => "PAID",
        };
        f.write_str(s)
    }
}

/// A request to issue `amount` once the attached invoice is paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintQuote {
    pub quote: String,
    pub request: String,
    pub amount: u64,
    pub unit: Unit,
    pub state: MintQuoteState,
    pub expiry: Timestamp,
    pub checking_id: String,
}

/// A request to pay `request` out of the inputs of a later melt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltQuote {
    pub quote: String,
    pub request: String,
    pub amount: u64,
    pub fee_reserve: u64,
    pub unit: Unit,
    pub state: MeltQuoteState,
    pub expiry: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_preimage: Option<String>,
    #[serde(default)]
    pub fee_paid: u64,
    pub checking_id: String,
}

/// A random 32-byte quote id, hex encoded.
pub fn new_quote_id() -> String {
    let mut id = [0u8; 32];
    rand::rng().fill_bytes(&mut id);
    hex::encode(id)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn quote_ids_are_unique() {
        let a = new_quote_id();
        assert_eq!(a.len(), 64);
        assert_ne!(a, new_quote_id());
    }

    #[test]
    fn states_on_the_wire() {
        assert_eq!(serde_json::to_string(&MintQuoteState::Issued).unwrap(), r#""ISSUED""#);
        assert_eq!(serde_json::from_str::<MeltQuoteState>(r#""PENDING""#).unwrap(), MeltQuoteState::Pending);
        assert_eq!(MeltQuoteState::Paid.to_string(), "PAID");
    }
}
