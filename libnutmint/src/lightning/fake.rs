use crate::amount::Unit;
use crate::lightning::error::LightningError;
use crate::lightning::traits::{FeesResponse, InvoiceResponse, LightningBackend, PaymentResponse, PaymentStatus};
use log::*;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

pub const FAKE_PREIMAGE: &str = "fakewalletpreimage";
const INVOICE_PREFIX: &str = "lnfake";

/// Outcomes the fake backend can be told to produce instead of settling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeOutcome {
    PaymentPending,
    PaymentFailed,
    PaymentUnknown,
    QueryPending,
    QueryFailed,
    QueryUnknown,
}

/// An in-process backend that settles everything instantly unless told otherwise.
///
/// Invoices look like `lnfake{amount}{unit}{random hex}` so the amount can be read back when melting.
#[derive(Debug, Clone, Default)]
pub struct FakeLightning {
    fee_ppk: u64,
    outcomes: Arc<RwLock<HashSet<FakeOutcome>>>,
}

impl FakeLightning {
    pub fn new(fee_ppk: u64) -> Self {
        Self { fee_ppk, outcomes: Arc::default() }
    }

    /// Replaces the forced outcomes. An empty list restores instant settlement.
    pub fn set_outcomes(&self, outcomes: &[FakeOutcome]) {
        match self.outcomes.write() {
            Ok(mut guard) => *guard = outcomes.iter().copied().collect(),
            Err(e) => warn!("Fake lightning outcome lock poisoned: {e}"),
        }
    }

    fn forced(&self, outcome: FakeOutcome) -> bool {
        self.outcomes.read().map(|o| o.contains(&outcome)).unwrap_or(false)
    }

    fn query_status(&self) -> PaymentStatus {
        if self.forced(FakeOutcome::QueryUnknown) {
            PaymentStatus::Unknown
        } else if self.forced(FakeOutcome::QueryFailed) {
            PaymentStatus::Failed
        } else if self.forced(FakeOutcome::QueryPending) {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Settled
        }
    }

    pub fn fee_reserve(&self, amount: u64) -> u64 {
        (amount.saturating_mul(self.fee_ppk) / 1000).max(1)
    }

    pub fn create_invoice(amount: u64, unit: Unit) -> String {
        let mut nonce = [0u8; 16];
        rand::rng().fill_bytes(&mut nonce);
        format!("{INVOICE_PREFIX}{amount}{unit}{}", hex::encode(nonce))
    }

    pub fn parse_invoice(request: &str) -> Result<(u64, Unit), LightningError> {
        let invalid = || LightningError::InvalidInvoice(request.to_string());
        let rest = request.strip_prefix(INVOICE_PREFIX).ok_or_else(invalid)?;
        let digits = rest.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
        let amount = rest[..digits].parse::<u64>().map_err(|_| invalid())?;
        let rest = &rest[digits..];
        let unit = [Unit::Msat, Unit::Sat, Unit::Auth]
            .into_iter()
            .find(|unit| rest.starts_with(unit.as_str()))
            .ok_or_else(invalid)?;
        Ok((amount, unit))
    }

    fn checking_id(request: &str) -> String {
        hex::encode(Sha256::digest(request.as_bytes()))
    }
}

impl LightningBackend for FakeLightning {
    async fn request_invoice(&self, amount: u64, unit: Unit) -> Result<InvoiceResponse, LightningError> {
        if !self.verify_unit_support(unit) {
            return Err(LightningError::UnitNotSupported(unit));
        }
        let request = Self::create_invoice(amount, unit);
        let checking_id = Self::checking_id(&request);
        debug!("Fake lightning issued invoice {request}");
        Ok(InvoiceResponse { request, checking_id })
    }

    async fn check_received(&self, _checking_id: &str) -> Result<PaymentStatus, LightningError> {
        Ok(self.query_status())
    }

    async fn pay_invoice(
        &self,
        request: &str,
        _amount: u64,
        _fee_reserve: u64,
        checking_id: &str,
    ) -> Result<PaymentResponse, LightningError> {
        let status = if self.forced(FakeOutcome::PaymentUnknown) {
            PaymentStatus::Unknown
        } else if self.forced(FakeOutcome::PaymentFailed) {
            PaymentStatus::Failed
        } else if self.forced(FakeOutcome::PaymentPending) {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Settled
        };
        info!("Fake lightning payment of {request}: {status}");
        let preimage = (status == PaymentStatus::Settled).then(|| FAKE_PREIMAGE.to_string());
        Ok(PaymentResponse { status, preimage, fee_paid: 0, checking_id: checking_id.to_string() })
    }

    async fn check_paid(&self, checking_id: &str) -> Result<PaymentResponse, LightningError> {
        let status = self.query_status();
        let preimage = (status == PaymentStatus::Settled).then(|| FAKE_PREIMAGE.to_string());
        Ok(PaymentResponse { status, preimage, fee_paid: 0, checking_id: checking_id.to_string() })
    }

    async fn query_fees(&self, request: &str, unit: Unit) -> Result<FeesResponse, LightningError> {
        let (amount, invoice_unit) = Self::parse_invoice(request)?;
        if invoice_unit != unit {
            return Err(LightningError::InvalidInvoice(format!("{request} is not denominated in {unit}")));
        }
        Ok(FeesResponse { amount, fee: self.fee_reserve(amount), checking_id: Self::checking_id(request) })
    }

    fn verify_unit_support(&self, unit: Unit) -> bool {
        unit != Unit::Auth
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn invoices_round_trip_through_query_fees() {
        let backend = FakeLightning::new(10);
        let invoice = backend.request_invoice(2_000, Unit::Sat).await.unwrap();
        assert!(invoice.request.starts_with("lnfake2000sat"));
        let fees = backend.query_fees(&invoice.request, Unit::Sat).await.unwrap();
        assert_eq!(fees.amount, 2_000);
        assert_eq!(fees.fee, 20);
        assert_eq!(fees.checking_id, invoice.checking_id);
        assert!(backend.query_fees(&invoice.request, Unit::Msat).await.is_err());
    }

    #[tokio::test]
    async fn fee_reserve_has_a_floor() {
        let backend = FakeLightning::new(0);
        assert_eq!(backend.fee_reserve(5), 1);
        let msat = FakeLightning::create_invoice(7, Unit::Msat);
        assert_eq!(FakeLightning::parse_invoice(&msat).unwrap(), (7, Unit::Msat));
        assert!(FakeLightning::parse_invoice("lnbc1000").is_err());
        assert!(backend.request_invoice(1, Unit::Auth).await.is_err());
    }

    #[tokio::test]
    async fn forced_outcomes() {
        let backend = FakeLightning::new(0);
        let paid = backend.pay_invoice("lnfake1sat00", 1, 1, "id").await.unwrap();
        assert_eq!(paid.status, PaymentStatus::Settled);
        assert_eq!(paid.preimage.as_deref(), Some(FAKE_PREIMAGE));

        backend.set_outcomes(&[FakeOutcome::PaymentPending, FakeOutcome::QueryFailed]);
        let pending = backend.pay_invoice("lnfake1sat00", 1, 1, "id").await.unwrap();
        assert_eq!(pending.status, PaymentStatus::Pending);
        assert!(pending.preimage.is_none());
        assert_eq!(backend.check_paid("id").await.unwrap().status, PaymentStatus::Failed);
        assert_eq!(backend.check_received("id").await.unwrap(), PaymentStatus::Failed);

        backend.set_outcomes(&[]);
        assert_eq!(backend.check_received("id").await.unwrap(), PaymentStatus::Settled);
    }
}
