use crate::amount::Unit;
use crate::helpers::Timestamp;
use crate::lightning::{LightningBackend, PaymentStatus};
use crate::mint::error::MintError;
use crate::mint::quote::{new_quote_id, MintQuote, MintQuoteState};
use crate::mint::types::{BlindSignature, MintRequest};
use crate::mint::verification::{check_outputs_unsigned, total};
use crate::mint::Mint;
use crate::signer::Signer;
use crate::storage::{MintStore, StoreTransaction};
use log::*;
use std::time::Duration;

impl<S: MintStore, G: Signer, L: LightningBackend> Mint<S, G, L> {
    /// Asks the backend for an invoice of `amount` and records an unpaid quote for it.
    pub async fn request_mint_quote(&self, amount: u64, unit: Unit) -> Result<MintQuote, MintError> {
        if self.settings.minting_disabled {
            return Err(MintError::MintingDisabled);
        }
        if !self.settings.supports(unit) || !self.lightning.verify_unit_support(unit) {
            return Err(MintError::UnitNotSupported(unit));
        }
        let invoice = self.lightning.request_invoice(amount, unit).await?;
        let quote = MintQuote {
            quote: new_quote_id(),
            request: invoice.request,
            amount,
            unit,
            state: MintQuoteState::Unpaid,
            expiry: self.quote_expiry(),
            checking_id: invoice.checking_id,
        };
        let mut tx = self.store.begin()?;
        tx.save_mint_quote(&quote)?;
        tx.commit()?;
        info!("New mint quote {} for {amount} {unit}", quote.quote);
        Ok(quote)
    }

    /// Returns the quote, first asking the backend whether an unpaid invoice has been paid since.
    pub async fn check_mint_quote(&self, quote_id: &str) -> Result<MintQuote, MintError> {
        let quote = self.load_mint_quote(quote_id)?;
        if quote.state != MintQuoteState::Unpaid {
            return Ok(quote);
        }
        let status = self.lightning.check_received(&quote.checking_id).await?;
        if status != PaymentStatus::Settled {
            debug!("Mint quote {quote_id} is still unpaid ({status})");
            return Ok(quote);
        }
        let mut tx = self.store.begin()?;
        let mut quote = tx.get_mint_quote(quote_id)?.ok_or_else(|| MintError::QuoteNotFound(quote_id.to_string()))?;
        if quote.state == MintQuoteState::Unpaid {
            quote.state = MintQuoteState::Paid;
            tx.save_mint_quote(&quote)?;
            tx.commit()?;
            info!("Mint quote {quote_id} has been paid");
        }
        Ok(quote)
    }

    /// Signs `outputs` for a paid quote. Their amounts must add up to the quote amount exactly.
    pub async fn mint_tokens(&self, request: &MintRequest) -> Result<Vec<BlindSignature>, MintError> {
        let quote = self.check_mint_quote(&request.quote).await?;
        if quote.state == MintQuoteState::Unpaid {
            return Err(MintError::QuoteNotPaid);
        }
        self.issue_for_quote(request)
    }

    fn issue_for_quote(&self, request: &MintRequest) -> Result<Vec<BlindSignature>, MintError> {
        let keysets = self.signer.get_keysets()?;
        let unit = self.check_outputs(&request.outputs, &keysets)?;

        let mut tx = self.store.begin()?;
        let mut quote =
            tx.get_mint_quote(&request.quote)?.ok_or_else(|| MintError::QuoteNotFound(request.quote.clone()))?;
        match quote.state {
            MintQuoteState::Unpaid => return Err(MintError::QuoteNotPaid),
            MintQuoteState::Issued => return Err(MintError::TokensAlreadyIssued),
            MintQuoteState::Paid => {}
        }
        if unit != quote.unit {
            return Err(MintError::UnitMismatch { inputs: quote.unit, outputs: unit });
        }
        let outputs = total(request.outputs.iter().map(|o| o.amount))?;
        if outputs != quote.amount {
            return Err(MintError::Unbalanced { inputs: quote.amount, outputs, fee: 0 });
        }
        check_outputs_unsigned(&tx, &request.outputs)?;
        let (signatures, recovery) = self.signer.sign_blind_messages(&request.outputs)?;
        tx.save_recover_sigs(&recovery)?;
        quote.state = MintQuoteState::Issued;
        tx.save_mint_quote(&quote)?;
        tx.commit()?;
        info!("Issued {} {} for mint quote {}", quote.amount, quote.unit, quote.quote);
        Ok(signatures)
    }

    fn load_mint_quote(&self, quote_id: &str) -> Result<MintQuote, MintError> {
        let tx = self.store.begin()?;
        tx.get_mint_quote(quote_id)?.ok_or_else(|| MintError::QuoteNotFound(quote_id.to_string()))
    }

    pub(crate) fn quote_expiry(&self) -> Timestamp {
        Timestamp::from_now(Duration::from_secs(self.settings.quote_expiry_minutes.saturating_mul(60)))
    }
}
