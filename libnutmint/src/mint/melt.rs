use crate::amount::{amount_split, Unit};
use crate::lightning::{LightningBackend, PaymentResponse, PaymentStatus};
use crate::mint::error::MintError;
use crate::mint::fees::input_fee;
use crate::mint::quote::{new_quote_id, MeltQuote, MeltQuoteState, MintQuoteState};
use crate::mint::types::{BlindSignature, BlindedMessage, MeltRequest, Proof, ProofState, StoredProof};
use crate::mint::verification::{check_inputs_unknown, check_outputs_unsigned, total};
use crate::mint::Mint;
use crate::signer::{Signer, SpendContext};
use crate::storage::{MintStore, StoreTransaction};
use log::*;
use serde::{Deserialize, Serialize};

/// The state of a melt after a payment attempt, with signatures for any overpaid fee reserve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeltResponse {
    pub quote: MeltQuote,
    #[serde(default)]
    pub change: Vec<BlindSignature>,
}

/// Assigns the parts of `overpaid` to the first outputs. Extra outputs are dropped; extra parts are lost.
pub fn messages_for_change(overpaid: u64, outputs: &[BlindedMessage]) -> Vec<BlindedMessage> {
    amount_split(overpaid)
        .into_iter()
        .zip(outputs)
        .map(|(amount, output)| BlindedMessage { amount, ..output.clone() })
        .collect()
}

impl<S: MintStore, G: Signer, L: LightningBackend> Mint<S, G, L> {
    /// Quotes the amount and fee reserve for paying `request`.
    ///
    /// A request that is one of this mint's own unpaid invoices is settled internally later, so it needs no reserve.
    pub async fn request_melt_quote(&self, request: &str, unit: Unit) -> Result<MeltQuote, MintError> {
        if !self.settings.supports(unit) || !self.lightning.verify_unit_support(unit) {
            return Err(MintError::UnitNotSupported(unit));
        }
        let fees = self.lightning.query_fees(request, unit).await?;
        let mut tx = self.store.begin()?;
        let internal = tx.get_mint_quote_by_request(request)?;
        let fee_reserve = match internal {
            Some(ref mint_quote) if mint_quote.state != MintQuoteState::Unpaid => {
                return Err(MintError::InvoiceAlreadyPaid);
            }
            Some(_) => 0,
            None => fees.fee,
        };
        let quote = MeltQuote {
            quote: new_quote_id(),
            request: request.to_string(),
            amount: fees.amount,
            fee_reserve,
            unit,
            state: MeltQuoteState::Unpaid,
            expiry: self.quote_expiry(),
            payment_preimage: None,
            fee_paid: 0,
            checking_id: fees.checking_id,
        };
        tx.save_melt_quote(&quote)?;
        tx.commit()?;
        info!("New melt quote {} for {} {unit} (reserve {fee_reserve})", quote.quote, quote.amount);
        Ok(quote)
    }

    /// Returns the quote, first resolving a pending payment with the backend.
    pub async fn check_melt_quote(&self, quote_id: &str) -> Result<MeltResponse, MintError> {
        let quote = self.load_melt_quote(quote_id)?;
        if quote.state != MeltQuoteState::Pending {
            return Ok(MeltResponse { quote, change: Vec::new() });
        }
        let payment = self.lightning.check_paid(&quote.checking_id).await?;
        match payment.status {
            PaymentStatus::Settled => self.settle_melt(quote_id, &payment),
            PaymentStatus::Failed => {
                let quote = self.release_melt(quote_id)?;
                Ok(MeltResponse { quote, change: Vec::new() })
            }
            PaymentStatus::Pending | PaymentStatus::Unknown => {
                debug!("Melt quote {quote_id} is still pending ({})", payment.status);
                Ok(MeltResponse { quote, change: Vec::new() })
            }
        }
    }

    /// Spends `inputs` to pay the quote's request.
    ///
    /// Inputs are committed as pending before the payment goes out. A settled payment marks them spent and returns
    /// change for any unused fee reserve; a failed one releases them; an undecided one leaves them pending until
    /// [`check_melt_quote`](Self::check_melt_quote) resolves it.
    pub async fn melt(&self, request: &MeltRequest) -> Result<MeltResponse, MintError> {
        let current = self.check_melt_quote(&request.quote).await?.quote;
        match current.state {
            MeltQuoteState::Pending => return Err(MintError::QuotePending),
            MeltQuoteState::Paid => return Err(MintError::InvoiceAlreadyPaid),
            MeltQuoteState::Unpaid => {}
        }
        let (quote, internal) = self.prepare_melt(request)?;
        if internal {
            info!("Melt quote {} settled internally", quote.quote);
            let payment =
                PaymentResponse { status: PaymentStatus::Settled, preimage: None, fee_paid: 0, checking_id: quote.checking_id };
            return self.settle_melt(&quote.quote, &payment);
        }

        let attempt = self.lightning.pay_invoice(&quote.request, quote.amount, quote.fee_reserve, &quote.checking_id).await;
        let payment = match attempt {
            Ok(payment) if payment.status == PaymentStatus::Settled => payment,
            other => {
                warn!("Payment for melt quote {} did not settle: {other:?}. Rechecking.", quote.quote);
                self.lightning.check_paid(&quote.checking_id).await?
            }
        };
        match payment.status {
            PaymentStatus::Settled => self.settle_melt(&quote.quote, &payment),
            PaymentStatus::Pending => {
                info!("Payment for melt quote {} is pending", quote.quote);
                Ok(MeltResponse { quote: self.load_melt_quote(&quote.quote)?, change: Vec::new() })
            }
            PaymentStatus::Failed | PaymentStatus::Unknown => {
                self.release_melt(&quote.quote)?;
                Err(MintError::LightningPaymentFailed)
            }
        }
    }

    /// Verifies the request and commits the inputs as pending. Returns the pending quote and whether the request
    /// is one of this mint's own invoices.
    fn prepare_melt(&self, request: &MeltRequest) -> Result<(MeltQuote, bool), MintError> {
        let keysets = self.signer.get_keysets()?;
        let inputs = self.check_inputs(&request.inputs, &keysets)?;
        if !request.outputs.is_empty() {
            let output_unit = self.check_outputs(&request.outputs, &keysets)?;
            if output_unit != inputs.unit {
                return Err(MintError::UnitMismatch { inputs: inputs.unit, outputs: output_unit });
            }
        }
        let context = SpendContext::Melt { quote: request.quote.clone() };
        self.verify_inputs(&request.inputs, &request.outputs, &context)?;

        let mut tx = self.store.begin()?;
        let mut quote =
            tx.get_melt_quote(&request.quote)?.ok_or_else(|| MintError::QuoteNotFound(request.quote.clone()))?;
        match quote.state {
            MeltQuoteState::Pending => return Err(MintError::QuotePending),
            MeltQuoteState::Paid => return Err(MintError::InvoiceAlreadyPaid),
            MeltQuoteState::Unpaid => {}
        }
        if quote.expiry.has_passed() {
            return Err(MintError::QuoteExpired(quote.quote));
        }
        if inputs.unit != quote.unit {
            return Err(MintError::UnitMismatch { inputs: inputs.unit, outputs: quote.unit });
        }
        let needed = quote.amount.checked_add(quote.fee_reserve).ok_or(MintError::AmountOverflow)?;
        if inputs.amount < needed.checked_add(inputs.fee).ok_or(MintError::AmountOverflow)? {
            debug!("Melt needs {needed} plus {} in fees, got {}", inputs.fee, inputs.amount);
            return Err(MintError::Unbalanced { inputs: inputs.amount, outputs: needed, fee: inputs.fee });
        }
        check_inputs_unknown(&tx, &inputs.ys)?;
        check_outputs_unsigned(&tx, &request.outputs)?;

        let pending: Vec<StoredProof> = request
            .inputs
            .iter()
            .zip(&inputs.ys)
            .map(|(proof, y)| {
                StoredProof::new(proof.clone(), *y, inputs.unit, ProofState::Pending, Some(quote.quote.clone()))
            })
            .collect();
        tx.save_proofs(&pending)?;
        tx.save_melt_change(&quote.quote, &request.outputs)?;

        let internal = match tx.get_mint_quote_by_request(&quote.request)? {
            Some(mint_quote) if mint_quote.state != MintQuoteState::Unpaid => return Err(MintError::InvoiceAlreadyPaid),
            Some(mut mint_quote) => {
                if mint_quote.unit != quote.unit {
                    return Err(MintError::UnitMismatch { inputs: quote.unit, outputs: mint_quote.unit });
                }
                mint_quote.state = MintQuoteState::Paid;
                tx.save_mint_quote(&mint_quote)?;
                true
            }
            None => false,
        };
        quote.state = MeltQuoteState::Pending;
        tx.save_melt_quote(&quote)?;
        tx.commit()?;
        debug!("Melt quote {} is pending with {} inputs", quote.quote, pending.len());
        Ok((quote, internal))
    }

    /// Marks the quote's pending inputs spent and signs change for whatever the payment did not use.
    fn settle_melt(&self, quote_id: &str, payment: &PaymentResponse) -> Result<MeltResponse, MintError> {
        let keysets = self.signer.get_keysets()?;
        let mut tx = self.store.begin()?;
        let mut quote = tx.get_melt_quote(quote_id)?.ok_or_else(|| MintError::QuoteNotFound(quote_id.to_string()))?;
        if quote.state != MeltQuoteState::Pending {
            return Ok(MeltResponse { quote, change: Vec::new() });
        }
        let pending = tx.get_proofs_by_quote(quote_id)?;
        let proofs: Vec<Proof> = pending.iter().map(|p| p.proof.clone()).collect();
        let fee = input_fee(&proofs, &keysets)?;
        let spent = quote.amount.saturating_add(payment.fee_paid).saturating_add(fee);
        let overpaid = total(proofs.iter().map(|p| p.amount))?.saturating_sub(spent);

        let outputs = tx.get_melt_change(quote_id)?;
        let mut change = Vec::new();
        if overpaid > 0 && !outputs.is_empty() {
            let (signatures, recovery) = self.signer.sign_blind_messages(&messages_for_change(overpaid, &outputs))?;
            tx.save_recover_sigs(&recovery)?;
            change = signatures;
        }
        tx.delete_melt_change(quote_id)?;
        let ys: Vec<_> = pending.iter().map(|p| p.y).collect();
        tx.set_proof_state(&ys, ProofState::Spent)?;
        quote.state = MeltQuoteState::Paid;
        quote.fee_paid = payment.fee_paid;
        quote.payment_preimage = payment.preimage.clone();
        tx.save_melt_quote(&quote)?;
        tx.commit()?;
        info!("Melt quote {quote_id} paid. Fee {}, change {overpaid}", quote.fee_paid);
        Ok(MeltResponse { quote, change })
    }

    /// Forgets the quote's pending inputs so they can be spent again, and reopens the quote.
    fn release_melt(&self, quote_id: &str) -> Result<MeltQuote, MintError> {
        let mut tx = self.store.begin()?;
        let mut quote = tx.get_melt_quote(quote_id)?.ok_or_else(|| MintError::QuoteNotFound(quote_id.to_string()))?;
        if quote.state != MeltQuoteState::Pending {
            return Ok(quote);
        }
        let ys: Vec<_> = tx.get_proofs_by_quote(quote_id)?.iter().map(|p| p.y).collect();
        tx.delete_proofs(&ys)?;
        tx.delete_melt_change(quote_id)?;
        quote.state = MeltQuoteState::Unpaid;
        tx.save_melt_quote(&quote)?;
        tx.commit()?;
        warn!("Melt quote {quote_id} failed, released {} inputs", ys.len());
        Ok(quote)
    }

    fn load_melt_quote(&self, quote_id: &str) -> Result<MeltQuote, MintError> {
        let tx = self.store.begin()?;
        tx.get_melt_quote(quote_id)?.ok_or_else(|| MintError::QuoteNotFound(quote_id.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::hash_to_curve::hash_to_curve;
    use crate::keyset::KeysetId;

    fn outputs(n: usize) -> Vec<BlindedMessage> {
        (0..n)
            .map(|i| BlindedMessage {
                amount: 0,
                id: KeysetId::from("009a1f293253e41e"),
                blinded: hash_to_curve(&[i as u8]).unwrap(),
                witness: None,
            })
            .collect()
    }

    #[test]
    fn change_uses_the_first_outputs() {
        let outs = outputs(4);
        let change = messages_for_change(5, &outs);
        assert_eq!(change.iter().map(|o| o.amount).collect::<Vec<_>>(), vec![1, 4]);
        assert_eq!(change[0].blinded, outs[0].blinded);
        assert_eq!(change[1].blinded, outs[1].blinded);
    }

    #[test]
    fn change_truncates_to_available_outputs() {
        let change = messages_for_change(7, &outputs(2));
        assert_eq!(change.iter().map(|o| o.amount).collect::<Vec<_>>(), vec![1, 2]);
        assert!(messages_for_change(0, &outputs(3)).is_empty());
    }
}
