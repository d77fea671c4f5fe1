use crate::lightning::LightningBackend;
use crate::mint::error::MintError;
use crate::mint::types::{BlindSignature, ProofState, StoredProof, SwapRequest};
use crate::mint::verification::{check_balance, check_inputs_unknown, check_outputs_unsigned, total};
use crate::mint::Mint;
use crate::signer::{Signer, SpendContext};
use crate::storage::{MintStore, StoreTransaction};
use log::*;

impl<S: MintStore, G: Signer, L: LightningBackend> Mint<S, G, L> {
    /// Exchanges `inputs` for fresh signatures on `outputs`, minus the input fee.
    pub fn swap(&self, request: &SwapRequest) -> Result<Vec<BlindSignature>, MintError> {
        let keysets = self.signer.get_keysets()?;
        let inputs = self.check_inputs(&request.inputs, &keysets)?;
        let output_unit = self.check_outputs(&request.outputs, &keysets)?;
        if output_unit != inputs.unit {
            return Err(MintError::UnitMismatch { inputs: inputs.unit, outputs: output_unit });
        }
        let output_amount = total(request.outputs.iter().map(|o| o.amount))?;
        check_balance(inputs.amount, output_amount, inputs.fee)?;
        self.verify_inputs(&request.inputs, &request.outputs, &SpendContext::Swap)?;

        let mut tx = self.store.begin()?;
        check_inputs_unknown(&tx, &inputs.ys)?;
        check_outputs_unsigned(&tx, &request.outputs)?;
        let (signatures, recovery) = self.signer.sign_blind_messages(&request.outputs)?;
        let spent: Vec<StoredProof> = request
            .inputs
            .iter()
            .zip(&inputs.ys)
            .map(|(proof, y)| StoredProof::new(proof.clone(), *y, inputs.unit, ProofState::Spent, None))
            .collect();
        tx.save_proofs(&spent)?;
        tx.save_recover_sigs(&recovery)?;
        tx.commit()?;
        info!(
            "Swapped {} inputs worth {} {} for {} outputs (fee {})",
            request.inputs.len(),
            inputs.amount,
            inputs.unit,
            signatures.len(),
            inputs.fee
        );
        Ok(signatures)
    }
}
