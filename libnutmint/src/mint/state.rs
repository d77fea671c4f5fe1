use crate::crypto::CurvePoint;
use crate::lightning::LightningBackend;
use crate::mint::error::MintError;
use crate::mint::types::{BlindedMessage, ProofState, ProofStateEntry, RestoreResponse};
use crate::mint::Mint;
use crate::signer::Signer;
use crate::storage::{MintStore, StoreTransaction};

impl<S: MintStore, G: Signer, L: LightningBackend> Mint<S, G, L> {
    /// The state of each `Y`, in request order. Proofs the mint has never seen are unspent.
    pub fn check_proof_state(&self, ys: &[CurvePoint]) -> Result<Vec<ProofStateEntry>, MintError> {
        let tx = self.store.begin()?;
        let known = tx.get_proofs_by_y(ys)?;
        let states = ys
            .iter()
            .map(|y| match known.iter().find(|p| &p.y == y) {
                Some(stored) => {
                    ProofStateEntry { y: *y, state: stored.state, witness: stored.proof.witness.clone() }
                }
                None => ProofStateEntry { y: *y, state: ProofState::Unspent, witness: None },
            })
            .collect();
        Ok(states)
    }

    /// Signatures the mint has already issued for any of `outputs`.
    pub fn restore(&self, outputs: &[BlindedMessage]) -> Result<RestoreResponse, MintError> {
        let blinded: Vec<CurvePoint> = outputs.iter().map(|o| o.blinded).collect();
        let tx = self.store.begin()?;
        let sigs = tx.get_recover_sigs(&blinded)?;
        Ok(RestoreResponse {
            outputs: sigs.iter().map(|s| s.blinded_message()).collect(),
            signatures: sigs.iter().map(|s| s.blind_signature()).collect(),
        })
    }
}
