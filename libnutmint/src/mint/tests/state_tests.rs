use super::wallet::*;
use crate::amount::Unit;
use crate::keyset::{IdVersion, MasterKey};
use crate::lightning::fake::FakeLightning;
use crate::mint::error::MintError;
use crate::mint::types::{ProofState, SwapRequest};
use crate::mint::{Mint, MintSettings};
use crate::signer::{LocalSigner, RemoteSigner, Signer, SignerService};
use crate::storage::{FileStore, MemoryStore};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

const RESTART_MASTER: &str = "5d1e0b2f9a8c7d6e5f4a3b2c1d0e9f8a";

#[tokio::test]
async fn proof_states_follow_a_swap() {
    let mint = default_mint();
    let proofs = mint_proofs(&mint, 5).await;
    let before = mint.check_proof_state(&ys(&proofs)).unwrap();
    assert!(before.iter().all(|s| s.state == ProofState::Unspent && s.witness.is_none()));

    let id = active_id(&mint, Unit::Sat);
    let unseen = Blinded::new(&id, &[1, 4]);
    let request = SwapRequest { inputs: proofs[..1].to_vec(), outputs: Blinded::new(&id, &[1]).outputs };
    let signatures = mint.swap(&request).unwrap();
    assert_eq!(signatures.len(), 1);

    let mut query = ys(&proofs);
    query.reverse();
    let after = mint.check_proof_state(&query).unwrap();
    assert_eq!(after[0].y, query[0]);
    assert_eq!(after[0].state, ProofState::Unspent);
    assert_eq!(after[1].state, ProofState::Spent);
    assert!(mint.restore(&unseen.outputs).unwrap().outputs.is_empty());
}

#[tokio::test]
async fn swap_outputs_can_be_restored() {
    let mint = default_mint();
    let proofs = mint_proofs(&mint, 9).await;
    let id = active_id(&mint, Unit::Sat);
    let blinded = Blinded::new(&id, &[1, 8]);
    let signatures = mint.swap(&SwapRequest { inputs: proofs, outputs: blinded.outputs.clone() }).unwrap();
    let restored = mint.restore(&blinded.outputs).unwrap();
    assert_eq!(restored.signatures, signatures);
    assert_eq!(restored.outputs, blinded.outputs);
}

#[tokio::test]
async fn spent_proofs_survive_a_restart() {
    let path = PathBuf::from("./test_data/mint_restart");
    let _ = fs::remove_dir_all(&path);
    let settings = MintSettings::default();
    let open = || {
        let store = Arc::new(FileStore::new(path.clone()).unwrap());
        let master = MasterKey::from_hex(RESTART_MASTER).unwrap();
        let signer = LocalSigner::new(store.clone(), master, IdVersion::Legacy).unwrap();
        signer.bootstrap(&settings.units, 0, 0).unwrap();
        Mint::new(store, signer, FakeLightning::new(0), settings.clone())
    };

    let (proofs, id) = {
        let mint = open();
        let proofs = mint_proofs(&mint, 6).await;
        let id = active_id(&mint, Unit::Sat);
        mint.swap(&SwapRequest { inputs: proofs.clone(), outputs: Blinded::new(&id, &[2, 4]).outputs }).unwrap();
        (proofs, id)
    };

    let mint = open();
    // Bootstrapping again reuses the stored keyset instead of rotating.
    assert_eq!(active_id(&mint, Unit::Sat), id);
    assert_eq!(mint.keysets().unwrap().len(), 1);
    let err = mint.swap(&SwapRequest { inputs: proofs, outputs: Blinded::new(&id, &[2, 4]).outputs }).unwrap_err();
    assert!(matches!(err, MintError::ProofAlreadySpent));
}

#[tokio::test]
async fn mint_runs_against_a_remote_signer() {
    let store = Arc::new(MemoryStore::new());
    let master = MasterKey::from_hex(RESTART_MASTER).unwrap();
    let local = LocalSigner::new(store.clone(), master, IdVersion::V2).unwrap();
    local.bootstrap(&[Unit::Sat], 100, 0).unwrap();
    let pubkey = local.get_signer_pubkey().unwrap();
    let signer = RemoteSigner::new(SignerService::new(local));
    assert_eq!(signer.get_signer_pubkey().unwrap(), pubkey);

    let settings = MintSettings { keyset_id_version: IdVersion::V2, input_fee_ppk: 100, ..MintSettings::default() };
    let mint = Mint::new(store, signer, FakeLightning::new(0), settings);
    let id = active_id(&mint, Unit::Sat);
    assert_eq!(id.version(), Some(IdVersion::V2));

    let proofs = mint_proofs(&mint, 3).await;
    let blinded = Blinded::new(&id, &[2]);
    let signatures = mint.swap(&SwapRequest { inputs: proofs.clone(), outputs: blinded.outputs.clone() }).unwrap();
    assert_eq!(sum(&blinded.unblind(&mint, &signatures)), 2);

    let err = mint.swap(&SwapRequest { inputs: proofs, outputs: Blinded::new(&id, &[1]).outputs }).unwrap_err();
    assert_eq!(err.code(), 11001);
}
