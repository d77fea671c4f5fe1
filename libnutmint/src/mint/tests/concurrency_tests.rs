use super::wallet::*;
use crate::amount::{amount_split, Unit};
use crate::keyset::{IdVersion, MasterKey};
use crate::lightning::fake::FakeLightning;
use crate::lightning::LightningBackend;
use crate::mint::error::MintError;
use crate::mint::types::{BlindSignature, Proof, ProofState, SwapRequest};
use crate::mint::{Mint, MintSettings};
use crate::signer::{LocalSigner, Signer};
use crate::storage::{FileStore, MintStore};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

const RACERS: usize = 8;
const ROUNDS: usize = 5;

/// Swaps the same proofs from `RACERS` threads at once, each with its own outputs.
fn race_swaps<S: MintStore, G: Signer, L: LightningBackend>(
    mint: &Mint<S, G, L>,
    proofs: &[Proof],
) -> Vec<Result<Vec<BlindSignature>, MintError>> {
    let id = active_id(mint, Unit::Sat);
    let amounts = amount_split(sum(proofs));
    thread::scope(|s| {
        let racers: Vec<_> = (0..RACERS)
            .map(|_| {
                let outputs = Blinded::new(&id, &amounts).outputs;
                s.spawn(move || mint.swap(&SwapRequest { inputs: proofs.to_vec(), outputs }))
            })
            .collect();
        racers.into_iter().map(|racer| racer.join().unwrap()).collect()
    })
}

async fn only_one_swap_wins<S: MintStore, G: Signer, L: LightningBackend>(mint: &Mint<S, G, L>) {
    for _ in 0..ROUNDS {
        let proofs = mint_proofs(mint, 64).await;
        let results = race_swaps(mint, &proofs);
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        for err in results.into_iter().filter_map(Result::err) {
            assert!(matches!(err, MintError::ProofAlreadySpent), "unexpected error: {err}");
        }
        let states = mint.check_proof_state(&ys(&proofs)).unwrap();
        assert!(states.iter().all(|s| s.state == ProofState::Spent));
    }
}

#[tokio::test]
async fn concurrent_swaps_of_the_same_proofs() {
    let mint = default_mint();
    only_one_swap_wins(&mint).await;
}

#[tokio::test]
async fn concurrent_swaps_against_the_file_store() {
    let path = PathBuf::from("./test_data/concurrent_swaps");
    let _ = fs::remove_dir_all(&path);
    let settings = MintSettings::default();
    let store = Arc::new(FileStore::new(path).unwrap());
    let master = MasterKey::from_hex("0f0e0d0c0b0a09080706050403020100").unwrap();
    let signer = LocalSigner::new(store.clone(), master, IdVersion::Legacy).unwrap();
    signer.bootstrap(&settings.units, 0, 0).unwrap();
    let mint = Mint::new(store, signer, FakeLightning::new(0), settings);
    only_one_swap_wins(&mint).await;
}

#[tokio::test]
async fn concurrent_swaps_of_overlapping_inputs() {
    let mint = default_mint();
    let proofs = mint_proofs(&mint, 7).await;
    // every request spends the 4 along with one of the smaller proofs
    let requests: Vec<Vec<Proof>> = vec![
        vec![proofs[2].clone(), proofs[0].clone()],
        vec![proofs[2].clone(), proofs[1].clone()],
        vec![proofs[1].clone(), proofs[2].clone()],
    ];
    let id = active_id(&mint, Unit::Sat);
    let results: Vec<_> = thread::scope(|s| {
        let racers: Vec<_> = requests
            .iter()
            .map(|inputs| {
                let outputs = Blinded::new(&id, &amount_split(sum(inputs))).outputs;
                let mint = &mint;
                s.spawn(move || mint.swap(&SwapRequest { inputs: inputs.clone(), outputs }))
            })
            .collect();
        racers.into_iter().map(|racer| racer.join().unwrap()).collect()
    });
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let states = mint.check_proof_state(&ys(&proofs)).unwrap();
    assert_eq!(states[2].state, ProofState::Spent);
    assert_eq!(states.iter().filter(|s| s.state == ProofState::Spent).count(), 2);
}
