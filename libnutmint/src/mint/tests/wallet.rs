//! Just enough of a wallet to drive the mint: blinding outputs, unblinding signatures and checking DLEQ proofs.

use crate::amount::{amount_split, Unit};
use crate::crypto::bdhke;
use crate::crypto::dleq::verify_proof_dleq;
use crate::crypto::{CurvePoint, MintSecret};
use crate::keyset::{KeysetId, MasterKey};
use crate::lightning::fake::FakeLightning;
use crate::lightning::LightningBackend;
use crate::mint::error::MintError;
use crate::mint::types::{BlindSignature, BlindedMessage, MintRequest, Proof};
use crate::mint::{Mint, MintSettings};
use crate::signer::{LocalSigner, Signer};
use crate::storage::{MemoryStore, MintStore};
use std::sync::Arc;

pub type TestMint = Mint<MemoryStore, LocalSigner<MemoryStore>, FakeLightning>;

const MASTER: &str = "b8b2b7d1bb4ad3c1c0f43a3ab6e0d0a2b4ae1cc7c1f6b0f1d0f5cf3c8b5ae2e1";

pub fn new_mint(settings: MintSettings) -> TestMint {
    env_logger::try_init().ok();
    let store = Arc::new(MemoryStore::new());
    let master = MasterKey::from_hex(MASTER).expect("a valid master key");
    let signer = LocalSigner::new(store.clone(), master, settings.keyset_id_version).expect("a signer");
    signer.bootstrap(&settings.units, settings.input_fee_ppk, settings.expiry_limit_hours).expect("to bootstrap keysets");
    Mint::new(store, signer, FakeLightning::new(10), settings)
}

pub fn default_mint() -> TestMint {
    new_mint(MintSettings::default())
}

pub fn active_id<S: MintStore, G: Signer, L: LightningBackend>(mint: &Mint<S, G, L>, unit: Unit) -> KeysetId {
    mint.keys().unwrap().into_iter().find(|k| k.unit == unit).expect("an active keyset").id
}

pub fn random_secret() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

/// Outputs a wallet has sent to the mint, with what it needs to unblind the answers.
pub struct Blinded {
    pub secrets: Vec<String>,
    pub rs: Vec<MintSecret>,
    pub outputs: Vec<BlindedMessage>,
}

impl Blinded {
    pub fn new(id: &KeysetId, amounts: &[u64]) -> Self {
        let secrets = amounts.iter().map(|_| random_secret()).collect();
        Self::with_secrets(id, amounts, secrets)
    }

    pub fn with_secrets(id: &KeysetId, amounts: &[u64], secrets: Vec<String>) -> Self {
        assert_eq!(amounts.len(), secrets.len());
        let mut rng = rand::rng();
        let rs: Vec<MintSecret> = amounts.iter().map(|_| MintSecret::random(&mut rng)).collect();
        let outputs = amounts
            .iter()
            .zip(&secrets)
            .zip(&rs)
            .map(|((amount, secret), r)| BlindedMessage {
                amount: *amount,
                id: id.clone(),
                blinded: bdhke::blind_message(secret.as_bytes(), r).unwrap(),
                witness: None,
            })
            .collect();
        Self { secrets, rs, outputs }
    }

    /// Blank outputs for melt change. The mint picks their amounts.
    pub fn blank(id: &KeysetId, count: usize) -> Self {
        Self::new(id, &vec![1; count])
    }

    /// Turns signatures on the first `signatures.len()` outputs into proofs, checking each DLEQ proof on the way.
    pub fn unblind<S: MintStore, G: Signer, L: LightningBackend>(
        &self,
        mint: &Mint<S, G, L>,
        signatures: &[BlindSignature],
    ) -> Vec<Proof> {
        signatures
            .iter()
            .zip(&self.secrets)
            .zip(&self.rs)
            .map(|((sig, secret), r)| {
                let keys = mint.keys_by_id(&sig.id).unwrap();
                let mint_key = keys.keys[&sig.amount];
                let c = bdhke::unblind(&sig.signed, r, &mint_key).unwrap();
                let dleq = sig.dleq.as_ref().expect("signatures carry a DLEQ proof");
                assert!(verify_proof_dleq(secret.as_bytes(), &c, r, &mint_key, dleq).unwrap());
                Proof { amount: sig.amount, id: sig.id.clone(), secret: secret.clone(), c, witness: None }
            })
            .collect()
    }
}

/// Pays for and mints `amount` in the default unit, split into powers of two.
pub async fn mint_proofs<S: MintStore, G: Signer, L: LightningBackend>(
    mint: &Mint<S, G, L>,
    amount: u64,
) -> Vec<Proof> {
    let id = active_id(mint, Unit::Sat);
    let blinded = Blinded::new(&id, &amount_split(amount));
    mint_blinded(mint, amount, &blinded).await.unwrap()
}

/// Mints proofs on caller-chosen secrets, one per amount.
pub async fn mint_with_secrets<S: MintStore, G: Signer, L: LightningBackend>(
    mint: &Mint<S, G, L>,
    amounts: &[u64],
    secrets: Vec<String>,
) -> Vec<Proof> {
    let id = active_id(mint, Unit::Sat);
    let blinded = Blinded::with_secrets(&id, amounts, secrets);
    mint_blinded(mint, amounts.iter().sum(), &blinded).await.unwrap()
}

pub async fn mint_blinded<S: MintStore, G: Signer, L: LightningBackend>(
    mint: &Mint<S, G, L>,
    amount: u64,
    blinded: &Blinded,
) -> Result<Vec<Proof>, MintError> {
    let quote = mint.request_mint_quote(amount, Unit::Sat).await?;
    let request = MintRequest { quote: quote.quote, outputs: blinded.outputs.clone() };
    let signatures = mint.mint_tokens(&request).await?;
    Ok(blinded.unblind(mint, &signatures))
}

pub fn ys(proofs: &[Proof]) -> Vec<CurvePoint> {
    proofs.iter().map(|p| p.y().unwrap()).collect()
}

pub fn sum(proofs: &[Proof]) -> u64 {
    proofs.iter().map(|p| p.amount).sum()
}
