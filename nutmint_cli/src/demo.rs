//! A full mint, swap and melt round against an in-memory store and the fake Lightning backend.
//!
//! The wallet side lives here too: it blinds outputs, unblinds the mint's answers and checks their DLEQ proofs.

use crate::commands::load_or_default_config;
use crate::config::{DemoCommand, GlobalOptions};
use crate::mint_config::MintConfig;
use anyhow::anyhow;
use libnutmint::amount::{amount_split, Unit};
use libnutmint::crypto::bdhke;
use libnutmint::crypto::dleq::verify_proof_dleq;
use libnutmint::crypto::MintSecret;
use libnutmint::keyset::{KeysetId, MasterKey};
use libnutmint::lightning::fake::FakeLightning;
use libnutmint::mint::types::{BlindSignature, BlindedMessage, MeltRequest, MintRequest, Proof, SwapRequest};
use libnutmint::mint::Mint;
use libnutmint::signer::LocalSigner;
use libnutmint::storage::MemoryStore;
use log::*;
use rand::RngCore;
use std::sync::Arc;
use zeroize::Zeroizing;

type DemoMint = Mint<MemoryStore, LocalSigner<MemoryStore>, FakeLightning>;

/// Outputs sent to the mint, kept with their secrets and blinding factors.
struct PendingOutputs {
    secrets: Vec<String>,
    rs: Vec<MintSecret>,
    outputs: Vec<BlindedMessage>,
}

impl PendingOutputs {
    fn new(id: &KeysetId, amounts: &[u64]) -> Result<Self, anyhow::Error> {
        let mut rng = rand::rng();
        let mut pending = Self { secrets: Vec::new(), rs: Vec::new(), outputs: Vec::new() };
        for amount in amounts {
            let mut secret = [0u8; 32];
            rng.fill_bytes(&mut secret);
            let secret = hex::encode(secret);
            let r = MintSecret::random(&mut rng);
            let blinded = bdhke::blind_message(secret.as_bytes(), &r)?;
            pending.outputs.push(BlindedMessage { amount: *amount, id: id.clone(), blinded, witness: None });
            pending.secrets.push(secret);
            pending.rs.push(r);
        }
        Ok(pending)
    }

    fn unblind(&self, mint: &DemoMint, signatures: &[BlindSignature]) -> Result<Vec<Proof>, anyhow::Error> {
        let mut proofs = Vec::with_capacity(signatures.len());
        for ((sig, secret), r) in signatures.iter().zip(&self.secrets).zip(&self.rs) {
            let keys = mint.keys_by_id(&sig.id)?;
            let mint_key = keys.keys.get(&sig.amount).ok_or_else(|| anyhow!("No key for amount {}", sig.amount))?;
            let c = bdhke::unblind(&sig.signed, r, mint_key)?;
            if let Some(dleq) = &sig.dleq {
                if !verify_proof_dleq(secret.as_bytes(), &c, r, mint_key, dleq)? {
                    return Err(anyhow!("The mint's DLEQ proof for {} does not verify", sig.signed));
                }
            }
            proofs.push(Proof { amount: sig.amount, id: sig.id.clone(), secret: secret.clone(), c, witness: None });
        }
        Ok(proofs)
    }
}

fn total(proofs: &[Proof]) -> u64 {
    proofs.iter().map(|p| p.amount).sum()
}

fn demo_mint(config: &MintConfig, private_key: Option<&str>) -> Result<DemoMint, anyhow::Error> {
    let master = match config.master_key(private_key) {
        Ok(master) => master,
        Err(_) => {
            info!("No mint private key configured; the demo uses a throwaway key");
            let mut seed = Zeroizing::new([0u8; 32]);
            rand::rng().fill_bytes(seed.as_mut());
            MasterKey::from_bytes(seed.as_ref())?
        }
    };
    let settings = config.settings();
    let store = Arc::new(MemoryStore::new());
    let signer = LocalSigner::new(store.clone(), master, settings.keyset_id_version)?;
    signer.bootstrap(&settings.units, settings.input_fee_ppk, settings.expiry_limit_hours)?;
    Ok(Mint::new(store, signer, FakeLightning::new(config.fake_invoice_fee_ppk), settings))
}

pub async fn run_demo(options: &GlobalOptions, cmd: DemoCommand) -> Result<(), anyhow::Error> {
    let config = load_or_default_config(options)?;
    let mint = demo_mint(&config, options.private_key.as_deref())?;
    let id = mint
        .keys()?
        .into_iter()
        .find(|k| k.unit == Unit::Sat)
        .map(|k| k.id)
        .ok_or_else(|| anyhow!("The demo needs the sat unit to be configured"))?;
    println!("Active sat keyset: {id}");

    let quote = mint.request_mint_quote(cmd.amount, Unit::Sat).await?;
    println!("Mint quote {} for invoice {}", quote.quote, quote.request);
    let outputs = PendingOutputs::new(&id, &amount_split(cmd.amount))?;
    let signatures = mint.mint_tokens(&MintRequest { quote: quote.quote.clone(), outputs: outputs.outputs.clone() }).await?;
    let proofs = outputs.unblind(&mint, &signatures)?;
    println!("Minted {} sat in {} proofs", total(&proofs), proofs.len());

    let keysets = mint.keysets()?;
    let fee = libnutmint::mint::fees::input_fee(&proofs, &keysets)?;
    let swapped_amount = total(&proofs).saturating_sub(fee);
    let outputs = PendingOutputs::new(&id, &amount_split(swapped_amount))?;
    let signatures = mint.swap(&SwapRequest { inputs: proofs, outputs: outputs.outputs.clone() })?;
    let proofs = outputs.unblind(&mint, &signatures)?;
    println!("Swapped into {} proofs worth {} sat (fee {fee})", proofs.len(), total(&proofs));

    let melt_amount = cmd.melt_amount.unwrap_or(cmd.amount / 2);
    let invoice = FakeLightning::create_invoice(melt_amount, Unit::Sat);
    let melt_quote = mint.request_melt_quote(&invoice, Unit::Sat).await?;
    println!("Melt quote {} for {} sat, fee reserve {}", melt_quote.quote, melt_quote.amount, melt_quote.fee_reserve);
    // Enough blank outputs to carry any change the inputs could leave over.
    let change_bound = total(&proofs).saturating_sub(melt_quote.amount);
    let blanks = (u64::BITS - change_bound.leading_zeros()).max(1) as usize;
    let blank = PendingOutputs::new(&id, &vec![1; blanks])?;
    let request = MeltRequest { quote: melt_quote.quote, inputs: proofs, outputs: blank.outputs.clone() };
    let response = mint.melt(&request).await?;
    let change = blank.unblind(&mint, &response.change)?;
    println!(
        "Melt {}: preimage {}, change {} sat in {} proofs",
        response.quote.state,
        response.quote.payment_preimage.as_deref().unwrap_or("-"),
        total(&change),
        change.len()
    );

    let ys = request.inputs.iter().map(Proof::y).collect::<Result<Vec<_>, _>>()?;
    for entry in mint.check_proof_state(&ys)? {
        println!("{} {}", entry.y, entry.state);
    }
    Ok(())
}
