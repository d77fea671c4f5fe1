use crate::config::{GlobalOptions, InitCommand, RotateCommand};
use crate::error::CliError;
use crate::mint_config::{default_config_path, MintConfig};
use anyhow::anyhow;
use libnutmint::crypto::CurvePoint;
use libnutmint::keyset::KeysetInfo;
use libnutmint::lightning::fake::FakeLightning;
use libnutmint::mint::Mint;
use libnutmint::signer::{LocalSigner, RotateArgs, Signer};
use libnutmint::storage::FileStore;
use log::*;
use rand::RngCore;
use std::path::PathBuf;
use std::sync::Arc;
use zeroize::Zeroizing;

pub type StoreMint = Mint<FileStore, LocalSigner<FileStore>, FakeLightning>;

fn config_path(options: &GlobalOptions) -> PathBuf {
    options.config_file.clone().unwrap_or_else(default_config_path)
}

/// Loads the configuration file, falling back to defaults when there is none.
pub fn load_or_default_config(options: &GlobalOptions) -> Result<MintConfig, CliError> {
    let path = config_path(options);
    match MintConfig::try_load(&path) {
        Ok(config) => Ok(config),
        Err(CliError::IoError(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            println!("No configuration file found at {}. Using defaults.", path.display());
            Ok(MintConfig::default())
        }
        Err(err) => Err(err),
    }
}

/// Opens the configured file store with a local signer. Keysets are loaded as stored; nothing is created.
pub fn open_mint(options: &GlobalOptions) -> Result<(MintConfig, StoreMint), CliError> {
    let config = load_or_default_config(options)?;
    let master = config.master_key(options.private_key.as_deref())?;
    info!("Opening mint store at {}", config.store_path.display());
    let store = Arc::new(FileStore::new(config.store_path.clone())?);
    let signer = LocalSigner::new(store.clone(), master, config.keyset_id_version)?;
    let mint = Mint::new(store, signer, FakeLightning::new(config.fake_invoice_fee_ppk), config.settings());
    Ok((config, mint))
}

pub fn init(options: &GlobalOptions, cmd: InitCommand) -> Result<(), anyhow::Error> {
    let path = config_path(options);
    if path.exists() && !cmd.force {
        return Err(anyhow!("{} already exists. Use --force to overwrite it.", path.display()));
    }
    let mut seed = Zeroizing::new([0u8; 32]);
    rand::rng().fill_bytes(seed.as_mut());
    let config = MintConfig { mint_private_key: Some(hex::encode(seed.as_ref())), ..MintConfig::default() };
    config.save(&path)?;
    println!("Configuration written to {}", path.display());
    println!("Keep a copy of mint_private_key somewhere safe. Every keyset is derived from it.");
    Ok(())
}

pub fn bootstrap(options: &GlobalOptions) -> Result<(), anyhow::Error> {
    let (config, mint) = open_mint(options)?;
    let created = mint.signer().bootstrap(&config.units, config.input_fee_ppk, config.expiry_limit_hours)?;
    if created.is_empty() {
        println!("Every configured unit already has an active keyset.");
    }
    for info in &created {
        println!("Created {}", format_keyset(info));
    }
    Ok(())
}

pub fn list_keysets(options: &GlobalOptions) -> Result<(), anyhow::Error> {
    let (_, mint) = open_mint(options)?;
    let keysets = mint.keysets()?;
    println!("{} keysets found.", keysets.len());
    for info in &keysets {
        println!("{}", format_keyset(info));
    }
    println!("Signer public key: {}", mint.signer().get_signer_pubkey()?);
    Ok(())
}

pub fn rotate(options: &GlobalOptions, cmd: RotateCommand) -> Result<(), anyhow::Error> {
    let (config, mint) = open_mint(options)?;
    let args = RotateArgs {
        unit: cmd.unit,
        input_fee_ppk: cmd.input_fee_ppk.unwrap_or(config.input_fee_ppk),
        expiry_limit_hours: cmd.expiry_limit_hours.unwrap_or(config.expiry_limit_hours),
    };
    let info = mint.signer().rotate_keyset(args)?;
    println!("Rotated {}. New keyset: {}", cmd.unit, format_keyset(&info));
    Ok(())
}

pub fn check_state(options: &GlobalOptions, ys: &[String]) -> Result<(), anyhow::Error> {
    let points = ys
        .iter()
        .map(|y| CurvePoint::from_hex(y).map_err(|e| anyhow!("{y} is not a curve point: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    let (_, mint) = open_mint(options)?;
    for entry in mint.check_proof_state(&points)? {
        match entry.witness {
            Some(witness) => println!("{} {} witness: {witness}", entry.y, entry.state),
            None => println!("{} {}", entry.y, entry.state),
        }
    }
    Ok(())
}

pub fn format_keyset(info: &KeysetInfo) -> String {
    let status = if info.active { "active" } else { "inactive" };
    let expiry = info
        .final_expiry
        .and_then(|t| t.to_datetime())
        .map(|t| format!(", expires {}", t.to_rfc3339()))
        .unwrap_or_default();
    format!("{} [{}, v{}, {status}, fee {} ppk{expiry}]", info.id, info.unit, info.version, info.input_fee_ppk)
}
