use crate::error::CliError;
use libnutmint::amount::Unit;
use libnutmint::keyset::{IdVersion, MasterKey};
use libnutmint::mint::MintSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// The operator's mint configuration, stored as YAML.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MintConfig {
    /// Hex-encoded BIP-32 seed. Leave empty and set `MINT_PRIVATE_KEY` to keep it out of the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint_private_key: Option<String>,
    pub units: Vec<Unit>,
    pub input_fee_ppk: u64,
    pub expiry_limit_hours: u64,
    pub keyset_id_version: IdVersion,
    pub store_path: PathBuf,
    pub fake_invoice_fee_ppk: u64,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            mint_private_key: None,
            units: vec![Unit::Sat],
            input_fee_ppk: 0,
            expiry_limit_hours: 0,
            keyset_id_version: IdVersion::Legacy,
            store_path: nutmint_home().join("store"),
            fake_invoice_fee_ppk: 10,
        }
    }
}

impl MintConfig {
    pub fn try_load<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        load_config_file(path)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        save_config_file(path, self)
    }

    /// The master key, taking `override_key` (from the command line or environment) over the file.
    pub fn master_key(&self, override_key: Option<&str>) -> Result<MasterKey, CliError> {
        let hex = override_key.or(self.mint_private_key.as_deref()).ok_or(CliError::MissingPrivateKey)?;
        let hex = Zeroizing::new(hex.to_string());
        Ok(MasterKey::from_hex(&hex)?)
    }

    pub fn settings(&self) -> MintSettings {
        MintSettings {
            units: self.units.clone(),
            input_fee_ppk: self.input_fee_ppk,
            expiry_limit_hours: self.expiry_limit_hours,
            keyset_id_version: self.keyset_id_version,
            ..MintSettings::default()
        }
    }
}

fn nutmint_home() -> PathBuf {
    let mut home = std::env::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.push(".nutmint");
    home
}

pub fn default_config_path() -> PathBuf {
    nutmint_home().join("config.yml")
}

pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<MintConfig, CliError> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let config = serde_yml::from_reader(reader)?;
    Ok(config)
}

pub fn save_config_file<P: AsRef<Path>>(path: P, config: &MintConfig) -> Result<(), CliError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    serde_yml::to_writer(writer, config)?;
    Ok(())
}
