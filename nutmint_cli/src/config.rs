#![doc = include_str!("../README.md")]

use clap::{Args, Parser, Subcommand};
use libnutmint::amount::Unit;
use std::path::PathBuf;

/// Cashu mint operator tool.
///
/// Keyset management, proof state inspection and a self-contained demo round for a nutmint store.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Config {
    /// Path to the mint configuration file. The default is `$HOME/.nutmint/config.yml`.
    #[arg(long = "config-file", short = 'c', global = true)]
    pub config_file: Option<PathBuf>,
    /// Hex-encoded mint private key. Overrides `mint_private_key` in the configuration file.
    #[arg(long = "private-key", env = "MINT_PRIVATE_KEY", hide_env_values = true, global = true)]
    pub private_key: Option<String>,
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Write a configuration file with a fresh random private key.
    #[command(name = "init")]
    Init(InitCommand),
    /// Create a first keyset for every configured unit that has none.
    #[command(name = "bootstrap")]
    Bootstrap,
    /// List every keyset in the store.
    #[command(name = "keysets", alias = "ls")]
    Keysets,
    /// Replace the active keyset of a unit with a new version.
    #[command(name = "rotate")]
    Rotate(RotateCommand),
    /// Show the state of proofs, by their hex-encoded `Y` points.
    #[command(name = "check-state", alias = "state")]
    CheckState {
        #[arg(required = true)]
        ys: Vec<String>,
    },
    /// Mint, swap and melt against the fake Lightning backend.
    #[command(name = "demo")]
    Demo(DemoCommand),
}

#[derive(Debug, Args)]
pub struct InitCommand {
    /// Overwrite an existing configuration file.
    #[arg(long = "force", short = 'f', default_value_t = false)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct RotateCommand {
    /// The unit to rotate.
    #[arg(long = "unit", short = 'u', default_value = "sat")]
    pub unit: Unit,
    /// Input fee for the new keyset, in parts per thousand. Defaults to the configured fee.
    #[arg(long = "fee")]
    pub input_fee_ppk: Option<u64>,
    /// Lifetime of the new keyset in hours. Defaults to the configured limit.
    #[arg(long = "expiry-hours")]
    pub expiry_limit_hours: Option<u64>,
}

#[derive(Debug, Args)]
pub struct DemoCommand {
    /// The amount to mint.
    #[arg(long = "amount", short = 'a', default_value_t = 100)]
    pub amount: u64,
    /// The amount of the invoice to melt. Defaults to half the minted amount.
    #[arg(long = "melt")]
    pub melt_amount: Option<u64>,
}

pub struct GlobalOptions {
    pub config_file: Option<PathBuf>,
    pub private_key: Option<String>,
}

impl Config {
    pub fn to_parts(self) -> (GlobalOptions, CliCommand) {
        let global = GlobalOptions { config_file: self.config_file, private_key: self.private_key };
        (global, self.command)
    }
}
