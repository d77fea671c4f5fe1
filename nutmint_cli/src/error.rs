use libnutmint::keyset::KeysetError;
use libnutmint::mint::MintError;
use libnutmint::signer::SignerError;
use libnutmint::storage::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid configuration file: {0}")]
    InvalidConfig(#[from] serde_yml::Error),
    #[error("No mint private key. Set MINT_PRIVATE_KEY, pass --private-key or run `nutmint init`.")]
    MissingPrivateKey,
    #[error("Invalid mint private key: {0}")]
    InvalidKey(#[from] KeysetError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),
    #[error("Mint error [{}]: {}", .0.code(), .0)]
    Mint(#[from] MintError),
}
