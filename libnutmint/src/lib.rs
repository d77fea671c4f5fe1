pub mod amount;
pub mod crypto;
pub mod helpers;
pub mod keyset;
pub mod lightning;
pub mod mint;
pub mod signer;
pub mod spend_condition;
pub mod storage;
