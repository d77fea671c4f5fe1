use crate::amount::Unit;
use crate::keyset::IdVersion;
use serde::{Deserialize, Serialize};

/// Operator-chosen mint parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MintSettings {
    /// Units the mint keeps keysets for and accepts in requests.
    pub units: Vec<Unit>,
    /// Fee, in parts per thousand of a token, charged for every input of a new keyset.
    pub input_fee_ppk: u64,
    /// Lifetime of newly rotated keysets. Zero means keysets never expire.
    pub expiry_limit_hours: u64,
    pub keyset_id_version: IdVersion,
    pub quote_expiry_minutes: u64,
    pub max_inputs: usize,
    pub max_outputs: usize,
    pub minting_disabled: bool,
}

impl Default for MintSettings {
    fn default() -> Self {
        Self {
            units: vec![Unit::Sat],
            input_fee_ppk: 0,
            expiry_limit_hours: 0,
            keyset_id_version: IdVersion::Legacy,
            quote_expiry_minutes: 15,
            max_inputs: 1000,
            max_outputs: 1000,
            minting_disabled: false,
        }
    }
}

impl MintSettings {
    pub fn supports(&self, unit: Unit) -> bool {
        self.units.contains(&unit)
    }
}
