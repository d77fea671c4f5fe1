use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Number of power-of-two denominations in a full keyset (`2^0 ..= 2^63`).
pub const MAX_KEYSET_ORDER: usize = 64;

/// The accounting unit of a keyset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Sat,
    Msat,
    Auth,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unit not supported: {0}")]
pub struct UnknownUnit(pub String);

impl Unit {
    /// The index used by the legacy derivation scheme (`master / index / version / i`).
    pub const fn enum_index(&self) -> u32 {
        match self {
            Unit::Sat => 1,
            Unit::Msat => 2,
            Unit::Auth => 3,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Unit::Sat => "sat",
            Unit::Msat => "msat",
            Unit::Auth => "auth",
        }
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Unit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sat" => Ok(Unit::Sat),
            "msat" => Ok(Unit::Msat),
            "auth" => Ok(Unit::Auth),
            other => Err(UnknownUnit(other.to_string())),
        }
    }
}

/// The denominations a keyset for `unit` carries. Auth keysets only ever sign tokens of amount 1.
pub fn keyset_amounts(unit: Unit) -> Vec<u64> {
    match unit {
        Unit::Auth => vec![1],
        _ => (0..MAX_KEYSET_ORDER).map(|i| 1u64 << i).collect(),
    }
}

/// Splits an amount into its power-of-two parts in ascending order, e.g. 13 -> [1, 4, 8].
pub fn amount_split(amount: u64) -> Vec<u64> {
    (0..u64::BITS).map(|pos| 1u64 << pos).filter(|bit| amount & bit != 0).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn split_amounts() {
        assert_eq!(amount_split(13), vec![1, 4, 8]);
        assert_eq!(amount_split(0), Vec::<u64>::new());
        assert_eq!(amount_split(1), vec![1]);
        assert_eq!(amount_split(64), vec![64]);
        assert_eq!(amount_split(u64::MAX).len(), 64);
        assert_eq!(amount_split(1000).iter().sum::<u64>(), 1000);
    }

    #[test]
    fn keyset_denominations() {
        let amounts = keyset_amounts(Unit::Sat);
        assert_eq!(amounts.len(), MAX_KEYSET_ORDER);
        assert_eq!(amounts[0], 1);
        assert_eq!(amounts[63], 1 << 63);
        assert_eq!(keyset_amounts(Unit::Auth), vec![1]);
    }

    #[test]
    fn unit_strings() {
        assert_eq!(Unit::from_str("sat").unwrap(), Unit::Sat);
        assert_eq!(Unit::from_str("msat").unwrap(), Unit::Msat);
        assert_eq!(Unit::from_str("auth").unwrap(), Unit::Auth);
        assert!(Unit::from_str("usd").is_err());
        assert_eq!(Unit::Msat.to_string(), "msat");
        assert_eq!(serde_json::to_string(&Unit::Sat).unwrap(), r#""sat""#);
        assert_eq!(Unit::Sat.enum_index(), 1);
        assert_eq!(Unit::Msat.enum_index(), 2);
    }
}
