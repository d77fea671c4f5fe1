use crate::crypto::CurvePoint;
use crate::helpers::Timestamp;
use crate::spend_condition::SpendConditionError;
use std::fmt::Display;
use std::str::FromStr;

pub const SIGFLAG: &str = "sigflag";
pub const PUBKEYS: &str = "pubkeys";
pub const N_SIGS: &str = "n_sigs";
pub const LOCKTIME: &str = "locktime";
pub const REFUND: &str = "refund";
pub const N_SIGS_REFUND: &str = "n_sigs_refund";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SigFlag {
    /// Each input signs its own secret.
    #[default]
    SigInputs,
    /// The first input's witness signs the whole request.
    SigAll,
}

impl SigFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SigFlag::SigInputs => "SIG_INPUTS",
            SigFlag::SigAll => "SIG_ALL",
        }
    }
}

impl Display for SigFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigFlag {
    type Err = SpendConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SIG_INPUTS" => Ok(SigFlag::SigInputs),
            "SIG_ALL" => Ok(SigFlag::SigAll),
            other => Err(SpendConditionError::InvalidSigFlag(other.to_string())),
        }
    }
}

/// The typed view of a condition's `tags` array.
///
/// Zero values mean "not set": `n_sigs == 0` behaves like 1, `locktime == 0` means no timelock.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tags {
    pub sigflag: SigFlag,
    pub pubkeys: Vec<CurvePoint>,
    pub n_sigs: u64,
    pub locktime: u64,
    pub refund: Vec<CurvePoint>,
    pub n_sigs_refund: u64,
}

impl Tags {
    /// Parses the wire form `[["name", "value", ...], ...]`.
    pub fn from_raw(raw: &[Vec<String>]) -> Result<Self, SpendConditionError> {
        let mut tags = Tags::default();
        for tag in raw {
            if tag.len() < 2 {
                return Err(SpendConditionError::MalformedTag(format!("{tag:?}")));
            }
            let values = &tag[1..];
            match tag[0].as_str() {
                SIGFLAG => {
                    tags.sigflag = single_value(tag)?.parse()?;
                }
                PUBKEYS => tags.pubkeys.extend(parse_keys(values)?),
                REFUND => tags.refund.extend(parse_keys(values)?),
                N_SIGS => tags.n_sigs = parse_int(single_value(tag)?)?,
                LOCKTIME => tags.locktime = parse_int(single_value(tag)?)?,
                N_SIGS_REFUND => tags.n_sigs_refund = parse_int(single_value(tag)?)?,
                other => return Err(SpendConditionError::InvalidTagName(other.to_string())),
            }
        }
        Ok(tags)
    }

    /// The canonical wire form. Only non-default entries are written, always in the order
    /// sigflag, pubkeys, n_sigs, locktime, refund, n_sigs_refund.
    pub fn to_raw(&self) -> Vec<Vec<String>> {
        let mut raw = Vec::new();
        if self.sigflag != SigFlag::default() {
            raw.push(vec![SIGFLAG.to_string(), self.sigflag.to_string()]);
        }
        if !self.pubkeys.is_empty() {
            raw.push(key_tag(PUBKEYS, &self.pubkeys));
        }
        if self.n_sigs != 0 {
            raw.push(vec![N_SIGS.to_string(), self.n_sigs.to_string()]);
        }
        if self.locktime != 0 {
            raw.push(vec![LOCKTIME.to_string(), self.locktime.to_string()]);
        }
        if !self.refund.is_empty() {
            raw.push(key_tag(REFUND, &self.refund));
        }
        if self.n_sigs_refund != 0 {
            raw.push(vec![N_SIGS_REFUND.to_string(), self.n_sigs_refund.to_string()]);
        }
        raw
    }

    /// True when a locktime is set and the current time is strictly past it.
    pub fn locktime_passed(&self) -> bool {
        self.locktime != 0 && Timestamp::new(self.locktime).has_passed()
    }

    pub fn threshold(&self) -> usize {
        self.n_sigs.max(1) as usize
    }

    pub fn refund_threshold(&self) -> usize {
        self.n_sigs_refund.max(1) as usize
    }

    pub fn key_count(&self) -> usize {
        self.pubkeys.len() + self.refund.len()
    }
}

fn single_value(tag: &[String]) -> Result<&str, SpendConditionError> {
    match tag {
        [_, value] => Ok(value.as_str()),
        _ => Err(SpendConditionError::MalformedTag(format!("{tag:?}"))),
    }
}

fn parse_int(value: &str) -> Result<u64, SpendConditionError> {
    value.parse::<u64>().map_err(|_| SpendConditionError::InvalidTagValue(value.to_string()))
}

fn parse_keys(values: &[String]) -> Result<Vec<CurvePoint>, SpendConditionError> {
    values
        .iter()
        .map(|v| CurvePoint::from_hex(v).map_err(|_| SpendConditionError::InvalidTagValue(v.clone())))
        .collect()
}

fn key_tag(name: &str, keys: &[CurvePoint]) -> Vec<String> {
    let mut tag = Vec::with_capacity(keys.len() + 1);
    tag.push(name.to_string());
    tag.extend(keys.iter().map(CurvePoint::as_hex));
    tag
}
