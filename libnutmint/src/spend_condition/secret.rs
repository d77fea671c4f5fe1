use crate::crypto::CurvePoint;
use crate::spend_condition::tags::Tags;
use crate::spend_condition::{SpendConditionError, MAX_CONDITION_KEYS};
use log::*;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    P2pk,
    Htlc,
}

impl ConditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::P2pk => "P2PK",
            ConditionKind::Htlc => "HTLC",
        }
    }
}

impl Display for ConditionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionKind {
    type Err = SpendConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P2PK" => Ok(ConditionKind::P2pk),
            "HTLC" => Ok(ConditionKind::Htlc),
            _ => Err(SpendConditionError::InvalidSpendCondition),
        }
    }
}

/// A proof secret, decided once at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Secret {
    /// A plain random secret. Whoever holds the proof can spend it.
    Unlocked(String),
    Conditioned(SpendCondition),
}

impl Secret {
    /// Anything that is not a JSON array tagged `P2PK` or `HTLC` is an unlocked secret. A JSON array that is
    /// too short or whose first element is not a string is rejected outright.
    pub fn parse(secret: &str) -> Result<Self, SpendConditionError> {
        let Ok(Value::Array(items)) = serde_json::from_str::<Value>(secret) else {
            return Ok(Secret::Unlocked(secret.to_string()));
        };
        if items.len() < 2 {
            return Err(SpendConditionError::InvalidSpendCondition);
        }
        let Value::String(kind) = &items[0] else {
            return Err(SpendConditionError::InvalidSpendCondition);
        };
        let Ok(kind) = kind.parse::<ConditionKind>() else {
            trace!("Secret kind {kind} is not a spend condition");
            return Ok(Secret::Unlocked(secret.to_string()));
        };
        let body = ConditionBody::deserialize(&items[1]).map_err(|e| {
            debug!("Could not read spend condition body: {e}");
            SpendConditionError::InvalidSpendCondition
        })?;
        SpendCondition::from_parts(kind, body.nonce, body.data, raw_tags(&body.tags)?).map(Secret::Conditioned)
    }

    pub fn condition(&self) -> Option<&SpendCondition> {
        match self {
            Secret::Unlocked(_) => None,
            Secret::Conditioned(condition) => Some(condition),
        }
    }

    pub fn is_conditioned(&self) -> bool {
        matches!(self, Secret::Conditioned(_))
    }
}

#[derive(Deserialize)]
struct ConditionBody {
    nonce: String,
    data: String,
    #[serde(default)]
    tags: Vec<Vec<Value>>,
}

#[derive(Serialize)]
struct ConditionBodyRef<'a> {
    nonce: &'a str,
    data: &'a str,
    #[serde(skip_serializing_if = "no_tags")]
    tags: &'a [Vec<String>],
}

fn no_tags(tags: &&[Vec<String>]) -> bool {
    tags.is_empty()
}

fn raw_tags(tags: &[Vec<Value>]) -> Result<Vec<Vec<String>>, SpendConditionError> {
    tags.iter()
        .map(|tag| {
            tag.iter()
                .map(|v| match v {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(SpendConditionError::MalformedTag(other.to_string())),
                })
                .collect()
        })
        .collect()
}

/// A parsed `["P2PK"|"HTLC", {nonce, data, tags}]` secret.
///
/// `data` is the locking public key for P2PK and the hex sha256 payment hash for HTLC. The tags are kept both
/// typed and exactly as received, since SIG_ALL requests compare inputs on the received form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendCondition {
    pub kind: ConditionKind,
    pub nonce: String,
    pub data: String,
    pub tags: Tags,
    raw_tags: Vec<Vec<String>>,
}

impl SpendCondition {
    fn from_parts(
        kind: ConditionKind,
        nonce: String,
        data: String,
        raw_tags: Vec<Vec<String>>,
    ) -> Result<Self, SpendConditionError> {
        let valid_data = match kind {
            ConditionKind::P2pk => CurvePoint::from_hex(&data).is_ok(),
            ConditionKind::Htlc => data.len() == 64 && hex::decode(&data).is_ok(),
        };
        if !valid_data {
            debug!("{kind} condition carries invalid data: {data}");
            return Err(SpendConditionError::InvalidSpendCondition);
        }
        let tags = Tags::from_raw(&raw_tags)?;
        Ok(Self { kind, nonce, data, tags, raw_tags })
    }

    /// Locks to `pubkey`, with a fresh random nonce.
    pub fn new_p2pk<R: CryptoRng + RngCore>(rng: &mut R, pubkey: &CurvePoint, tags: Tags) -> Self {
        Self::build(ConditionKind::P2pk, random_nonce(rng), pubkey.as_hex(), tags)
    }

    /// Locks to the preimage of `payment_hash`, with a fresh random nonce.
    pub fn new_htlc<R: CryptoRng + RngCore>(rng: &mut R, payment_hash: &[u8; 32], tags: Tags) -> Self {
        Self::build(ConditionKind::Htlc, random_nonce(rng), hex::encode(payment_hash), tags)
    }

    fn build(kind: ConditionKind, nonce: String, data: String, tags: Tags) -> Self {
        let raw_tags = tags.to_raw();
        Self { kind, nonce, data, tags, raw_tags }
    }

    /// The tags as they appeared in the secret.
    pub fn raw_tags(&self) -> &[Vec<String>] {
        &self.raw_tags
    }

    /// The wire form, with tags in canonical order.
    pub fn to_secret_string(&self) -> Result<String, SpendConditionError> {
        let body = ConditionBodyRef { nonce: &self.nonce, data: &self.data, tags: &self.raw_tags };
        serde_json::to_string(&(self.kind.as_str(), body)).map_err(|e| {
            warn!("Could not serialize spend condition: {e}");
            SpendConditionError::InvalidSpendCondition
        })
    }

    pub fn check_valid(&self) -> Result<(), SpendConditionError> {
        let count = self.tags.key_count();
        if count > MAX_CONDITION_KEYS {
            return Err(SpendConditionError::TooManyKeys(count));
        }
        Ok(())
    }

    /// The keys allowed to sign on the primary path, deduplicated by value.
    ///
    /// P2PK: `data` followed by the `pubkeys` tag. HTLC: only the `pubkeys` tag.
    pub fn primary_keys(&self) -> Result<Vec<CurvePoint>, SpendConditionError> {
        let mut keys = Vec::with_capacity(self.tags.pubkeys.len() + 1);
        if self.kind == ConditionKind::P2pk {
            let lock = CurvePoint::from_hex(&self.data).map_err(|_| SpendConditionError::InvalidSpendCondition)?;
            keys.push(lock);
        }
        for key in &self.tags.pubkeys {
            if !keys.contains(key) {
                keys.push(*key);
            }
        }
        Ok(keys)
    }

    pub fn refund_keys(&self) -> Vec<CurvePoint> {
        let mut keys: Vec<CurvePoint> = Vec::with_capacity(self.tags.refund.len());
        for key in &self.tags.refund {
            if !keys.contains(key) {
                keys.push(*key);
            }
        }
        keys
    }
}

fn random_nonce<R: CryptoRng + RngCore>(rng: &mut R) -> String {
    let mut nonce = [0u8; 32];
    rng.fill_bytes(&mut nonce);
    hex::encode(nonce)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::spend_condition::SigFlag;
    use rand::rng;

    const P2PK_SECRET: &str = r#"["P2PK",{"nonce":"859d4935c4907062a6297cf4e663e2835d90d97ecdd510745d32f6816323a41f","data":"0249098aa8b9d2fbec49ff8598feb17b592b986e62319a4fa488a3dc36387157a7","tags":[["sigflag","SIG_INPUTS"]]}]"#;
    const HTLC_SECRET: &str = r#"["HTLC",{"nonce":"da62796403af76c80cd6ce9153ed3746","data":"3192200a0cfd3867e48eb63b03ff599c7e46c8f4e41146b2d281173ca6c50c54","tags":[["pubkeys","02698c4e2b5f9534cd0687d87513c759790cf829aa5739184a3e3735471fbda904"],["locktime","1689418329"],["refund","033281c37677ea273eb7183b783067f5244933ef78d8c3f15b1a77cb246099c26e"]]}]"#;

    #[test]
    fn plain_secret_is_unlocked() {
        let secret = "407915bc212be61a77e3e6d2aeb4c727980bda51cd06a6afc29e2861768a7837";
        assert_eq!(Secret::parse(secret).unwrap(), Secret::Unlocked(secret.to_string()));
        // JSON that is not an array, and arrays of another kind, are also unlocked
        assert!(!Secret::parse(r#"{"a":1}"#).unwrap().is_conditioned());
        assert!(!Secret::parse(r#"["OTHER",{}]"#).unwrap().is_conditioned());
    }

    #[test]
    fn broken_arrays_are_rejected() {
        assert_eq!(Secret::parse(r#"["P2PK"]"#).unwrap_err(), SpendConditionError::InvalidSpendCondition);
        assert_eq!(Secret::parse(r#"[1,{}]"#).unwrap_err(), SpendConditionError::InvalidSpendCondition);
        assert_eq!(Secret::parse(r#"["P2PK",{"nonce":"00"}]"#).unwrap_err(), SpendConditionError::InvalidSpendCondition);
        assert_eq!(
            Secret::parse(r#"["P2PK",{"nonce":"00","data":"not-a-key"}]"#).unwrap_err(),
            SpendConditionError::InvalidSpendCondition
        );
    }

    #[test]
    fn parse_p2pk() {
        let secret = Secret::parse(P2PK_SECRET).unwrap();
        let condition = secret.condition().unwrap();
        assert_eq!(condition.kind, ConditionKind::P2pk);
        assert_eq!(condition.nonce, "859d4935c4907062a6297cf4e663e2835d90d97ecdd510745d32f6816323a41f");
        assert_eq!(condition.tags.sigflag, SigFlag::SigInputs);
        assert_eq!(condition.primary_keys().unwrap()[0].as_hex(), condition.data);
        assert_eq!(condition.raw_tags(), &[vec!["sigflag".to_string(), "SIG_INPUTS".to_string()]]);
    }

    #[test]
    fn parse_htlc() {
        let secret = Secret::parse(HTLC_SECRET).unwrap();
        let condition = secret.condition().unwrap();
        assert_eq!(condition.kind, ConditionKind::Htlc);
        assert_eq!(condition.tags.locktime, 1689418329);
        let primary = condition.primary_keys().unwrap();
        assert_eq!(primary.len(), 1);
        assert_eq!(primary[0].as_hex(), "02698c4e2b5f9534cd0687d87513c759790cf829aa5739184a3e3735471fbda904");
        assert_eq!(
            condition.refund_keys()[0].as_hex(),
            "033281c37677ea273eb7183b783067f5244933ef78d8c3f15b1a77cb246099c26e"
        );
        // a payment hash must be exactly 32 bytes of hex
        let short = HTLC_SECRET.replace("3192200a0cfd", "3192200a0c");
        assert_eq!(Secret::parse(&short).unwrap_err(), SpendConditionError::InvalidSpendCondition);
    }

    #[test]
    fn non_string_tag_values() {
        let secret = P2PK_SECRET.replace(r#"[["sigflag","SIG_INPUTS"]]"#, r#"[["n_sigs",2]]"#);
        assert!(matches!(Secret::parse(&secret).unwrap_err(), SpendConditionError::MalformedTag(_)));
    }

    #[test]
    fn wire_format_is_canonical() {
        let key = crate::crypto::MintSecret::random(&mut rng()).public_key();
        let refund = crate::crypto::MintSecret::random(&mut rng()).public_key();
        let tags = Tags {
            sigflag: SigFlag::SigAll,
            n_sigs: 1,
            locktime: 21,
            refund: vec![refund],
            ..Default::default()
        };
        let condition = SpendCondition::new_p2pk(&mut rng(), &key, tags);
        let wire = condition.to_secret_string().unwrap();
        let expected = format!(
            r#"["P2PK",{{"nonce":"{}","data":"{}","tags":[["sigflag","SIG_ALL"],["n_sigs","1"],["locktime","21"],["refund","{}"]]}}]"#,
            condition.nonce,
            key.as_hex(),
            refund.as_hex()
        );
        assert_eq!(wire, expected);
        let parsed = Secret::parse(&wire).unwrap();
        assert_eq!(parsed.condition(), Some(&condition));
    }

    #[test]
    fn empty_tags_are_omitted() {
        let condition = SpendCondition::new_htlc(&mut rng(), &[7u8; 32], Tags::default());
        let wire = condition.to_secret_string().unwrap();
        assert!(wire.starts_with(r#"["HTLC",{"nonce":""#));
        assert!(wire.ends_with(&format!(r#""data":"{}"}}]"#, hex::encode([7u8; 32]))));
    }

    #[test]
    fn too_many_keys() {
        let keys: Vec<CurvePoint> =
            (0..11).map(|_| crate::crypto::MintSecret::random(&mut rng()).public_key()).collect();
        let tags = Tags { pubkeys: keys, ..Default::default() };
        let lock = tags.pubkeys[0];
        let condition = SpendCondition::new_p2pk(&mut rng(), &lock, tags);
        assert_eq!(condition.check_valid().unwrap_err(), SpendConditionError::TooManyKeys(11));
    }
}
