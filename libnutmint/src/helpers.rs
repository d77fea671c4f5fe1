use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

pub fn to_hex<S, B>(bytes: B, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    B: AsRef<[u8]>,
{
    hex::encode(bytes).serialize(s)
}

pub fn from_hex<'de, D>(de: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let hex_str = String::deserialize(de)?;
    hex::decode(hex_str).map_err(|e| serde::de::Error::custom(format!("Invalid hex string: {e}")))
}

pub fn array_from_hex<'de, D, const N: usize>(de: D) -> Result<[u8; N], D::Error>
where
    D: Deserializer<'de>,
{
    let hex_str = String::deserialize(de)?;
    let mut result = [0u8; N];
    hex::decode_to_slice(hex_str, &mut result)
        .map_err(|e| serde::de::Error::custom(format!("Invalid hex string: {e}")))?;
    Ok(result)
}

/// Decodes a fixed-length hex string without going through serde.
pub fn decode_array<const N: usize>(hex_str: &str) -> Result<[u8; N], hex::FromHexError> {
    let mut result = [0u8; N];
    hex::decode_to_slice(hex_str, &mut result)?;
    Ok(result)
}

/// A UTC Unix timestamp representing seconds since January 1, 1970.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn new(seconds: u64) -> Self {
        Self(seconds)
    }

    /// Returns the current UTC time as a Timestamp.
    pub fn now() -> Self {
        Self(Utc::now().timestamp().max(0) as u64)
    }

    /// Creates a Timestamp that is `duration` time from now.
    pub fn from_now(duration: Duration) -> Self {
        Self(Self::now().0.saturating_add(duration.as_secs()))
    }

    pub fn hours_from_now(hours: u64) -> Self {
        Self::from_now(Duration::from_secs(hours.saturating_mul(3600)))
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// True once the wall clock has moved strictly beyond this timestamp.
    pub fn has_passed(&self) -> bool {
        Self::now().0 > self.0
    }

    /// Converts this Timestamp to a chrono DateTime<Utc>. Out-of-range values give None.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let t = i64::try_from(self.0).ok()?;
        Utc.timestamp_opt(t, 0).single()
    }
}

impl From<u64> for Timestamp {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}

impl From<Timestamp> for u64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Wrapped {
        #[serde(serialize_with = "to_hex", deserialize_with = "array_from_hex")]
        fixed: [u8; 4],
        #[serde(serialize_with = "to_hex", deserialize_with = "from_hex")]
        var: Vec<u8>,
    }

    #[test]
    fn hex_fields() {
        let w = Wrapped { fixed: [0xde, 0xad, 0xbe, 0xef], var: vec![1, 2] };
        let json = serde_json::to_string(&w).unwrap();
        assert_eq!(json, r#"{"fixed":"deadbeef","var":"0102"}"#);
        let back: Wrapped = serde_json::from_str(&json).unwrap();
        assert_eq!(back.fixed, w.fixed);
        assert_eq!(back.var, w.var);
        let short = serde_json::from_str::<Wrapped>(r#"{"fixed":"dead","var":""}"#);
        assert!(short.is_err());
    }

    #[test]
    fn decode_fixed_array() {
        assert_eq!(decode_array::<2>("0a0b").unwrap(), [10, 11]);
        assert!(decode_array::<2>("0a").is_err());
        assert!(decode_array::<2>("zz0b").is_err());
    }

    #[test]
    fn test_now_returns_current_time() {
        let before = Utc::now().timestamp() as u64;
        let ts = Timestamp::now();
        let after = Utc::now().timestamp() as u64;
        assert!(ts.0 >= before && ts.0 <= after);
    }

    #[test]
    fn test_hours_from_now() {
        let before = Utc::now().timestamp() as u64 + 7200;
        let ts = Timestamp::hours_from_now(2);
        let after = Utc::now().timestamp() as u64 + 7200;
        assert!(ts.0 >= before && ts.0 <= after);
        assert!(!ts.has_passed());
        assert!(Timestamp::new(21).has_passed());
    }

    #[test]
    fn test_to_datetime() {
        let ts = Timestamp::new(1234567890);
        let dt = ts.to_datetime().unwrap();
        assert_eq!(dt.timestamp(), 1234567890);
    }

    #[test]
    fn test_serde_roundtrip() {
        let ts = Timestamp::new(1234567890);
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "1234567890");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
