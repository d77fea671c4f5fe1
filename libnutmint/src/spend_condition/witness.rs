use crate::crypto::schnorr::{self, SchnorrSignature};
use crate::crypto::MintSecret;
use crate::spend_condition::SpendConditionError;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

/// `{"signatures": [...], "preimage": "..."}`, carried as a JSON string on proofs and blinded messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    #[serde(default)]
    pub signatures: Vec<SchnorrSignature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preimage: Option<String>,
}

impl Witness {
    pub fn parse(witness: &str) -> Result<Self, SpendConditionError> {
        if witness.trim().is_empty() {
            return Err(SpendConditionError::EmptyWitness);
        }
        let mut parsed: Witness =
            serde_json::from_str(witness).map_err(|_| SpendConditionError::CouldNotParseWitness)?;
        if parsed.preimage.as_deref() == Some("") {
            parsed.preimage = None;
        }
        Ok(parsed)
    }

    pub fn to_json(&self) -> Result<String, SpendConditionError> {
        serde_json::to_string(self).map_err(|_| SpendConditionError::CouldNotParseWitness)
    }

    /// Appends a signature over `sha256(message)`.
    pub fn sign<R: CryptoRng + RngCore>(
        &mut self,
        rng: &mut R,
        key: &MintSecret,
        message: &[u8],
    ) -> Result<(), SpendConditionError> {
        let digest = schnorr::message_digest(message);
        self.signatures.push(schnorr::sign(rng, key, &digest)?);
        Ok(())
    }

    pub fn with_preimage(mut self, preimage: impl Into<String>) -> Self {
        self.preimage = Some(preimage.into());
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SIG: &str = "60f3c9b766770b46caac1d27e1ae6b77c8866ebaeba0b9489fe6a15a837eaa6fcd6eaa825499c72ac342983983fd3ba3a8a41f56677cc99ffd73da68b59e1383";

    #[test]
    fn parse_signatures_only() {
        let witness = Witness::parse(&format!(r#"{{"signatures":["{SIG}"]}}"#)).unwrap();
        assert_eq!(witness.signatures.len(), 1);
        assert_eq!(witness.signatures[0].as_hex(), SIG);
        assert!(witness.preimage.is_none());
        assert_eq!(witness.to_json().unwrap(), format!(r#"{{"signatures":["{SIG}"]}}"#));
    }

    #[test]
    fn preimage_round_trip() {
        let witness = Witness::default().with_preimage("00ff");
        assert_eq!(witness.to_json().unwrap(), r#"{"signatures":[],"preimage":"00ff"}"#);
        let empty = Witness::parse(r#"{"signatures":[],"preimage":""}"#).unwrap();
        assert!(empty.preimage.is_none());
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Witness::parse("").unwrap_err(), SpendConditionError::EmptyWitness);
        assert_eq!(Witness::parse("not json").unwrap_err(), SpendConditionError::CouldNotParseWitness);
        assert_eq!(
            Witness::parse(r#"{"signatures":["abcd"]}"#).unwrap_err(),
            SpendConditionError::CouldNotParseWitness
        );
    }
}
