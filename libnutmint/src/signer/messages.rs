use crate::crypto::CurvePoint;
use crate::keyset::{KeysetId, KeysetInfo, KeysetKeys};
use crate::mint::types::{BlindSignature, BlindedMessage, Proof, RecoverSig};
use crate::signer::error::{SignerError, SignerErrorKind};
use crate::signer::traits::{RotateArgs, SpendContext};
use serde::{Deserialize, Serialize};

/// One call to a remote signer. Points, scalars and ids use the same encodings as the mint's wire types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum SignerRequest {
    GetActiveKeys,
    GetKeysById { id: KeysetId },
    GetKeysets,
    RotateKeyset(RotateArgs),
    SignBlindMessages { messages: Vec<BlindedMessage> },
    VerifyProofs { proofs: Vec<Proof>, outputs: Vec<BlindedMessage>, context: SpendContext },
    GetSignerPubkey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "data", rename_all = "snake_case")]
pub enum SignerResponse {
    ActiveKeys(Vec<KeysetKeys>),
    Keys(KeysetKeys),
    Keysets(Vec<KeysetInfo>),
    Rotated(KeysetInfo),
    Signatures { signatures: Vec<BlindSignature>, recovery: Vec<RecoverSig> },
    Verified,
    Pubkey(CurvePoint),
    Error(RemoteError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    pub kind: SignerErrorKind,
    pub message: String,
}

impl From<&SignerError> for RemoteError {
    fn from(e: &SignerError) -> Self {
        Self { kind: e.kind(), message: e.to_string() }
    }
}

impl From<RemoteError> for SignerError {
    fn from(e: RemoteError) -> Self {
        SignerError::Remote { kind: e.kind, message: e.message }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn request_wire_format() {
        let req = SignerRequest::GetKeysById { id: KeysetId::from("009a1f293253e41e") };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"method":"get_keys_by_id","params":{"id":"009a1f293253e41e"}}"#);
        assert_eq!(serde_json::from_str::<SignerRequest>(&json).unwrap(), req);
        assert_eq!(serde_json::to_string(&SignerRequest::GetKeysets).unwrap(), r#"{"method":"get_keysets"}"#);
        let req = SignerRequest::VerifyProofs {
            proofs: vec![],
            outputs: vec![],
            context: SpendContext::Melt { quote: "q1".into() },
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(
            json,
            r#"{"method":"verify_proofs","params":{"proofs":[],"outputs":[],"context":{"request":"melt","quote":"q1"}}}"#
        );
        assert_eq!(serde_json::from_str::<SignerRequest>(&json).unwrap(), req);
    }

    #[test]
    fn errors_keep_their_kind() {
        let err = SignerError::UsingInactiveKeyset(KeysetId::from("00aa"));
        let remote = RemoteError::from(&err);
        let json = serde_json::to_string(&SignerResponse::Error(remote.clone())).unwrap();
        let SignerResponse::Error(back) = serde_json::from_str(&json).unwrap() else { panic!("expected an error") };
        assert_eq!(back, remote);
        assert_eq!(SignerError::from(back).kind(), SignerErrorKind::InactiveKeyset);
    }
}
