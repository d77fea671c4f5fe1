use crate::crypto::CurvePoint;
use crate::keyset::{KeysetId, KeysetInfo, KeysetKeys};
use crate::mint::types::{BlindSignature, BlindedMessage, Proof, RecoverSig};
use crate::signer::error::SignerError;
use crate::signer::messages::{RemoteError, SignerRequest, SignerResponse};
use crate::signer::traits::{RotateArgs, Signer, SpendContext};
use log::*;

/// Carries one request to a signer and brings back its response.
pub trait SignerTransport: Send + Sync {
    fn call(&self, request: SignerRequest) -> Result<SignerResponse, SignerError>;
}

/// The server side of a remote signer: dispatches requests onto a [`Signer`].
pub struct SignerService<G: Signer> {
    signer: G,
}

impl<G: Signer> SignerService<G> {
    pub fn new(signer: G) -> Self {
        Self { signer }
    }

    pub fn signer(&self) -> &G {
        &self.signer
    }

    pub fn handle(&self, request: SignerRequest) -> SignerResponse {
        let result = match request {
            SignerRequest::GetActiveKeys => self.signer.get_active_keys().map(SignerResponse::ActiveKeys),
            SignerRequest::GetKeysById { id } => self.signer.get_keys_by_id(&id).map(SignerResponse::Keys),
            SignerRequest::GetKeysets => self.signer.get_keysets().map(SignerResponse::Keysets),
            SignerRequest::RotateKeyset(args) => self.signer.rotate_keyset(args).map(SignerResponse::Rotated),
            SignerRequest::SignBlindMessages { messages } => self
                .signer
                .sign_blind_messages(&messages)
                .map(|(signatures, recovery)| SignerResponse::Signatures { signatures, recovery }),
            SignerRequest::VerifyProofs { proofs, outputs, context } => {
                self.signer.verify_proofs(&proofs, &outputs, &context).map(|_| SignerResponse::Verified)
            }
            SignerRequest::GetSignerPubkey => self.signer.get_signer_pubkey().map(SignerResponse::Pubkey),
        };
        result.unwrap_or_else(|e| {
            debug!("Signer request failed: {e}");
            SignerResponse::Error(RemoteError::from(&e))
        })
    }

    /// Handles a JSON-encoded request and returns the JSON-encoded response.
    pub fn handle_json(&self, request: &str) -> Result<String, SignerError> {
        let request: SignerRequest =
            serde_json::from_str(request).map_err(|e| SignerError::Transport(format!("Bad signer request: {e}")))?;
        serde_json::to_string(&self.handle(request)).map_err(|e| SignerError::Transport(e.to_string()))
    }
}

/// An in-process transport that still pushes every call through its JSON encoding.
impl<G: Signer> SignerTransport for SignerService<G> {
    fn call(&self, request: SignerRequest) -> Result<SignerResponse, SignerError> {
        let json = serde_json::to_string(&request).map_err(|e| SignerError::Transport(e.to_string()))?;
        let response = self.handle_json(&json)?;
        serde_json::from_str(&response).map_err(|e| SignerError::Transport(format!("Bad signer response: {e}")))
    }
}

/// A [`Signer`] whose keys live on the other side of a transport.
pub struct RemoteSigner<T: SignerTransport> {
    transport: T,
}

impl<T: SignerTransport> RemoteSigner<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    fn call(&self, request: SignerRequest) -> Result<SignerResponse, SignerError> {
        match self.transport.call(request)? {
            SignerResponse::Error(e) => Err(e.into()),
            response => Ok(response),
        }
    }
}

fn unexpected(response: SignerResponse) -> SignerError {
    SignerError::Transport(format!("Unexpected signer response: {response:?}"))
}

impl<T: SignerTransport> Signer for RemoteSigner<T> {
    fn get_active_keys(&self) -> Result<Vec<KeysetKeys>, SignerError> {
        match self.call(SignerRequest::GetActiveKeys)? {
            SignerResponse::ActiveKeys(keys) => Ok(keys),
            other => Err(unexpected(other)),
        }
    }

    fn get_keys_by_id(&self, id: &KeysetId) -> Result<KeysetKeys, SignerError> {
        match self.call(SignerRequest::GetKeysById { id: id.clone() })? {
            SignerResponse::Keys(keys) => Ok(keys),
            other => Err(unexpected(other)),
        }
    }

    fn get_keysets(&self) -> Result<Vec<KeysetInfo>, SignerError> {
        match self.call(SignerRequest::GetKeysets)? {
            SignerResponse::Keysets(keysets) => Ok(keysets),
            other => Err(unexpected(other)),
        }
    }

    fn rotate_keyset(&self, args: RotateArgs) -> Result<KeysetInfo, SignerError> {
        match self.call(SignerRequest::RotateKeyset(args))? {
            SignerResponse::Rotated(info) => Ok(info),
            other => Err(unexpected(other)),
        }
    }

    fn sign_blind_messages(
        &self,
        messages: &[BlindedMessage],
    ) -> Result<(Vec<BlindSignature>, Vec<RecoverSig>), SignerError> {
        match self.call(SignerRequest::SignBlindMessages { messages: messages.to_vec() })? {
            SignerResponse::Signatures { signatures, recovery } => Ok((signatures, recovery)),
            other => Err(unexpected(other)),
        }
    }

    fn verify_proofs(
        &self,
        proofs: &[Proof],
        outputs: &[BlindedMessage],
        context: &SpendContext,
    ) -> Result<(), SignerError> {
        let request =
            SignerRequest::VerifyProofs { proofs: proofs.to_vec(), outputs: outputs.to_vec(), context: context.clone() };
        match self.call(request)? {
            SignerResponse::Verified => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    fn get_signer_pubkey(&self) -> Result<CurvePoint, SignerError> {
        match self.call(SignerRequest::GetSignerPubkey)? {
            SignerResponse::Pubkey(key) => Ok(key),
            other => Err(unexpected(other)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::amount::Unit;
    use crate::signer::local::test::{issue, random_secret, signer};
    use crate::signer::SignerErrorKind;

    #[test]
    fn remote_signer_matches_local() {
        let remote = RemoteSigner::new(SignerService::new(signer()));
        let keys = remote.get_active_keys().unwrap();
        assert_eq!(keys.len(), 1);
        let id = keys[0].id.clone();
        assert_eq!(remote.get_keys_by_id(&id).unwrap(), keys[0]);

        // issue through the remote, verify through both
        let proof = issue(&remote, &id, 16, &random_secret());
        remote.verify_proofs(&[proof.clone()], &[], &SpendContext::Swap).unwrap();
        remote.transport.signer().verify_proofs(&[proof], &[], &SpendContext::Swap).unwrap();
        assert_eq!(remote.get_signer_pubkey().unwrap(), remote.transport.signer().get_signer_pubkey().unwrap());
    }

    #[test]
    fn remote_errors_keep_their_kind() {
        let remote = RemoteSigner::new(SignerService::new(signer()));
        let old = remote.get_active_keys().unwrap()[0].id.clone();
        let info = remote.rotate_keyset(RotateArgs { unit: Unit::Sat, input_fee_ppk: 0, expiry_limit_hours: 0 }).unwrap();
        assert_ne!(info.id, old);
        let blinded = crate::crypto::hash_to_curve::hash_to_curve(b"z").unwrap();
        let err = remote.sign_blind_messages(&[BlindedMessage { amount: 1, id: old, blinded, witness: None }]).unwrap_err();
        assert!(matches!(err, SignerError::Remote { .. }));
        assert_eq!(err.kind(), SignerErrorKind::InactiveKeyset);
        assert!(remote.transport.handle_json("not json").is_err());
    }

    #[test]
    fn remote_spend_condition_errors_match_local() {
        use crate::crypto::MintSecret;
        use crate::mint::error::MintError;
        use crate::spend_condition::{SpendCondition, Tags};

        let remote = RemoteSigner::new(SignerService::new(signer()));
        let id = remote.get_active_keys().unwrap()[0].id.clone();
        let owner = MintSecret::random(&mut rand::rng());
        let condition = SpendCondition::new_p2pk(&mut rand::rng(), &owner.public_key(), Tags::default());
        let proof = issue(&remote, &id, 2, &condition.to_secret_string().unwrap());

        let local_err = remote.transport.signer().verify_proofs(&[proof.clone()], &[], &SpendContext::Swap).unwrap_err();
        let remote_err = remote.verify_proofs(&[proof], &[], &SpendContext::Swap).unwrap_err();
        assert_eq!(remote_err.kind(), SignerErrorKind::ConditionNotMet);
        assert_eq!(remote_err.kind(), local_err.kind());
        assert_eq!(MintError::Signer(remote_err).code(), 99999);
        assert_eq!(MintError::Signer(local_err).code(), 99999);
    }
}
