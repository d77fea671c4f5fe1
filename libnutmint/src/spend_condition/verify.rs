use crate::crypto::schnorr::{self, SchnorrSignature};
use crate::crypto::CurvePoint;
use crate::spend_condition::secret::{ConditionKind, Secret, SpendCondition};
use crate::spend_condition::witness::Witness;
use crate::spend_condition::{SpendConditionError, UNLOCKED_SECRET_LEN};
use log::*;
use sha2::{Digest, Sha256};

/// Checks a single proof: an unlocked secret must have the standard length; a conditioned secret must carry a
/// witness that satisfies [`verify_condition`] over the secret itself.
pub fn verify_proof_conditions(secret: &str, witness: Option<&str>) -> Result<(), SpendConditionError> {
    match Secret::parse(secret)? {
        Secret::Unlocked(s) if s.len() != UNLOCKED_SECRET_LEN => Err(SpendConditionError::CommonSecretNotCorrectSize),
        Secret::Unlocked(_) => Ok(()),
        Secret::Conditioned(condition) => {
            let witness = Witness::parse(witness.unwrap_or_default())?;
            verify_condition(&condition, secret.as_bytes(), &witness)
        }
    }
}

/// Runs the witness checks for `condition`, with every signature expected over `sha256(message)`.
///
/// Once the locktime has passed and refund keys exist, only the refund keys can spend, and an HTLC no longer
/// needs its preimage. Otherwise an HTLC must reveal its preimage and the primary keys must reach `n_sigs`.
/// An HTLC with no `pubkeys` is unlocked by the preimage alone.
pub fn verify_condition(
    condition: &SpendCondition,
    message: &[u8],
    witness: &Witness,
) -> Result<(), SpendConditionError> {
    condition.check_valid()?;
    let digest = schnorr::message_digest(message);
    let tags = &condition.tags;

    if tags.locktime_passed() && !tags.refund.is_empty() {
        debug!("Locktime {} has passed, checking refund keys", tags.locktime);
        if witness.signatures.is_empty() {
            return Err(SpendConditionError::LocktimePassed);
        }
        return check_threshold(&condition.refund_keys(), tags.refund_threshold(), &digest, &witness.signatures);
    }

    if condition.kind == ConditionKind::Htlc {
        verify_preimage(condition, witness)?;
    }
    let keys = condition.primary_keys()?;
    if keys.is_empty() {
        trace!("HTLC without pubkeys, preimage suffices");
        return Ok(());
    }
    check_threshold(&keys, tags.threshold(), &digest, &witness.signatures)
}

fn verify_preimage(condition: &SpendCondition, witness: &Witness) -> Result<(), SpendConditionError> {
    let preimage = witness.preimage.as_deref().ok_or(SpendConditionError::InvalidPreimage)?;
    let bytes = hex::decode(preimage).map_err(|_| SpendConditionError::InvalidHexPreimage)?;
    let hash = hex::encode(Sha256::digest(bytes));
    if !hash.eq_ignore_ascii_case(&condition.data) {
        debug!("Preimage hash {hash} does not match {}", condition.data);
        return Err(SpendConditionError::InvalidPreimage);
    }
    Ok(())
}

/// Counts signatures made by distinct keys of `keys`. Each key can be matched once.
pub fn count_valid_signatures(keys: &[CurvePoint], digest: &[u8; 32], signatures: &[SchnorrSignature]) -> usize {
    let mut remaining: Vec<&CurvePoint> = keys.iter().collect();
    let mut count = 0;
    for signature in signatures {
        if let Some(pos) = remaining.iter().position(|key| schnorr::verify(key, digest, signature)) {
            remaining.swap_remove(pos);
            count += 1;
        }
    }
    count
}

pub(crate) fn check_threshold(
    keys: &[CurvePoint],
    threshold: usize,
    digest: &[u8; 32],
    signatures: &[SchnorrSignature],
) -> Result<(), SpendConditionError> {
    let valid = count_valid_signatures(keys, digest, signatures);
    trace!("{valid} valid signatures of {threshold} required");
    match valid {
        0 => Err(SpendConditionError::NoValidSignatures),
        n if n < threshold => Err(SpendConditionError::NotEnoughSignatures),
        _ => Ok(()),
    }
}
