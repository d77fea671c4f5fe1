//! Request-wide signatures.
//!
//! When any input declares `SIG_ALL`, every input must carry the same condition and the first input's witness
//! signs one message built from the whole request:
//!
//! | request | message |
//! |---|---|
//! | swap | `secret_0 ‖ C_0 ‖ … ‖ secret_n ‖ C_n ‖ amount_0 ‖ B'_0 ‖ … ‖ amount_m ‖ B'_m` |
//! | melt | `secret_0 ‖ … ‖ secret_n ‖ B'_0 ‖ … ‖ B'_m ‖ quote_id` |
//!
//! Points are compressed hex and amounts decimal.

use crate::crypto::schnorr;
use crate::crypto::CurvePoint;
use crate::mint::types::{BlindedMessage, Proof};
use crate::spend_condition::secret::{Secret, SpendCondition};
use crate::spend_condition::tags::SigFlag;
use crate::spend_condition::verify::{count_valid_signatures, verify_condition};
use crate::spend_condition::witness::Witness;
use crate::spend_condition::SpendConditionError;
use log::*;

/// True when any input's condition declares `SIG_ALL`.
pub fn requires_sig_all(inputs: &[Proof]) -> Result<bool, SpendConditionError> {
    for proof in inputs {
        if let Secret::Conditioned(condition) = Secret::parse(&proof.secret)? {
            if condition.tags.sigflag == SigFlag::SigAll {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

pub fn swap_message(inputs: &[Proof], outputs: &[BlindedMessage]) -> String {
    let mut message = String::new();
    for proof in inputs {
        message.push_str(&proof.secret);
        message.push_str(&proof.c.as_hex());
    }
    for output in outputs {
        message.push_str(&output.amount.to_string());
        message.push_str(&output.blinded.as_hex());
    }
    message
}

pub fn melt_message(inputs: &[Proof], outputs: &[BlindedMessage], quote_id: &str) -> String {
    let mut message = String::new();
    for proof in inputs {
        message.push_str(&proof.secret);
    }
    for output in outputs {
        message.push_str(&output.blinded.as_hex());
    }
    message.push_str(quote_id);
    message
}

/// The condition every input shares. Inputs must agree on kind, `data` and the tags as received.
pub fn shared_condition(inputs: &[Proof]) -> Result<SpendCondition, SpendConditionError> {
    let (first, rest) = inputs.split_first().ok_or(SpendConditionError::InvalidSpendCondition)?;
    let Secret::Conditioned(condition) = Secret::parse(&first.secret)? else {
        return Err(SpendConditionError::InvalidSpendCondition);
    };
    for proof in rest {
        match Secret::parse(&proof.secret)? {
            Secret::Conditioned(other)
                if other.kind == condition.kind
                    && other.data == condition.data
                    && other.raw_tags() == condition.raw_tags() => {}
            _ => {
                debug!("SIG_ALL input {} does not share the first input's condition", proof.secret);
                return Err(SpendConditionError::InvalidSpendCondition);
            }
        }
    }
    Ok(condition)
}

/// Checks the first input's witness against `message` using the shared condition's keys and thresholds.
pub fn verify_sig_all(inputs: &[Proof], message: &str) -> Result<SpendCondition, SpendConditionError> {
    let condition = shared_condition(inputs)?;
    let witness = inputs.first().and_then(|p| p.witness.as_deref()).unwrap_or_default();
    let witness = Witness::parse(witness)?;
    verify_condition(&condition, message.as_bytes(), &witness)?;
    Ok(condition)
}

/// Every output that carries a witness must hold at least one signature over `sha256(B')` from `keys`.
pub fn verify_output_witnesses(outputs: &[BlindedMessage], keys: &[CurvePoint]) -> Result<(), SpendConditionError> {
    for output in outputs {
        let Some(witness) = output.witness.as_deref() else {
            continue;
        };
        let witness = Witness::parse(witness)?;
        let digest = schnorr::message_digest(output.blinded.as_bytes());
        if count_valid_signatures(keys, &digest, &witness.signatures) == 0 {
            debug!("Output {} is not signed by the input keys", output.blinded);
            return Err(SpendConditionError::NoValidSignatures);
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::MintSecret;
    use crate::keyset::KeysetId;
    use crate::spend_condition::Tags;
    use rand::rng;

    fn point() -> CurvePoint {
        MintSecret::random(&mut rng()).public_key()
    }

    fn proof(condition: &SpendCondition, amount: u64) -> Proof {
        let mut condition = condition.clone();
        // each proof gets its own nonce but keeps the shared data and tags
        condition.nonce = hex::encode(rand::random::<[u8; 32]>());
        Proof {
            amount,
            id: KeysetId::from("009a1f293253e41e"),
            secret: condition.to_secret_string().unwrap(),
            c: point(),
            witness: None,
        }
    }

    fn output(amount: u64) -> BlindedMessage {
        BlindedMessage { amount, id: KeysetId::from("009a1f293253e41e"), blinded: point(), witness: None }
    }

    fn sig_all_condition(owner: &MintSecret, tags: Tags) -> SpendCondition {
        let tags = Tags { sigflag: SigFlag::SigAll, ..tags };
        SpendCondition::new_p2pk(&mut rng(), &owner.public_key(), tags)
    }

    fn sign_first(inputs: &mut [Proof], keys: &[&MintSecret], message: &str) {
        let mut witness = Witness::default();
        for key in keys {
            witness.sign(&mut rng(), key, message.as_bytes()).unwrap();
        }
        inputs[0].witness = Some(witness.to_json().unwrap());
    }

    #[test]
    fn message_layouts() {
        let owner = MintSecret::random(&mut rng());
        let condition = sig_all_condition(&owner, Tags::default());
        let inputs = vec![proof(&condition, 1), proof(&condition, 2)];
        let outputs = vec![output(2), output(1)];
        let expected = format!(
            "{}{}{}{}2{}1{}",
            inputs[0].secret,
            inputs[0].c.as_hex(),
            inputs[1].secret,
            inputs[1].c.as_hex(),
            outputs[0].blinded.as_hex(),
            outputs[1].blinded.as_hex()
        );
        assert_eq!(swap_message(&inputs, &outputs), expected);
        let expected = format!(
            "{}{}{}{}quote-1",
            inputs[0].secret,
            inputs[1].secret,
            outputs[0].blinded.as_hex(),
            outputs[1].blinded.as_hex()
        );
        assert_eq!(melt_message(&inputs, &outputs, "quote-1"), expected);
    }

    #[test]
    fn detects_sig_all() {
        let owner = MintSecret::random(&mut rng());
        let plain = SpendCondition::new_p2pk(&mut rng(), &owner.public_key(), Tags::default());
        let all = sig_all_condition(&owner, Tags::default());
        assert!(!requires_sig_all(&[proof(&plain, 1)]).unwrap());
        assert!(requires_sig_all(&[proof(&plain, 1), proof(&all, 1)]).unwrap());
    }

    #[test]
    fn valid_swap_signature() {
        let owner = MintSecret::random(&mut rng());
        let condition = sig_all_condition(&owner, Tags::default());
        let mut inputs = vec![proof(&condition, 1), proof(&condition, 4)];
        let outputs = vec![output(4), output(1)];
        let message = swap_message(&inputs, &outputs);
        sign_first(&mut inputs, &[&owner], &message);
        let shared = verify_sig_all(&inputs, &message).unwrap();
        assert_eq!(shared.data, owner.public_key().as_hex());

        // a signature over the inputs alone does not cover changed outputs
        let other_outputs = vec![output(5)];
        let err = verify_sig_all(&inputs, &swap_message(&inputs, &other_outputs)).unwrap_err();
        assert_eq!(err, SpendConditionError::NoValidSignatures);
    }

    #[test]
    fn multisig_threshold_comes_from_first_input() {
        let (alice, bob) = (MintSecret::random(&mut rng()), MintSecret::random(&mut rng()));
        let tags = Tags { pubkeys: vec![bob.public_key()], n_sigs: 2, ..Default::default() };
        let condition = sig_all_condition(&alice, tags);
        let mut inputs = vec![proof(&condition, 8), proof(&condition, 8)];
        let outputs = vec![output(16)];
        let message = melt_message(&inputs, &outputs, "q");
        sign_first(&mut inputs, &[&alice], &message);
        assert_eq!(verify_sig_all(&inputs, &message).unwrap_err(), SpendConditionError::NotEnoughSignatures);
        sign_first(&mut inputs, &[&alice, &bob], &message);
        verify_sig_all(&inputs, &message).unwrap();
    }

    #[test]
    fn mixed_conditions_are_rejected() {
        let (alice, bob) = (MintSecret::random(&mut rng()), MintSecret::random(&mut rng()));
        let first = sig_all_condition(&alice, Tags::default());
        let different_data = sig_all_condition(&bob, Tags::default());
        let different_tags = sig_all_condition(&alice, Tags { n_sigs: 1, ..Default::default() });
        for second in [different_data, different_tags] {
            let inputs = vec![proof(&first, 1), proof(&second, 1)];
            assert_eq!(shared_condition(&inputs).unwrap_err(), SpendConditionError::InvalidSpendCondition);
        }
        let unlocked = Proof { secret: "ab".repeat(32), ..proof(&first, 1) };
        assert_eq!(
            shared_condition(&[unlocked.clone(), proof(&first, 1)]).unwrap_err(),
            SpendConditionError::InvalidSpendCondition
        );
        assert_eq!(
            shared_condition(&[proof(&first, 1), unlocked]).unwrap_err(),
            SpendConditionError::InvalidSpendCondition
        );
        assert_eq!(shared_condition(&[]).unwrap_err(), SpendConditionError::InvalidSpendCondition);
    }

    #[test]
    fn output_witnesses() {
        let owner = MintSecret::random(&mut rng());
        let mut signed = output(1);
        let mut witness = Witness::default();
        witness.sign(&mut rng(), &owner, signed.blinded.as_bytes()).unwrap();
        signed.witness = Some(witness.to_json().unwrap());
        let keys = [owner.public_key()];
        verify_output_witnesses(&[signed.clone(), output(2)], &keys).unwrap();
        let stranger = [point()];
        assert_eq!(
            verify_output_witnesses(&[signed], &stranger).unwrap_err(),
            SpendConditionError::NoValidSignatures
        );
    }
}
