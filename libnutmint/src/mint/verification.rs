use crate::amount::Unit;
use crate::crypto::CurvePoint;
use crate::keyset::KeysetInfo;
use crate::lightning::LightningBackend;
use crate::mint::error::MintError;
use crate::mint::fees::input_fee;
use crate::mint::types::{BlindedMessage, Proof, ProofState};
use crate::mint::Mint;
use crate::signer::{Signer, SpendContext};
use crate::storage::{MintStore, StoreTransaction};
use log::*;
use std::collections::HashSet;

/// What a set of inputs is worth once it has passed the structural checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CheckedInputs {
    pub unit: Unit,
    pub ys: Vec<CurvePoint>,
    pub amount: u64,
    pub fee: u64,
}

/// Sums request amounts, rejecting sets whose total does not fit in a `u64`.
pub(crate) fn total(amounts: impl IntoIterator<Item = u64>) -> Result<u64, MintError> {
    amounts.into_iter().try_fold(0u64, |acc, a| acc.checked_add(a).ok_or(MintError::AmountOverflow))
}

impl<S: MintStore, G: Signer, L: LightningBackend> Mint<S, G, L> {
    /// Structural checks on inputs: count limits, no repeated `Y`, a single known unit that the mint supports.
    pub(crate) fn check_inputs(&self, inputs: &[Proof], keysets: &[KeysetInfo]) -> Result<CheckedInputs, MintError> {
        if inputs.is_empty() {
            return Err(MintError::EmptyRequest("inputs"));
        }
        if inputs.len() > self.settings.max_inputs {
            return Err(MintError::RequestTooLarge(self.settings.max_inputs, "inputs"));
        }
        let ys = inputs.iter().map(Proof::y).collect::<Result<Vec<_>, _>>()?;
        if ys.iter().collect::<HashSet<_>>().len() != ys.len() {
            return Err(MintError::DuplicateInputs);
        }
        let mut units = HashSet::new();
        for proof in inputs {
            let keyset =
                keysets.iter().find(|k| k.id == proof.id).ok_or_else(|| MintError::KeysetUnknown(proof.id.clone()))?;
            units.insert(keyset.unit);
        }
        let unit = single_unit(units)?;
        if !self.settings.supports(unit) {
            return Err(MintError::UnitNotSupported(unit));
        }
        let fee = input_fee(inputs, keysets)?;
        Ok(CheckedInputs { unit, ys, amount: total(inputs.iter().map(|p| p.amount))?, fee })
    }

    /// Structural checks on outputs: count limits, no repeated `B'`, active keysets of a single unit.
    pub(crate) fn check_outputs(&self, outputs: &[BlindedMessage], keysets: &[KeysetInfo]) -> Result<Unit, MintError> {
        if outputs.is_empty() {
            return Err(MintError::EmptyRequest("outputs"));
        }
        if outputs.len() > self.settings.max_outputs {
            return Err(MintError::RequestTooLarge(self.settings.max_outputs, "outputs"));
        }
        if outputs.iter().map(|o| &o.blinded).collect::<HashSet<_>>().len() != outputs.len() {
            return Err(MintError::DuplicateOutputs);
        }
        let mut units = HashSet::new();
        for output in outputs {
            let keyset =
                keysets.iter().find(|k| k.id == output.id).ok_or_else(|| MintError::KeysetUnknown(output.id.clone()))?;
            if !keyset.active {
                return Err(MintError::KeysetInactive(output.id.clone()));
            }
            units.insert(keyset.unit);
        }
        let unit = single_unit(units)?;
        if !self.settings.supports(unit) {
            return Err(MintError::UnitNotSupported(unit));
        }
        Ok(unit)
    }

    /// Runs the cryptographic checks on `inputs`, including any spend conditions they carry.
    pub(crate) fn verify_inputs(
        &self,
        inputs: &[Proof],
        outputs: &[BlindedMessage],
        context: &SpendContext,
    ) -> Result<(), MintError> {
        self.signer.verify_proofs(inputs, outputs, context)?;
        Ok(())
    }
}

fn single_unit(units: HashSet<Unit>) -> Result<Unit, MintError> {
    let mut units = units.into_iter();
    match (units.next(), units.next()) {
        (Some(unit), None) => Ok(unit),
        _ => Err(MintError::MultipleUnits),
    }
}

/// Rejects the request if the store already knows any of the inputs.
pub(crate) fn check_inputs_unknown(tx: &impl StoreTransaction, ys: &[CurvePoint]) -> Result<(), MintError> {
    let known = tx.get_proofs_by_y(ys)?;
    if known.iter().any(|p| p.state == ProofState::Pending) {
        warn!("Input proof is pending in another request");
        return Err(MintError::ProofPending);
    }
    if !known.is_empty() {
        warn!("{} input proofs already spent", known.len());
        return Err(MintError::ProofAlreadySpent);
    }
    Ok(())
}

/// Rejects the request if any output was signed before.
pub(crate) fn check_outputs_unsigned(tx: &impl StoreTransaction, outputs: &[BlindedMessage]) -> Result<(), MintError> {
    let blinded: Vec<CurvePoint> = outputs.iter().map(|o| o.blinded).collect();
    if !tx.get_recover_sigs(&blinded)?.is_empty() {
        return Err(MintError::BlindedMessageAlreadySigned);
    }
    Ok(())
}

/// `inputs >= outputs + fee`. Falling short of the fee alone is reported as an insufficient fee.
pub(crate) fn check_balance(inputs: u64, outputs: u64, fee: u64) -> Result<(), MintError> {
    if inputs < outputs {
        return Err(MintError::Unbalanced { inputs, outputs, fee });
    }
    if inputs < outputs.checked_add(fee).ok_or(MintError::AmountOverflow)? {
        return Err(MintError::InsufficientFee { inputs, outputs, fee });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn balance_rule() {
        check_balance(10, 10, 0).unwrap();
        check_balance(11, 10, 1).unwrap();
        check_balance(12, 10, 1).unwrap();
        assert!(matches!(check_balance(9, 10, 0), Err(MintError::Unbalanced { .. })));
        assert!(matches!(check_balance(10, 10, 1), Err(MintError::InsufficientFee { .. })));
        assert!(matches!(check_balance(u64::MAX, u64::MAX, 1), Err(MintError::AmountOverflow)));
    }

    #[test]
    fn totals_do_not_wrap_or_clamp() {
        assert_eq!(total([1, 2, 4]).unwrap(), 7);
        assert_eq!(total([u64::MAX]).unwrap(), u64::MAX);
        assert_eq!(total([1 << 63, (1 << 63) - 1]).unwrap(), u64::MAX);
        assert!(matches!(total([1 << 63, 1 << 63]), Err(MintError::AmountOverflow)));
        assert!(matches!(total([u64::MAX, 1]), Err(MintError::AmountOverflow)));
    }

    #[test]
    fn units_must_agree() {
        assert_eq!(single_unit(HashSet::from([Unit::Sat])).unwrap(), Unit::Sat);
        assert!(matches!(single_unit(HashSet::from([Unit::Sat, Unit::Msat])), Err(MintError::MultipleUnits)));
        assert!(matches!(single_unit(HashSet::new()), Err(MintError::MultipleUnits)));
    }
}
