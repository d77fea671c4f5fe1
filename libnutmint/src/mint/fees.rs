use crate::keyset::KeysetInfo;
use crate::mint::error::MintError;
use crate::mint::types::Proof;

/// Input fee for spending `proofs`: the keysets' per-input fees in parts per thousand, summed and rounded up.
pub fn input_fee(proofs: &[Proof], keysets: &[KeysetInfo]) -> Result<u64, MintError> {
    let mut total_ppk = 0u64;
    for proof in proofs {
        let keyset =
            keysets.iter().find(|k| k.id == proof.id).ok_or_else(|| MintError::KeysetUnknown(proof.id.clone()))?;
        total_ppk = total_ppk.saturating_add(keyset.input_fee_ppk);
    }
    Ok(total_ppk.div_ceil(1000))
}
