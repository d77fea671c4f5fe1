use crate::crypto::keys::CurvePoint;
use crate::crypto::CryptoError;
use sha2::{Digest, Sha256};

const DOMAIN_SEPARATOR: &[u8] = b"Secp256k1_HashToCurve_Cashu_";
const MAX_ITERATIONS: u32 = 1 << 16;

/// Deterministically maps `message` onto secp256k1.
///
/// `msg_hash = sha256(DOMAIN_SEPARATOR || message)`, then for `counter = 0, 1, ..` the candidate
/// `0x02 || sha256(msg_hash || counter_le32)` is tried as a compressed point and the first valid one is returned.
pub fn hash_to_curve(message: &[u8]) -> Result<CurvePoint, CryptoError> {
    let msg_hash = Sha256::new().chain_update(DOMAIN_SEPARATOR).chain_update(message).finalize();
    let mut candidate = [0u8; 33];
    candidate[0] = 0x02;
    for counter in 0..MAX_ITERATIONS {
        let hash = Sha256::new().chain_update(msg_hash).chain_update(counter.to_le_bytes()).finalize();
        candidate[1..].copy_from_slice(&hash);
        if let Ok(point) = CurvePoint::from_bytes(&candidate) {
            return Ok(point);
        }
    }
    Err(CryptoError::HashToCurveExhausted)
}
