//! Blind Diffie-Hellman key exchange.
//!
//! | step    | who    | computes                 |
//! |---------|--------|--------------------------|
//! | blind   | wallet | `B' = Y + r·G`, `Y = hash_to_curve(secret)` |
//! | sign    | mint   | `C' = k·B'`              |
//! | unblind | wallet | `C = C' - r·K`           |
//! | verify  | mint   | `k·Y == C`               |

use crate::crypto::hash_to_curve::hash_to_curve;
use crate::crypto::keys::{CurvePoint, MintSecret};
use crate::crypto::CryptoError;
use k256::ProjectivePoint;

/// Blinds `secret` with the blinding factor `r`, returning `B'`.
pub fn blind_message(secret: &[u8], r: &MintSecret) -> Result<CurvePoint, CryptoError> {
    let y = hash_to_curve(secret)?;
    let blinded = y.as_point() + ProjectivePoint::GENERATOR * r.as_scalar();
    CurvePoint::from_point(blinded).map_err(|_| CryptoError::IdentityResult)
}

/// `C' = k·B'`
pub fn sign_blinded(blinded: &CurvePoint, k: &MintSecret) -> CurvePoint {
    // prime-order group: a non-zero multiple of a non-identity point is never the identity
    CurvePoint::from_nonidentity(blinded.as_point() * k.as_scalar())
}

/// `C = C' - r·K`
pub fn unblind(blind_sig: &CurvePoint, r: &MintSecret, mint_pubkey: &CurvePoint) -> Result<CurvePoint, CryptoError> {
    let c = blind_sig.as_point() - mint_pubkey.as_point() * r.as_scalar();
    CurvePoint::from_point(c).map_err(|_| CryptoError::IdentityResult)
}

/// Checks that `C` is the unblinded signature on `secret` under `k`.
pub fn verify(secret: &[u8], k: &MintSecret, c: &CurvePoint) -> bool {
    match hash_to_curve(secret) {
        Ok(y) => y.as_point() * k.as_scalar() == c.as_point(),
        Err(_) => false,
    }
}
