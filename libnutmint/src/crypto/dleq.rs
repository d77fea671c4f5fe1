//! Discrete-log equality proofs showing that `A = a·G` and `C' = a·B'` share the same `a`.

use crate::crypto::hash_to_curve::hash_to_curve;
use crate::crypto::keys::{CurvePoint, MintSecret};
use crate::crypto::CryptoError;
use crate::helpers::{array_from_hex, to_hex};
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::ff::PrimeField;
use k256::{FieldBytes, ProjectivePoint, Scalar, U256};
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The `(e, s)` pair attached to a blind signature. Both are 32-byte big-endian scalars, hex on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DleqProof {
    #[serde(serialize_with = "to_hex", deserialize_with = "array_from_hex")]
    pub e: [u8; 32],
    #[serde(serialize_with = "to_hex", deserialize_with = "array_from_hex")]
    pub s: [u8; 32],
}

/// `sha256` over the concatenated hex of the uncompressed encodings of `points`.
pub fn hash_e(points: &[&CurvePoint]) -> [u8; 32] {
    let joined: String = points.iter().map(|p| p.uncompressed_hex()).collect();
    Sha256::digest(joined.as_bytes()).into()
}

fn reduce(bytes: &[u8; 32]) -> Scalar {
    <Scalar as Reduce<U256>>::reduce_bytes(FieldBytes::from_slice(bytes))
}

fn scalar_bytes(s: &Scalar) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&s.to_bytes());
    out
}

fn to_point(p: ProjectivePoint) -> Option<CurvePoint> {
    CurvePoint::from_point(p).ok()
}

/// Proves that the blind signature `C' = a·B'` was made with the private key behind `A = a·G`.
pub fn generate_dleq<R: CryptoRng + RngCore>(
    rng: &mut R,
    blinded: &CurvePoint,
    blind_sig: &CurvePoint,
    a: &MintSecret,
) -> DleqProof {
    loop {
        let r = MintSecret::random(rng);
        let r1 = r.public_key();
        let Some(r2) = to_point(blinded.as_point() * r.as_scalar()) else { continue };
        let pubkey = a.public_key();
        let e_bytes = hash_e(&[&r1, &r2, &pubkey, blind_sig]);
        let e = reduce(&e_bytes);
        let s = *r.as_scalar() + e * a.as_scalar();
        return DleqProof { e: scalar_bytes(&e), s: scalar_bytes(&s) };
    }
}

/// Recomputes `R1 = s·G - e·A`, `R2 = s·B' - e·C'` and accepts when `hash(R1, R2, A, C')` reduces to `e`.
pub fn verify_dleq(blinded: &CurvePoint, blind_sig: &CurvePoint, pubkey: &CurvePoint, proof: &DleqProof) -> bool {
    let e = reduce(&proof.e);
    let Some(s) = Option::<Scalar>::from(Scalar::from_repr(*FieldBytes::from_slice(&proof.s))) else {
        return false;
    };
    let r1 = ProjectivePoint::GENERATOR * s - pubkey.as_point() * e;
    let r2 = blinded.as_point() * s - blind_sig.as_point() * e;
    let (Some(r1), Some(r2)) = (to_point(r1), to_point(r2)) else {
        return false;
    };
    reduce(&hash_e(&[&r1, &r2, pubkey, blind_sig])) == e
}

/// Wallet-side check on an unblinded proof carrying its blinding factor `r`.
///
/// Re-blinds `B' = Y + r·G` and `C' = C + r·A`, then runs [`verify_dleq`].
pub fn verify_proof_dleq(
    secret: &[u8],
    c: &CurvePoint,
    r: &MintSecret,
    pubkey: &CurvePoint,
    proof: &DleqProof,
) -> Result<bool, CryptoError> {
    let y = hash_to_curve(secret)?;
    let blinded = CurvePoint::from_point(y.as_point() + ProjectivePoint::GENERATOR * r.as_scalar())
        .map_err(|_| CryptoError::IdentityResult)?;
    let blind_sig = CurvePoint::from_point(c.as_point() + pubkey.as_point() * r.as_scalar())
        .map_err(|_| CryptoError::IdentityResult)?;
    Ok(verify_dleq(&blinded, &blind_sig, pubkey, proof))
}
