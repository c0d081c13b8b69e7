//! # ECDSA Recovery (secp256k1)
//!
//! Detached signatures carry `(r, s, v)`; verification recovers the signer's
//! address from the signature and a 32-byte prehash. No public keys are
//! stored anywhere in the system.
//!
//! ## Security Notes
//!
//! - **Scalar range**: R and S must be in `[1, n-1]`.
//! - **Low-S rule**: S must be strictly below `n/2`; the mirrored signature
//!   would otherwise authenticate the same message.
//! - **Recovery id**: `v` is accepted in the canonical 27/28 range or the
//!   raw 0/1 range and normalized; anything else fails.

use crate::errors::SignatureError;
use crate::hashing::keccak256;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_types::{Address, Hash};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// Length of one wire-encoded signature: `r (32) || s (32) || v (1)`.
pub const SIGNATURE_LEN: usize = 65;

/// secp256k1 curve order n.
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Half of the secp256k1 curve order (low-S boundary).
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// A decomposed ECDSA signature on the secp256k1 curve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcdsaSignature {
    /// R component (32 bytes)
    pub r: [u8; 32],
    /// S component (32 bytes)
    pub s: [u8; 32],
    /// Recovery id (0, 1, 27, or 28)
    pub v: u8,
}

/// Wire form of one signature: `r || s || v`, 65 bytes.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSignature {
    /// Concatenated signature bytes
    #[serde_as(as = "Bytes")]
    pub bytes: [u8; 65],
}

impl RawSignature {
    /// Decompose into `(r, s, v)` parts.
    pub fn to_parts(&self) -> EcdsaSignature {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&self.bytes[..32]);
        s.copy_from_slice(&self.bytes[32..64]);
        EcdsaSignature {
            r,
            s,
            v: self.bytes[64],
        }
    }

    /// Assemble the wire form from `(r, s, v)` parts.
    pub fn from_parts(signature: &EcdsaSignature) -> Self {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(&signature.r);
        bytes[32..64].copy_from_slice(&signature.s);
        bytes[64] = signature.v;
        Self { bytes }
    }
}

/// Split a concatenated signature blob into individual signatures.
///
/// The blob must be a positive multiple of [`SIGNATURE_LEN`] bytes.
pub fn split_signature_blob(blob: &[u8]) -> Result<Vec<RawSignature>, SignatureError> {
    if blob.is_empty() || blob.len() % SIGNATURE_LEN != 0 {
        return Err(SignatureError::InvalidBlobLength(blob.len()));
    }

    Ok(blob
        .chunks_exact(SIGNATURE_LEN)
        .map(|chunk| {
            let mut bytes = [0u8; 65];
            bytes.copy_from_slice(chunk);
            RawSignature { bytes }
        })
        .collect())
}

/// Recover the signer's address from a signature over a 32-byte prehash.
pub fn recover_address(
    message_hash: &Hash,
    signature: &EcdsaSignature,
) -> Result<Address, SignatureError> {
    if !is_valid_scalar(&signature.r) || !is_valid_scalar(&signature.s) {
        return Err(SignatureError::InvalidFormat);
    }

    if !is_low_s(&signature.s) {
        return Err(SignatureError::MalleableSignature);
    }

    let recovery_id = parse_recovery_id(signature.v)?;

    // The intermediate buffer is cleared once the parsed signature exists.
    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);

    let sig = match Signature::from_slice(&sig_bytes) {
        Ok(s) => {
            sig_bytes.zeroize();
            s
        }
        Err(_) => {
            sig_bytes.zeroize();
            return Err(SignatureError::InvalidFormat);
        }
    };

    let recovered_key = VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

/// Derive the address of a public key: last 20 bytes of
/// `keccak256(uncompressed pubkey without the 0x04 prefix)`.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Constant-time check that S is strictly below the half order.
fn is_low_s(s: &[u8; 32]) -> bool {
    ct_less_than(s, &SECP256K1_HALF_ORDER)
}

/// Constant-time check that a scalar is in `[1, n-1]`.
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for &byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }

    let below_order = ct_less_than(scalar, &SECP256K1_ORDER);
    bool::from(!is_zero) && below_order
}

/// Big-endian constant-time strict less-than over 32-byte values.
fn ct_less_than(lhs: &[u8; 32], rhs: &[u8; 32]) -> bool {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let not_decided = !(less | greater);
        let byte_less = Choice::from((lhs[i] < rhs[i]) as u8);
        let byte_greater = Choice::from((lhs[i] > rhs[i]) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    less.into()
}

/// Normalize a recovery id from `v`. Valid inputs: 0, 1, 27, 28.
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };

    RecoveryId::try_from(id).map_err(|_| SignatureError::InvalidRecoveryId(v))
}

/// Mirror an S value across the curve order: `s' = n - s`.
pub fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;

    for i in (0..32).rev() {
        let diff = (SECP256K1_ORDER[i] as i32) - (s[i] as i32) - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }

    result
}

// =============================================================================
// SIGNING HELPERS (test suites only)
// =============================================================================

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use super::*;
    use k256::ecdsa::SigningKey;

    /// Generate a fresh secp256k1 keypair.
    pub fn generate_keypair() -> (SigningKey, VerifyingKey) {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let verifying_key = *signing_key.verifying_key();
        (signing_key, verifying_key)
    }

    /// The address a key's signatures recover to.
    pub fn address_of(signing_key: &SigningKey) -> Address {
        address_from_pubkey(signing_key.verifying_key())
    }

    /// Sign a prehash, normalizing to low-S with v in the 27/28 range.
    pub fn sign(message_hash: &Hash, signing_key: &SigningKey) -> EcdsaSignature {
        let (sig, recid) = signing_key
            .sign_prehash_recoverable(message_hash)
            .expect("signing failed");

        let sig_bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&sig_bytes[..32]);
        s.copy_from_slice(&sig_bytes[32..]);

        // Mirroring S flips the recovery bit.
        let v = if is_low_s(&s) {
            recid.to_byte() + 27
        } else {
            s = invert_s(&s);
            if recid.to_byte() == 0 {
                28
            } else {
                27
            }
        };

        EcdsaSignature { r, s, v }
    }

    /// Sign a prehash and return the 65-byte wire form.
    pub fn sign_raw(message_hash: &Hash, signing_key: &SigningKey) -> RawSignature {
        RawSignature::from_parts(&sign(message_hash, signing_key))
    }
}
