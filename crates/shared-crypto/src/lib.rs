//! # Shared Crypto Crate
//!
//! Keccak-256 hashing and secp256k1 signature recovery.
//!
//! Report verification never learns public keys in advance: signers are
//! identified by recovering an address from each detached signature and
//! looking it up in the roster. This crate owns that recovery path.
//!
//! ## Security Notes
//!
//! - **Malleability**: signatures with S in the upper half of the curve
//!   order are rejected (low-S rule).
//! - **Recovery ids**: `v` is accepted as 0, 1, 27, or 28 and normalized;
//!   anything else fails recovery.
//! - **Constant time**: scalar range checks go through `subtle`.

pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exported so downstream test suites can name key types without a direct
// dependency on the curve crate.
pub use k256;

pub use ecdsa::{
    address_from_pubkey, recover_address, split_signature_blob, EcdsaSignature, RawSignature,
    SIGNATURE_LEN,
};
pub use errors::SignatureError;
pub use hashing::{keccak256, keccak256_many, KeccakHasher};

#[cfg(any(test, feature = "test-helpers"))]
pub use ecdsa::test_helpers;
