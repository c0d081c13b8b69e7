//! # Domain Scalars
//!
//! The identity, hash, and round arithmetic types every subsystem speaks.

/// Reporter identity: last 20 bytes of `keccak256(uncompressed pubkey)`.
pub type Address = [u8; 20];

/// The null identity. Recovery failures resolve to it; it never matches a
/// registered oracle.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Keccak-256 output. Config digests and report binding keys.
pub type Hash = [u8; 32];

/// Round identifier. Stored ids never exceed [`MAX_ROUND_ID`].
pub type RoundId = u64;

/// Largest round id the history store can represent.
pub const MAX_ROUND_ID: RoundId = u32::MAX as RoundId;

/// Configuration epoch counter, the high component of the freshness tag.
pub type Epoch = u32;

/// Round-within-epoch, the low component of the freshness tag.
pub type EpochRound = u8;

/// An observed or aggregated value.
pub type Answer = i128;

/// Fixed roster capacity. Bounds every roster scan and sizes the
/// duplicate-detection bitmaps used during verification.
pub const MAX_ORACLES: usize = 31;

/// Whether an identity is the null identity.
pub fn is_zero_address(address: &Address) -> bool {
    address == &ZERO_ADDRESS
}
