//! # Configuration Epochs
//!
//! Each rotation of the reporter roster produces a new configuration epoch
//! identified by a digest: a keccak fingerprint binding the aggregator's own
//! identity, the rotation counter, and the full membership and parameters.
//! A report embeds the digest it was built under; verification compares it
//! for equality only and never decodes it back.

use serde::{Deserialize, Serialize};
use shared_crypto::KeccakHasher;
use shared_types::{Address, Epoch, EpochRound, Hash};

/// Domain separator for the digest encoding.
const CONFIG_DIGEST_TAG: &[u8] = b"QF_CONFIG_V1";

/// One configuration epoch: the membership and parameters a digest commits
/// to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEpoch {
    /// How many rotations have happened, including this one.
    pub count: Epoch,
    /// Fingerprint of this configuration. Zero until the first rotation.
    pub digest: Hash,
    pub signer_list: Vec<Address>,
    pub transmitter_list: Vec<Address>,
    /// Maximum number of faulty oracles the configuration tolerates.
    pub fault_threshold: u8,
    /// Version of the opaque payload's encoding.
    pub encoding_version: u64,
    /// Off-chain configuration blob; opaque to the core.
    pub opaque_payload: Vec<u8>,
}

impl ConfigEpoch {
    /// The pre-rotation state: no membership, zero digest.
    pub fn genesis() -> Self {
        Self {
            count: 0,
            digest: [0u8; 32],
            signer_list: Vec::new(),
            transmitter_list: Vec::new(),
            fault_threshold: 0,
            encoding_version: 0,
            opaque_payload: Vec::new(),
        }
    }
}

/// Monotonic `(epoch, round)` freshness tag.
///
/// Ordering is lexicographic: epoch first, then round. A report is fresh
/// only if its tag is strictly greater than the last accepted one.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EpochRoundTag {
    pub epoch: Epoch,
    pub round: EpochRound,
}

impl EpochRoundTag {
    pub fn new(epoch: Epoch, round: EpochRound) -> Self {
        Self { epoch, round }
    }
}

/// Compute the digest of a configuration.
///
/// The encoding is length-prefixed and domain-tagged so that no two distinct
/// configurations can collide on a byte boundary, and it starts with the
/// aggregator's own identity so that a report can never replay across
/// instances.
pub fn config_digest(
    self_identity: &Address,
    count: Epoch,
    signers: &[Address],
    transmitters: &[Address],
    fault_threshold: u8,
    encoding_version: u64,
    payload: &[u8],
) -> Hash {
    let mut hasher = KeccakHasher::new();
    hasher.update(CONFIG_DIGEST_TAG);
    hasher.update(self_identity);
    hasher.update(&count.to_be_bytes());

    hasher.update(&(signers.len() as u32).to_be_bytes());
    for signer in signers {
        hasher.update(signer);
    }
    hasher.update(&(transmitters.len() as u32).to_be_bytes());
    for transmitter in transmitters {
        hasher.update(transmitter);
    }

    hasher.update(&[fault_threshold]);
    hasher.update(&encoding_version.to_be_bytes());
    hasher.update(&(payload.len() as u64).to_be_bytes());
    hasher.update(payload);
    hasher.finalize()
}
