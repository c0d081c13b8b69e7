//! # Co-signed Reports
//!
//! A Mode A report: one batch of observations under a freshness tag, carried
//! by a transmitter and co-signed by a set of signers. Reports exist only at
//! verification time; only the derived round survives.

use super::config_epoch::EpochRoundTag;
use serde::{Deserialize, Serialize};
use shared_crypto::keccak256;
use shared_types::{Answer, Epoch, EpochRound, Hash};

/// Domain separator for the report encoding.
const REPORT_TAG: &[u8] = b"QF_REPORT_V1";

/// A co-signed batch report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Digest of the configuration this report was built under.
    pub config_digest: Hash,
    /// Freshness tag, high component.
    pub epoch: Epoch,
    /// Freshness tag, low component.
    pub round: EpochRound,
    /// Roster slot of the oracle behind each observation.
    pub observers: Vec<u8>,
    /// Observed values, sorted ascending by the transmitter.
    pub observations: Vec<Answer>,
}

impl Report {
    /// The report's freshness tag.
    pub fn tag(&self) -> EpochRoundTag {
        EpochRoundTag::new(self.epoch, self.round)
    }

    /// Canonical byte encoding. Signatures cover exactly these bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(
            REPORT_TAG.len() + 32 + 5 + 4 + self.observers.len() + 4 + self.observations.len() * 16,
        );
        bytes.extend_from_slice(REPORT_TAG);
        bytes.extend_from_slice(&self.config_digest);
        bytes.extend_from_slice(&self.epoch.to_be_bytes());
        bytes.push(self.round);

        bytes.extend_from_slice(&(self.observers.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.observers);

        bytes.extend_from_slice(&(self.observations.len() as u32).to_be_bytes());
        for observation in &self.observations {
            bytes.extend_from_slice(&observation.to_be_bytes());
        }
        bytes
    }

    /// The prehash signers co-sign.
    pub fn signing_hash(&self) -> Hash {
        keccak256(&self.encode())
    }

    /// The aggregate value: the element at `len / 2`.
    ///
    /// For even-length batches this is the upper-middle element, not an
    /// averaged median. Callers must have checked the report is non-empty.
    pub fn aggregate_answer(&self) -> Answer {
        self.observations[self.observations.len() / 2]
    }
}
