//! # Oracle Roster
//!
//! The capacity-bounded set of reporter identities authorized to sign or
//! transmit reports.
//!
//! The roster is an arena with indices: two dense collections (signers,
//! transmitters) plus an identity-to-status map. Indices are unique within a
//! collection and dense in `[0, count)`; removal swap-deletes, moving the
//! last element into the freed slot. Removal never erases a record: the
//! oracle's validity window is closed instead, so past submissions stay
//! verifiable against the window they were valid in.

use super::errors::{AggregatorError, AggregatorResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, RoundId, MAX_ORACLES};
use std::collections::HashMap;

/// Role held by a registered oracle.
///
/// `SignerAndTransmitter` can only be produced by a configuration rotation
/// that lists the same identity in both collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleRole {
    Unset,
    Signer,
    Transmitter,
    SignerAndTransmitter,
}

/// Per-identity roster record.
///
/// Indices are `None` once the oracle is removed; the validity window
/// `[starting_round, ending_round)` survives removal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleStatus {
    pub signer_index: Option<u8>,
    pub transmitter_index: Option<u8>,
    pub starting_round: RoundId,
    /// Exclusive upper bound; `RoundId::MAX` while the oracle is active.
    pub ending_round: RoundId,
}

impl OracleStatus {
    /// The role this record currently holds.
    pub fn role(&self) -> OracleRole {
        match (self.signer_index, self.transmitter_index) {
            (Some(_), Some(_)) => OracleRole::SignerAndTransmitter,
            (Some(_), None) => OracleRole::Signer,
            (None, Some(_)) => OracleRole::Transmitter,
            (None, None) => OracleRole::Unset,
        }
    }

    /// Whether the oracle currently occupies a roster slot.
    pub fn is_active(&self) -> bool {
        self.signer_index.is_some() || self.transmitter_index.is_some()
    }
}

/// The oracle roster.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Roster {
    signers: Vec<Address>,
    transmitters: Vec<Address>,
    statuses: HashMap<Address, OracleStatus>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an oracle under the given role.
    ///
    /// The validity window opens at `latest_round + 1`. A re-add in the same
    /// round the oracle was removed reopens its prior window instead of
    /// restarting it.
    pub fn admit(
        &mut self,
        identity: Address,
        role: OracleRole,
        latest_round: RoundId,
    ) -> AggregatorResult<()> {
        let slots_needed = match role {
            // Unset is not an admissible role.
            OracleRole::Unset => return Err(AggregatorError::NotRegistered(identity)),
            OracleRole::Signer | OracleRole::Transmitter => 1,
            OracleRole::SignerAndTransmitter => 2,
        };

        if let Some(status) = self.statuses.get(&identity) {
            if status.is_active() {
                return Err(AggregatorError::AlreadyRegistered(identity));
            }
        }

        let occupied = self.signers.len() + self.transmitters.len();
        if occupied + slots_needed > MAX_ORACLES {
            return Err(AggregatorError::CapacityExceeded {
                requested: occupied + slots_needed,
                capacity: MAX_ORACLES,
            });
        }

        let starting_round = match self.statuses.get(&identity) {
            // Removed and re-admitted before any new round: continuity.
            Some(prev) if prev.ending_round == latest_round + 1 => prev.starting_round,
            _ => latest_round + 1,
        };

        let signer_index = if matches!(role, OracleRole::Signer | OracleRole::SignerAndTransmitter)
        {
            self.signers.push(identity);
            Some((self.signers.len() - 1) as u8)
        } else {
            None
        };
        let transmitter_index = if matches!(
            role,
            OracleRole::Transmitter | OracleRole::SignerAndTransmitter
        ) {
            self.transmitters.push(identity);
            Some((self.transmitters.len() - 1) as u8)
        } else {
            None
        };

        self.statuses.insert(
            identity,
            OracleStatus {
                signer_index,
                transmitter_index,
                starting_round,
                ending_round: RoundId::MAX,
            },
        );

        Ok(())
    }

    /// Remove an oracle, compacting the freed slots and closing its
    /// validity window at `latest_round + 1`.
    pub fn retire(&mut self, identity: Address, latest_round: RoundId) -> AggregatorResult<()> {
        let status = match self.statuses.get(&identity) {
            Some(status) if status.is_active() => status.clone(),
            _ => return Err(AggregatorError::NotRegistered(identity)),
        };

        if let Some(slot) = status.signer_index {
            swap_remove_slot(&mut self.signers, &mut self.statuses, slot as usize, true);
        }
        if let Some(slot) = status.transmitter_index {
            swap_remove_slot(
                &mut self.transmitters,
                &mut self.statuses,
                slot as usize,
                false,
            );
        }

        if let Some(record) = self.statuses.get_mut(&identity) {
            record.signer_index = None;
            record.transmitter_index = None;
            record.ending_round = latest_round + 1;
        }

        Ok(())
    }

    /// Drop every record. Used only by configuration rotation, which
    /// replaces the membership wholesale.
    pub fn clear(&mut self) {
        self.signers.clear();
        self.transmitters.clear();
        self.statuses.clear();
    }

    /// Count of distinct active identities.
    pub fn oracle_count(&self) -> usize {
        self.statuses.values().filter(|s| s.is_active()).count()
    }

    /// Count of active signers.
    pub fn signer_count(&self) -> usize {
        self.signers.len()
    }

    /// Count of active transmitters.
    pub fn transmitter_count(&self) -> usize {
        self.transmitters.len()
    }

    /// The signer-collection slot of an identity, if it is an active signer.
    pub fn signer_slot(&self, identity: &Address) -> Option<u8> {
        self.statuses.get(identity).and_then(|s| s.signer_index)
    }

    /// Whether an identity is an active transmitter.
    pub fn is_transmitter(&self, identity: &Address) -> bool {
        self.statuses
            .get(identity)
            .map_or(false, |s| s.transmitter_index.is_some())
    }

    /// Full record for an identity, including removed oracles.
    pub fn status_of(&self, identity: &Address) -> Option<&OracleStatus> {
        self.statuses.get(identity)
    }

    /// Active identities, signers first.
    pub fn list_oracles(&self) -> Vec<Address> {
        let mut oracles = self.signers.clone();
        for transmitter in &self.transmitters {
            if !oracles.contains(transmitter) {
                oracles.push(*transmitter);
            }
        }
        oracles
    }

    /// Check an identity's eligibility to sign for `target_round` against
    /// its validity window.
    pub fn validate_eligibility(
        &self,
        identity: &Address,
        target_round: RoundId,
    ) -> AggregatorResult<&OracleStatus> {
        let status = self
            .statuses
            .get(identity)
            .ok_or(AggregatorError::OracleNotEnabled(*identity))?;

        if status.starting_round > target_round {
            return Err(AggregatorError::OracleNotYetEnabled {
                oracle: *identity,
                round: target_round,
            });
        }
        if status.ending_round <= target_round {
            return Err(AggregatorError::OracleNoLongerAllowed {
                oracle: *identity,
                round: target_round,
            });
        }

        Ok(status)
    }
}

/// Swap-delete one slot of a collection, rewiring the moved entry's index.
fn swap_remove_slot(
    collection: &mut Vec<Address>,
    statuses: &mut HashMap<Address, OracleStatus>,
    slot: usize,
    signer_collection: bool,
) {
    collection.swap_remove(slot);

    if slot < collection.len() {
        let moved = collection[slot];
        if let Some(status) = statuses.get_mut(&moved) {
            if signer_collection {
                status.signer_index = Some(slot as u8);
            } else {
                status.transmitter_index = Some(slot as u8);
            }
        }
    }
}
