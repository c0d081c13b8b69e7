//! # Round History
//!
//! The append-only store of committed rounds. Round ids increase strictly by
//! one per accepted report; a written round is never overwritten. Durable
//! persistence belongs to the host ledger, so the store is in-memory.

use super::errors::{AggregatorError, AggregatorResult};
use serde::{Deserialize, Serialize};
use shared_types::{Answer, RoundId, MAX_ROUND_ID};
use std::collections::BTreeMap;

/// One committed round. Doubles as the tuple the read surface returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub answer: Answer,
    pub started_at: u64,
    pub updated_at: u64,
    /// The round the answer was computed in; zero means "no data yet".
    pub answered_in_round: RoundId,
}

/// Append-only round history.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoundStore {
    rounds: BTreeMap<RoundId, Round>,
    latest: RoundId,
}

impl RoundStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The id of the most recently committed round; zero before the first.
    pub fn latest_round_id(&self) -> RoundId {
        self.latest
    }

    /// Append a round. The sole writer; invoked only after verification.
    ///
    /// Ids must advance by exactly one and stay representable.
    pub fn commit(&mut self, round: Round) -> AggregatorResult<()> {
        let expected = self.latest + 1;
        if round.id != expected || round.id > MAX_ROUND_ID {
            return Err(AggregatorError::InvalidRoundId {
                expected,
                actual: round.id,
            });
        }

        self.rounds.insert(round.id, round);
        self.latest = round.id;
        Ok(())
    }

    /// Look up a committed round.
    pub fn get(&self, id: RoundId) -> AggregatorResult<Round> {
        if id > MAX_ROUND_ID {
            return Err(AggregatorError::NoDataPresent(id));
        }
        match self.rounds.get(&id) {
            Some(round) if round.answered_in_round != 0 => Ok(*round),
            _ => Err(AggregatorError::NoDataPresent(id)),
        }
    }

    /// The most recently committed round.
    pub fn latest_round(&self) -> AggregatorResult<Round> {
        self.get(self.latest)
    }
}
