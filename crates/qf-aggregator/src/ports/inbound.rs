//! # Inbound Ports (Read Surface)
//!
//! The stable read API of a feed. The aggregator implements it; a successor
//! installed through the delegation facade is any other implementation of
//! the same trait, so forwarding is a plain decorator.

use crate::domain::{AggregatorResult, Round};
use shared_types::RoundId;

/// The read surface every aggregator variant exposes.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait FeedReader: Send + Sync {
    /// Fixed-point precision of reported answers.
    fn decimals(&self) -> u8;

    /// Human-readable feed description.
    fn description(&self) -> String;

    /// Interface version.
    fn version(&self) -> u64;

    /// One committed round, or `NoDataPresent`.
    fn get_round_data(&self, round_id: RoundId) -> AggregatorResult<Round>;

    /// The most recently committed round, or `NoDataPresent`.
    fn latest_round_data(&self) -> AggregatorResult<Round>;
}
