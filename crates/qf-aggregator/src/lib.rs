//! # qf-aggregator
//!
//! The aggregation core of Quorum-Feed: a signed-batch data-feed aggregator.
//!
//! An external caller submits a report of an off-chain-observed value. The
//! config epoch manager validates the report's digest and freshness tag, the
//! verification engine authenticates and counts signers against the oracle
//! roster, and on success the round store computes and persists the round
//! result. Reads serve from the round store or forward to a configured
//! successor.
//!
//! ## Architecture
//!
//! Hexagonal layout:
//! - **Domain** (`domain/`): roster, config epochs, report verification,
//!   round history. Pure logic, no I/O.
//! - **Ports** (`ports/`): the read surface trait and the outbound event
//!   sink.
//! - **Service** (`service.rs`): wires domain logic to ports and enforces
//!   the admin capability checks.
//!
//! ## Concurrency
//!
//! The host runtime serializes invocations: every public operation runs to
//! completion with no interleaving. The core therefore holds no locks, and
//! every operation validates completely before mutating anything.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::InMemoryEventSink;
pub use config::AggregatorConfig;
pub use domain::{
    AggregatorError, AggregatorResult, ConfigEpoch, EpochRoundTag, OracleRole, OracleStatus,
    QuorumSubmission, Report, Roster, Round, RoundStore,
};
pub use ports::{EventSink, FeedEvent, FeedReader};
pub use service::{AggregatorService, CallContext};
