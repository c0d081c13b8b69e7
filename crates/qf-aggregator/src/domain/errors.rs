//! Error types for the aggregation core.
//!
//! Every variant is a local, synchronous, non-retryable rejection of the
//! current invocation. No failure leaves partial state behind: validation
//! always completes before any roster or round mutation.

use shared_crypto::SignatureError;
use shared_types::{Address, Epoch, EpochRound, RoundId};

/// Aggregator error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregatorError {
    #[error("caller not authorized: {0:?}")]
    Unauthorized(Address),

    #[error("oracle already registered: {0:?}")]
    AlreadyRegistered(Address),

    #[error("oracle not registered: {0:?}")]
    NotRegistered(Address),

    #[error("roster capacity exceeded: {requested} slots requested, capacity {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },

    #[error("duplicate roster entry: {0:?}")]
    DuplicateRosterEntry(Address),

    #[error("fault threshold too high: {signers} signers cannot tolerate {threshold} faults")]
    FaultThresholdTooHigh { signers: usize, threshold: u8 },

    #[error("config digest mismatch")]
    ConfigDigestMismatch,

    #[error("stale report: ({epoch}, {round}) does not advance past ({latest_epoch}, {latest_round})")]
    StaleReport {
        epoch: Epoch,
        round: EpochRound,
        latest_epoch: Epoch,
        latest_round: EpochRound,
    },

    #[error("invalid round id: expected {expected}, got {actual}")]
    InvalidRoundId { expected: RoundId, actual: RoundId },

    #[error("recovered signer is not an active signer: {0:?}")]
    NotAnActiveSigner(Address),

    #[error("duplicate signature from roster slot {0}")]
    DuplicateSignature(u8),

    #[error("duplicate signer: {0:?}")]
    DuplicateSigner(Address),

    #[error("duplicate observer index {0}")]
    DuplicateObserver(u8),

    #[error("observer index {0} outside roster capacity")]
    ObserverOutOfRange(u8),

    #[error("report carries {observers} observer indices for {observations} observations")]
    ObserverCountMismatch {
        observers: usize,
        observations: usize,
    },

    #[error("report carries no observations")]
    EmptyReport,

    #[error("observations not sorted ascending at position {0}")]
    UnsortedObservations(usize),

    #[error("quorum not met: {valid} valid signers, need {required}")]
    QuorumNotMet { valid: usize, required: usize },

    #[error("oracle not enabled: {0:?}")]
    OracleNotEnabled(Address),

    #[error("oracle not yet enabled for round {round}: {oracle:?}")]
    OracleNotYetEnabled { oracle: Address, round: RoundId },

    #[error("oracle no longer allowed for round {round}: {oracle:?}")]
    OracleNoLongerAllowed { oracle: Address, round: RoundId },

    #[error("no data present for round {0}")]
    NoDataPresent(RoundId),

    #[error("invalid signature encoding: {0} bytes is not a positive multiple of 65")]
    InvalidSignatureEncoding(usize),

    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),
}

/// Result type for aggregator operations.
pub type AggregatorResult<T> = Result<T, AggregatorError>;
