//! Domain layer: pure aggregation logic, no I/O.

pub mod config_epoch;
pub mod errors;
pub mod report;
pub mod roster;
pub mod rounds;
pub mod verification;

pub use config_epoch::{ConfigEpoch, EpochRoundTag};
pub use errors::{AggregatorError, AggregatorResult};
pub use report::Report;
pub use roster::{OracleRole, OracleStatus, Roster};
pub use rounds::{Round, RoundStore};
pub use verification::{
    verify_cosigned_report, verify_quorum_submission, CosignedVerdict, QuorumSubmission,
};
