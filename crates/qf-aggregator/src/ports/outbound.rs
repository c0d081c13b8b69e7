//! # Outbound Ports (Notifications)
//!
//! Membership, configuration, and round changes are published for external
//! observers through the event sink. Publication is fire-and-forget; the
//! core never reads events back.

use crate::domain::OracleRole;
use shared_types::{Address, Answer, Epoch, Hash, RoundId};

/// A state-change notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedEvent {
    OracleAdmitted {
        oracle: Address,
        role: OracleRole,
    },
    OracleRemoved {
        oracle: Address,
    },
    ConfigRotated {
        count: Epoch,
        digest: Hash,
    },
    RoundCommitted {
        round_id: RoundId,
        answer: Answer,
    },
    SuccessorSet {
        successor: Address,
    },
    OperatorPermitGranted {
        operator: Address,
        expires_at_height: u64,
    },
    OwnershipTransferred {
        previous: Address,
        new: Address,
    },
    WritesDisabled,
}

/// Sink for state-change notifications.
///
/// Implementations must be thread-safe (`Send + Sync`) and must not fail:
/// event delivery is observability, never control flow.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: FeedEvent);
}
