//! # Report Verification Engine
//!
//! Two submission protocols share this module:
//!
//! - **Mode A**: one co-signed batch report under a freshness tag; the
//!   aggregate is the middle observation.
//! - **Mode B**: one candidate round co-signed by a quorum of independent
//!   oracles over a binding key.
//!
//! Both walk every signature before touching any state, track duplicates in
//! a fixed u32 bitmap sized to the roster capacity, and reject the whole
//! submission on the first failing signature.

use super::config_epoch::EpochRoundTag;
use super::errors::{AggregatorError, AggregatorResult};
use super::report::Report;
use super::roster::Roster;
use super::rounds::Round;
use serde::{Deserialize, Serialize};
use shared_crypto::{recover_address, split_signature_blob, EcdsaSignature, KeccakHasher};
use shared_crypto::SignatureError;
use shared_types::{Address, Answer, Hash, RoundId, MAX_ORACLES, ZERO_ADDRESS};

/// Domain separator for the Mode B binding key.
const SUBMISSION_TAG: &[u8] = b"QF_ROUND_V1";

/// Outcome of a successful Mode A verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CosignedVerdict {
    /// The aggregate value to commit.
    pub answer: Answer,
    /// The freshness tag the progress counter advances to.
    pub tag: EpochRoundTag,
}

/// A Mode B candidate round: the fields the quorum co-signs, exactly as
/// they will be persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumSubmission {
    pub round_id: RoundId,
    pub answer: Answer,
    pub started_at: u64,
    pub updated_at: u64,
    pub answered_in_round: RoundId,
}

impl QuorumSubmission {
    /// The key every signature must cover: a keccak fingerprint of the
    /// aggregator's own identity and all round fields, so a signature can
    /// bind neither to another instance nor to other values.
    pub fn binding_key(&self, self_identity: &Address) -> Hash {
        let mut hasher = KeccakHasher::new();
        hasher.update(SUBMISSION_TAG);
        hasher.update(self_identity);
        hasher.update(&self.round_id.to_be_bytes());
        hasher.update(&self.answer.to_be_bytes());
        hasher.update(&self.started_at.to_be_bytes());
        hasher.update(&self.updated_at.to_be_bytes());
        hasher.update(&self.answered_in_round.to_be_bytes());
        hasher.finalize()
    }

    /// The round record these fields persist as.
    pub fn to_round(&self) -> Round {
        Round {
            id: self.round_id,
            answer: self.answer,
            started_at: self.started_at,
            updated_at: self.updated_at,
            answered_in_round: self.answered_in_round,
        }
    }
}

/// Verify a Mode A co-signed report.
///
/// Checks run in a fixed order: signer authentication, digest binding,
/// freshness, observer and observation shape, then the explicit minimum
/// signer count. Nothing is mutated here; the caller commits the verdict.
pub fn verify_cosigned_report(
    roster: &Roster,
    current_digest: &Hash,
    last_tag: EpochRoundTag,
    min_signatures: usize,
    report: &Report,
    signatures: &[EcdsaSignature],
) -> AggregatorResult<CosignedVerdict> {
    let signing_hash = report.signing_hash();

    let mut seen: u32 = 0;
    let mut valid = 0usize;
    for signature in signatures {
        let signer = recover_address(&signing_hash, signature)?;
        let slot = roster
            .signer_slot(&signer)
            .ok_or(AggregatorError::NotAnActiveSigner(signer))?;

        let bit = 1u32 << slot;
        if seen & bit != 0 {
            return Err(AggregatorError::DuplicateSignature(slot));
        }
        seen |= bit;
        valid += 1;
    }

    if &report.config_digest != current_digest {
        return Err(AggregatorError::ConfigDigestMismatch);
    }

    let tag = report.tag();
    if tag <= last_tag {
        return Err(AggregatorError::StaleReport {
            epoch: tag.epoch,
            round: tag.round,
            latest_epoch: last_tag.epoch,
            latest_round: last_tag.round,
        });
    }

    validate_observations(report)?;

    if valid < min_signatures {
        return Err(AggregatorError::QuorumNotMet {
            valid,
            required: min_signatures,
        });
    }

    Ok(CosignedVerdict {
        answer: report.aggregate_answer(),
        tag,
    })
}

/// Shape checks on the observer list and the observation batch.
fn validate_observations(report: &Report) -> AggregatorResult<()> {
    if report.observations.is_empty() {
        return Err(AggregatorError::EmptyReport);
    }
    if report.observers.len() != report.observations.len() {
        return Err(AggregatorError::ObserverCountMismatch {
            observers: report.observers.len(),
            observations: report.observations.len(),
        });
    }

    let mut seen: u32 = 0;
    for &observer in &report.observers {
        if observer as usize >= MAX_ORACLES {
            return Err(AggregatorError::ObserverOutOfRange(observer));
        }
        let bit = 1u32 << observer;
        if seen & bit != 0 {
            return Err(AggregatorError::DuplicateObserver(observer));
        }
        seen |= bit;
    }

    for i in 1..report.observations.len() {
        if report.observations[i] < report.observations[i - 1] {
            return Err(AggregatorError::UnsortedObservations(i));
        }
    }

    Ok(())
}

/// Verify a Mode B quorum submission.
///
/// Every signature in the blob must recover to a distinct oracle eligible
/// for the target round; a single failing signature aborts the submission.
/// Distinct valid signers must then exceed two thirds of the active roster:
/// `valid * 3 > signer_count * 2`.
pub fn verify_quorum_submission(
    roster: &Roster,
    self_identity: &Address,
    latest_round_id: RoundId,
    submission: &QuorumSubmission,
    signature_blob: &[u8],
) -> AggregatorResult<()> {
    let expected = latest_round_id + 1;
    if submission.round_id != expected {
        return Err(AggregatorError::InvalidRoundId {
            expected,
            actual: submission.round_id,
        });
    }

    let raw_signatures = split_signature_blob(signature_blob).map_err(|e| match e {
        SignatureError::InvalidBlobLength(len) => AggregatorError::InvalidSignatureEncoding(len),
        other => AggregatorError::Signature(other),
    })?;

    let binding_key = submission.binding_key(self_identity);

    let mut seen: u32 = 0;
    let mut valid = 0usize;
    for raw in &raw_signatures {
        // Unrecoverable signatures resolve to the null identity, which can
        // never be a registered oracle.
        let signer =
            recover_address(&binding_key, &raw.to_parts()).unwrap_or(ZERO_ADDRESS);

        let status = roster.validate_eligibility(&signer, submission.round_id)?;
        let slot = status
            .signer_index
            .ok_or(AggregatorError::OracleNotEnabled(signer))?;

        let bit = 1u32 << slot;
        if seen & bit != 0 {
            return Err(AggregatorError::DuplicateSigner(signer));
        }
        seen |= bit;
        valid += 1;
    }

    let roster_size = roster.signer_count();
    if valid * 3 <= roster_size * 2 {
        return Err(AggregatorError::QuorumNotMet {
            valid,
            required: (2 * roster_size) / 3 + 1,
        });
    }

    Ok(())
}
