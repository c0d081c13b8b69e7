//! Aggregator Service - wires the domain to the ports.
//!
//! One instance owns the roster, the config epoch, the freshness tag, and
//! the round history. The host runtime serializes invocations, so methods
//! take `&mut self` and hold no locks; every operation validates completely
//! before mutating anything.

use crate::config::AggregatorConfig;
use crate::domain::{
    config_epoch::{config_digest, ConfigEpoch, EpochRoundTag},
    errors::{AggregatorError, AggregatorResult},
    report::Report,
    roster::{OracleRole, OracleStatus, Roster},
    rounds::{Round, RoundStore},
    verification::{verify_cosigned_report, verify_quorum_submission, QuorumSubmission},
};
use crate::ports::{EventSink, FeedEvent, FeedReader};
use shared_crypto::EcdsaSignature;
use shared_types::{Address, Answer, Epoch, Hash, RoundId, MAX_ORACLES};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Host-supplied context of one invocation.
#[derive(Clone, Copy, Debug)]
pub struct CallContext {
    /// Authenticated identity of the caller.
    pub caller: Address,
    /// Finalized height of the host ledger.
    pub height: u64,
    /// Host clock, seconds.
    pub timestamp: u64,
}

/// The aggregation core.
pub struct AggregatorService {
    self_identity: Address,
    owner: Address,
    config: AggregatorConfig,
    roster: Roster,
    config_epoch: ConfigEpoch,
    progress: EpochRoundTag,
    rounds: RoundStore,
    successor: Option<Arc<dyn FeedReader>>,
    operator_permits: HashMap<Address, u64>,
    writes_disabled: bool,
    events: Arc<dyn EventSink>,
}

impl AggregatorService {
    /// Create a feed with an empty roster and no history.
    pub fn new(
        self_identity: Address,
        owner: Address,
        config: AggregatorConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        info!(
            description = %config.description,
            decimals = config.decimals,
            "initializing aggregator"
        );

        Self {
            self_identity,
            owner,
            config,
            roster: Roster::new(),
            config_epoch: ConfigEpoch::genesis(),
            progress: EpochRoundTag::default(),
            rounds: RoundStore::new(),
            successor: None,
            operator_permits: HashMap::new(),
            writes_disabled: false,
            events,
        }
    }

    // === ADMIN SURFACE ===

    /// Replace the reporter membership and parameters with a new
    /// configuration epoch.
    ///
    /// All validation happens before the old roster is cleared; a rejected
    /// rotation leaves membership, digest, and progress untouched.
    pub fn rotate_config(
        &mut self,
        ctx: CallContext,
        signers: Vec<Address>,
        transmitters: Vec<Address>,
        fault_threshold: u8,
        encoding_version: u64,
        payload: Vec<u8>,
    ) -> AggregatorResult<Hash> {
        self.ensure_owner(&ctx)?;

        let requested = signers.len() + transmitters.len();
        if requested > MAX_ORACLES {
            return Err(AggregatorError::CapacityExceeded {
                requested,
                capacity: MAX_ORACLES,
            });
        }
        reject_duplicates(&signers)?;
        reject_duplicates(&transmitters)?;
        if signers.len() <= 3 * fault_threshold as usize {
            return Err(AggregatorError::FaultThresholdTooHigh {
                signers: signers.len(),
                threshold: fault_threshold,
            });
        }

        let latest_round = self.rounds.latest_round_id();
        let signer_set: HashSet<Address> = signers.iter().copied().collect();
        let transmitter_set: HashSet<Address> = transmitters.iter().copied().collect();

        self.roster.clear();
        for signer in &signers {
            let role = if transmitter_set.contains(signer) {
                OracleRole::SignerAndTransmitter
            } else {
                OracleRole::Signer
            };
            self.roster.admit(*signer, role, latest_round)?;
            self.events.publish(FeedEvent::OracleAdmitted {
                oracle: *signer,
                role,
            });
        }
        for transmitter in &transmitters {
            if signer_set.contains(transmitter) {
                continue;
            }
            self.roster
                .admit(*transmitter, OracleRole::Transmitter, latest_round)?;
            self.events.publish(FeedEvent::OracleAdmitted {
                oracle: *transmitter,
                role: OracleRole::Transmitter,
            });
        }

        let count = self.config_epoch.count + 1;
        let digest = config_digest(
            &self.self_identity,
            count,
            &signers,
            &transmitters,
            fault_threshold,
            encoding_version,
            &payload,
        );
        self.config_epoch = ConfigEpoch {
            count,
            digest,
            signer_list: signers,
            transmitter_list: transmitters,
            fault_threshold,
            encoding_version,
            opaque_payload: payload,
        };
        self.progress = EpochRoundTag::default();

        info!(count, "configuration rotated");
        self.events
            .publish(FeedEvent::ConfigRotated { count, digest });
        Ok(digest)
    }

    /// Register a single oracle.
    pub fn add_oracle(
        &mut self,
        ctx: CallContext,
        identity: Address,
        role: OracleRole,
    ) -> AggregatorResult<()> {
        self.ensure_owner(&ctx)?;
        self.roster
            .admit(identity, role, self.rounds.latest_round_id())?;

        info!(oracle = ?identity, ?role, "oracle admitted");
        self.events
            .publish(FeedEvent::OracleAdmitted { oracle: identity, role });
        Ok(())
    }

    /// Remove a single oracle, closing its validity window.
    pub fn remove_oracle(&mut self, ctx: CallContext, identity: Address) -> AggregatorResult<()> {
        self.ensure_owner(&ctx)?;
        self.roster
            .retire(identity, self.rounds.latest_round_id())?;

        info!(oracle = ?identity, "oracle removed");
        self.events
            .publish(FeedEvent::OracleRemoved { oracle: identity });
        Ok(())
    }

    /// Install a successor; reads forward to it from now on.
    pub fn set_successor(
        &mut self,
        ctx: CallContext,
        successor_identity: Address,
        successor: Arc<dyn FeedReader>,
    ) -> AggregatorResult<()> {
        self.ensure_owner(&ctx)?;
        self.successor = Some(successor);

        info!(successor = ?successor_identity, "successor installed");
        self.events.publish(FeedEvent::SuccessorSet {
            successor: successor_identity,
        });
        Ok(())
    }

    /// Grant a time-boxed permit for the direct submission mode.
    pub fn grant_operator_permit(
        &mut self,
        ctx: CallContext,
        operator: Address,
        expires_at_height: u64,
    ) -> AggregatorResult<()> {
        self.ensure_owner(&ctx)?;
        self.operator_permits.insert(operator, expires_at_height);

        info!(operator = ?operator, expires_at_height, "operator permit granted");
        self.events.publish(FeedEvent::OperatorPermitGranted {
            operator,
            expires_at_height,
        });
        Ok(())
    }

    /// Hand the administrator capability to another identity.
    pub fn transfer_ownership(
        &mut self,
        ctx: CallContext,
        new_owner: Address,
    ) -> AggregatorResult<()> {
        self.ensure_owner(&ctx)?;
        let previous = self.owner;
        self.owner = new_owner;

        info!(previous = ?previous, new = ?new_owner, "ownership transferred");
        self.events.publish(FeedEvent::OwnershipTransferred {
            previous,
            new: new_owner,
        });
        Ok(())
    }

    /// Permanently stop accepting submissions on this instance. Typically
    /// follows `set_successor` when a feed is retired.
    pub fn disable_writes(&mut self, ctx: CallContext) -> AggregatorResult<()> {
        self.ensure_owner(&ctx)?;
        self.writes_disabled = true;

        info!("writes disabled");
        self.events.publish(FeedEvent::WritesDisabled);
        Ok(())
    }

    // === WRITE SURFACE ===

    /// Mode A: accept one co-signed batch report carried by an active
    /// transmitter. Returns the committed round id.
    pub fn submit_report(
        &mut self,
        ctx: CallContext,
        report: &Report,
        signatures: &[EcdsaSignature],
    ) -> AggregatorResult<RoundId> {
        self.ensure_writable(&ctx)?;
        if !self.roster.is_transmitter(&ctx.caller) {
            return Err(AggregatorError::Unauthorized(ctx.caller));
        }

        let verdict = verify_cosigned_report(
            &self.roster,
            &self.config_epoch.digest,
            self.progress,
            self.config.min_signatures,
            report,
            signatures,
        )?;

        let id = self.rounds.latest_round_id() + 1;
        self.rounds.commit(Round {
            id,
            answer: verdict.answer,
            started_at: ctx.timestamp,
            updated_at: ctx.timestamp,
            answered_in_round: id,
        })?;
        self.progress = verdict.tag;

        debug!(
            round_id = id,
            epoch = verdict.tag.epoch,
            answer = %verdict.answer,
            "co-signed report accepted"
        );
        self.events.publish(FeedEvent::RoundCommitted {
            round_id: id,
            answer: verdict.answer,
        });
        Ok(id)
    }

    /// Mode B: accept one candidate round co-signed by a quorum of
    /// independent oracles.
    pub fn submit_round(
        &mut self,
        ctx: CallContext,
        submission: QuorumSubmission,
        signature_blob: &[u8],
    ) -> AggregatorResult<RoundId> {
        self.ensure_writable(&ctx)?;

        verify_quorum_submission(
            &self.roster,
            &self.self_identity,
            self.rounds.latest_round_id(),
            &submission,
            signature_blob,
        )?;
        self.rounds.commit(submission.to_round())?;

        debug!(round_id = submission.round_id, "quorum submission accepted");
        self.events.publish(FeedEvent::RoundCommitted {
            round_id: submission.round_id,
            answer: submission.answer,
        });
        Ok(submission.round_id)
    }

    /// Direct mode: a single trusted reporter with a live permit writes an
    /// answer with no signature or quorum check.
    pub fn submit_direct(
        &mut self,
        ctx: CallContext,
        answer: Answer,
        observed_at: u64,
    ) -> AggregatorResult<RoundId> {
        self.ensure_writable(&ctx)?;

        let permitted = self
            .operator_permits
            .get(&ctx.caller)
            .is_some_and(|&expires_at| ctx.height <= expires_at);
        if !permitted {
            return Err(AggregatorError::Unauthorized(ctx.caller));
        }

        let id = self.rounds.latest_round_id() + 1;
        self.rounds.commit(Round {
            id,
            answer,
            started_at: observed_at,
            updated_at: ctx.timestamp,
            answered_in_round: id,
        })?;

        debug!(round_id = id, "direct submission accepted");
        self.events.publish(FeedEvent::RoundCommitted {
            round_id: id,
            answer,
        });
        Ok(id)
    }

    // === READ SURFACE (delegates to a successor when installed) ===

    pub fn decimals(&self) -> u8 {
        match &self.successor {
            Some(successor) => successor.decimals(),
            None => self.config.decimals,
        }
    }

    pub fn description(&self) -> String {
        match &self.successor {
            Some(successor) => successor.description(),
            None => self.config.description.clone(),
        }
    }

    pub fn version(&self) -> u64 {
        match &self.successor {
            Some(successor) => successor.version(),
            None => self.config.version,
        }
    }

    pub fn get_round_data(&self, round_id: RoundId) -> AggregatorResult<Round> {
        match &self.successor {
            Some(successor) => successor.get_round_data(round_id),
            None => self.rounds.get(round_id),
        }
    }

    pub fn latest_round_data(&self) -> AggregatorResult<Round> {
        match &self.successor {
            Some(successor) => successor.latest_round_data(),
            None => self.rounds.latest_round(),
        }
    }

    // === INTROSPECTION (always local) ===

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn current_digest(&self) -> Hash {
        self.config_epoch.digest
    }

    pub fn config_count(&self) -> Epoch {
        self.config_epoch.count
    }

    pub fn current_epoch_round(&self) -> EpochRoundTag {
        self.progress
    }

    pub fn latest_round_id(&self) -> RoundId {
        self.rounds.latest_round_id()
    }

    pub fn oracle_count(&self) -> usize {
        self.roster.oracle_count()
    }

    pub fn list_oracles(&self) -> Vec<Address> {
        self.roster.list_oracles()
    }

    pub fn status_of(&self, identity: &Address) -> Option<&OracleStatus> {
        self.roster.status_of(identity)
    }

    // === CAPABILITY CHECKS ===

    fn ensure_owner(&self, ctx: &CallContext) -> AggregatorResult<()> {
        if ctx.caller != self.owner {
            return Err(AggregatorError::Unauthorized(ctx.caller));
        }
        Ok(())
    }

    fn ensure_writable(&self, ctx: &CallContext) -> AggregatorResult<()> {
        if self.writes_disabled {
            return Err(AggregatorError::Unauthorized(ctx.caller));
        }
        Ok(())
    }
}

impl FeedReader for AggregatorService {
    fn decimals(&self) -> u8 {
        AggregatorService::decimals(self)
    }

    fn description(&self) -> String {
        AggregatorService::description(self)
    }

    fn version(&self) -> u64 {
        AggregatorService::version(self)
    }

    fn get_round_data(&self, round_id: RoundId) -> AggregatorResult<Round> {
        AggregatorService::get_round_data(self, round_id)
    }

    fn latest_round_data(&self) -> AggregatorResult<Round> {
        AggregatorService::latest_round_data(self)
    }
}

/// Reject a rotation list containing the same identity twice.
fn reject_duplicates(list: &[Address]) -> AggregatorResult<()> {
    let mut seen = HashSet::with_capacity(list.len());
    for identity in list {
        if !seen.insert(*identity) {
            return Err(AggregatorError::DuplicateRosterEntry(*identity));
        }
    }
    Ok(())
}
