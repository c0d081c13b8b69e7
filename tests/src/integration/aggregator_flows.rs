//! Full aggregator lifecycles across rotation, submission, and delegation.

use anyhow::Result;
use qf_aggregator::{
    AggregatorConfig, AggregatorError, AggregatorService, CallContext, FeedEvent,
    InMemoryEventSink, OracleRole, QuorumSubmission, Report,
};
use shared_crypto::k256::ecdsa::SigningKey;
use shared_crypto::test_helpers::{address_of, generate_keypair, sign, sign_raw};
use shared_crypto::EcdsaSignature;
use shared_types::{Address, Answer, RoundId};
use std::sync::Arc;

const SELF_IDENTITY: Address = [0xF0; 20];
const OWNER: Address = [0x01; 20];
const TRANSMITTER: Address = [0x02; 20];

fn ctx(caller: Address) -> CallContext {
    CallContext {
        caller,
        height: 1_000,
        timestamp: 1_700_000_000,
    }
}

fn new_feed(min_signatures: usize) -> (AggregatorService, Arc<InMemoryEventSink>) {
    let sink = Arc::new(InMemoryEventSink::new());
    let service = AggregatorService::new(
        SELF_IDENTITY,
        OWNER,
        AggregatorConfig {
            decimals: 8,
            description: "QF / USD".to_string(),
            version: 1,
            min_signatures,
        },
        sink.clone(),
    );
    (service, sink)
}

fn keyring(n: usize) -> Vec<SigningKey> {
    (0..n).map(|_| generate_keypair().0).collect()
}

fn cosigned(
    service: &AggregatorService,
    keys: &[&SigningKey],
    epoch: u32,
    round: u8,
    observations: Vec<Answer>,
) -> (Report, Vec<EcdsaSignature>) {
    let report = Report {
        config_digest: service.current_digest(),
        epoch,
        round,
        observers: (0..observations.len() as u8).collect(),
        observations,
    };
    let hash = report.signing_hash();
    let signatures = keys.iter().map(|key| sign(&hash, key)).collect();
    (report, signatures)
}

#[test]
fn test_cosigned_feed_lifecycle() -> Result<()> {
    super::init_tracing();

    let (mut service, sink) = new_feed(2);
    let keys = keyring(4);
    let signers: Vec<Address> = keys.iter().map(address_of).collect();

    service.rotate_config(ctx(OWNER), signers, vec![TRANSMITTER], 1, 1, b"offchain".to_vec())?;

    // A run of reports under epoch 1, observing drifting prices.
    for (round, observations) in [(1u8, vec![99, 100, 101]), (2, vec![100, 102, 104])] {
        let (report, signatures) =
            cosigned(&service, &[&keys[0], &keys[2]], 1, round, observations);
        service.submit_report(ctx(TRANSMITTER), &report, &signatures)?;
    }

    assert_eq!(service.latest_round_id(), 2);
    assert_eq!(service.latest_round_data().unwrap().answer, 102);
    assert_eq!(service.get_round_data(1).unwrap().answer, 100);

    // Round 3 never happened.
    assert_eq!(
        service.get_round_data(3),
        Err(AggregatorError::NoDataPresent(3))
    );

    // Rotation invalidates epoch-1 reports even for the same signers.
    let (old_report, old_signatures) =
        cosigned(&service, &[&keys[0], &keys[1]], 1, 3, vec![100, 101, 102]);
    let signers: Vec<Address> = keys.iter().map(address_of).collect();
    service.rotate_config(ctx(OWNER), signers, vec![TRANSMITTER], 1, 1, b"offchain".to_vec())?;
    assert_eq!(
        service.submit_report(ctx(TRANSMITTER), &old_report, &old_signatures),
        Err(AggregatorError::ConfigDigestMismatch)
    );

    // Fresh reports under epoch 2 pick up where the history left off.
    let (report, signatures) = cosigned(&service, &[&keys[1], &keys[3]], 1, 1, vec![105, 106, 107]);
    let id = service.submit_report(ctx(TRANSMITTER), &report, &signatures)?;
    assert_eq!(id, 3);

    let rotations = sink
        .events()
        .iter()
        .filter(|e| matches!(e, FeedEvent::ConfigRotated { .. }))
        .count();
    assert_eq!(rotations, 2);
    Ok(())
}

#[test]
fn test_quorum_feed_lifecycle_with_membership_churn() {
    let (mut service, _) = new_feed(1);
    let keys = keyring(4);
    for key in &keys {
        service
            .add_oracle(ctx(OWNER), address_of(key), OracleRole::Signer)
            .unwrap();
    }

    let submit = |service: &mut AggregatorService,
                  round_id: RoundId,
                  answer: Answer,
                  signers: &[&SigningKey]| {
        let submission = QuorumSubmission {
            round_id,
            answer,
            started_at: 10 * round_id,
            updated_at: 10 * round_id + 1,
            answered_in_round: round_id,
        };
        let key_hash = submission.binding_key(&SELF_IDENTITY);
        let mut blob = Vec::new();
        for signer in signers {
            blob.extend_from_slice(&sign_raw(&key_hash, signer).bytes);
        }
        service.submit_round(ctx([0x77; 20]), submission, &blob)
    };

    submit(&mut service, 1, 100, &[&keys[0], &keys[1], &keys[2]]).unwrap();
    submit(&mut service, 2, 101, &[&keys[1], &keys[2], &keys[3]]).unwrap();

    // One oracle leaves after round 2; its window closes at round 3.
    service
        .remove_oracle(ctx(OWNER), address_of(&keys[3]))
        .unwrap();

    let rejected = submit(&mut service, 3, 102, &[&keys[0], &keys[1], &keys[3]]);
    assert_eq!(
        rejected,
        Err(AggregatorError::OracleNoLongerAllowed {
            oracle: address_of(&keys[3]),
            round: 3,
        })
    );

    // The remaining three-of-three still clears two thirds of the roster.
    submit(&mut service, 3, 102, &[&keys[0], &keys[1], &keys[2]]).unwrap();

    // Two-of-three does not.
    let short = submit(&mut service, 4, 103, &[&keys[0], &keys[1]]);
    assert_eq!(
        short,
        Err(AggregatorError::QuorumNotMet {
            valid: 2,
            required: 3,
        })
    );

    assert_eq!(service.latest_round_id(), 3);
    assert_eq!(service.latest_round_data().unwrap().answer, 102);
}

#[test]
fn test_feed_migration_to_successor() {
    let (mut retiring, _) = new_feed(1);
    retiring
        .grant_operator_permit(ctx(OWNER), TRANSMITTER, 2_000)
        .unwrap();
    retiring.submit_direct(ctx(TRANSMITTER), 100, 1).unwrap();
    retiring.submit_direct(ctx(TRANSMITTER), 101, 2).unwrap();

    let successor_sink = Arc::new(InMemoryEventSink::new());
    let mut successor = AggregatorService::new(
        [0xF1; 20],
        OWNER,
        AggregatorConfig {
            decimals: 18,
            description: "QF / USD v2".to_string(),
            version: 2,
            min_signatures: 1,
        },
        successor_sink,
    );
    successor
        .grant_operator_permit(ctx(OWNER), TRANSMITTER, 2_000)
        .unwrap();
    successor.submit_direct(ctx(TRANSMITTER), 500, 3).unwrap();

    retiring
        .set_successor(ctx(OWNER), [0xF1; 20], Arc::new(successor))
        .unwrap();
    retiring.disable_writes(ctx(OWNER)).unwrap();

    // The retired feed now mirrors its successor and takes no writes.
    assert_eq!(retiring.decimals(), 18);
    assert_eq!(retiring.version(), 2);
    assert_eq!(retiring.latest_round_data().unwrap().answer, 500);
    assert_eq!(
        retiring.submit_direct(ctx(TRANSMITTER), 102, 4),
        Err(AggregatorError::Unauthorized(TRANSMITTER))
    );
}

#[test]
fn test_round_ids_never_skip_or_reuse() {
    let (mut service, _) = new_feed(1);
    service
        .grant_operator_permit(ctx(OWNER), TRANSMITTER, 2_000)
        .unwrap();

    let mut previous = 0;
    for i in 0..10 {
        let id = service
            .submit_direct(ctx(TRANSMITTER), 100 + i, i as u64)
            .unwrap();
        assert_eq!(id, previous + 1);
        previous = id;
    }
    assert_eq!(service.latest_round_id(), 10);
}
