//! The scheduler driving a live aggregator through its write surface.

use async_trait::async_trait;
use parking_lot::Mutex;
use primitive_types::U256;
use qf_aggregator::{AggregatorConfig, AggregatorService, CallContext, InMemoryEventSink};
use qf_scheduler::{
    FeePriceEstimator, Head, PipelineOutcome, SchedulerConfig, SchedulerError, SchedulerResult,
    SubmissionJob, SubmissionPipeline, SubmissionScheduler, TargetRegistration, TargetStore,
};
use shared_types::Address;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

const SELF_IDENTITY: Address = [0xF0; 20];
const OWNER: Address = [0x01; 20];
const OPERATOR: Address = [0x02; 20];

/// A single-target store that reports a target as eligible until it has run.
#[derive(Clone)]
struct SingleTargetStore {
    target: TargetRegistration,
    last_run: Arc<Mutex<Option<u64>>>,
    recorded_tx: mpsc::UnboundedSender<u64>,
}

#[async_trait]
impl TargetStore for SingleTargetStore {
    async fn eligible_targets(
        &self,
        _head_number: u64,
        _maximum_grace_period: u64,
    ) -> SchedulerResult<Vec<TargetRegistration>> {
        Ok(match *self.last_run.lock() {
            Some(_) => Vec::new(),
            None => vec![self.target.clone()],
        })
    }

    async fn record_last_run_height(&self, _target_id: u64, height: u64) -> SchedulerResult<()> {
        *self.last_run.lock() = Some(height);
        let _ = self.recorded_tx.send(height);
        Ok(())
    }
}

struct FlatEstimator;

#[async_trait]
impl FeePriceEstimator for FlatEstimator {
    async fn estimate_fee_price(&self, _payload: &[u8], _gas_limit: u64) -> SchedulerResult<U256> {
        Ok(U256::from(1_000u64))
    }
}

/// Pipeline that performs a direct submission against a shared aggregator.
struct DirectSubmissionPipeline {
    feed: Arc<Mutex<AggregatorService>>,
    answer: i128,
}

#[async_trait]
impl SubmissionPipeline for DirectSubmissionPipeline {
    async fn run(&self, job: SubmissionJob) -> SchedulerResult<PipelineOutcome> {
        let ctx = CallContext {
            caller: OPERATOR,
            height: job.head_number,
            timestamp: 1_700_000_000 + job.head_number,
        };
        self.feed
            .lock()
            .submit_direct(ctx, self.answer, 1_700_000_000)
            .map_err(|e| SchedulerError::Pipeline(e.to_string()))?;
        Ok(PipelineOutcome::Completed)
    }
}

#[tokio::test]
async fn test_head_trigger_commits_a_round() {
    super::init_tracing();

    let sink = Arc::new(InMemoryEventSink::new());
    let mut service = AggregatorService::new(
        SELF_IDENTITY,
        OWNER,
        AggregatorConfig::default(),
        sink.clone(),
    );
    service
        .grant_operator_permit(
            CallContext {
                caller: OWNER,
                height: 1,
                timestamp: 0,
            },
            OPERATOR,
            10_000,
        )
        .unwrap();
    let feed = Arc::new(Mutex::new(service));

    let (recorded_tx, mut recorded_rx) = mpsc::unbounded_channel();
    let store = SingleTargetStore {
        target: TargetRegistration {
            id: 1,
            aggregator: SELF_IDENTITY,
            from: OPERATOR,
            submit_gas_limit: 300_000,
        },
        last_run: Arc::new(Mutex::new(None)),
        recorded_tx,
    };

    let scheduler = SubmissionScheduler::new(
        store.clone(),
        FlatEstimator,
        DirectSubmissionPipeline {
            feed: feed.clone(),
            answer: 2_345,
        },
        SchedulerConfig::default(),
    );

    scheduler.start().unwrap();
    scheduler.on_new_head(Head { number: 50 });

    let recorded_height = tokio::time::timeout(Duration::from_secs(5), recorded_rx.recv())
        .await
        .expect("scheduler never recorded a run")
        .expect("channel closed");
    scheduler.stop().await;

    assert_eq!(recorded_height, 50);
    assert_eq!(*store.last_run.lock(), Some(50));

    let feed = feed.lock();
    assert_eq!(feed.latest_round_id(), 1);
    assert_eq!(feed.latest_round_data().unwrap().answer, 2_345);
}

#[tokio::test]
async fn test_target_stops_being_eligible_after_running() {
    super::init_tracing();

    let sink = Arc::new(InMemoryEventSink::new());
    let mut service = AggregatorService::new(
        SELF_IDENTITY,
        OWNER,
        AggregatorConfig::default(),
        sink,
    );
    service
        .grant_operator_permit(
            CallContext {
                caller: OWNER,
                height: 1,
                timestamp: 0,
            },
            OPERATOR,
            10_000,
        )
        .unwrap();
    let feed = Arc::new(Mutex::new(service));

    let (recorded_tx, mut recorded_rx) = mpsc::unbounded_channel();
    let store = SingleTargetStore {
        target: TargetRegistration {
            id: 1,
            aggregator: SELF_IDENTITY,
            from: OPERATOR,
            submit_gas_limit: 300_000,
        },
        last_run: Arc::new(Mutex::new(None)),
        recorded_tx,
    };

    let scheduler = SubmissionScheduler::new(
        store.clone(),
        FlatEstimator,
        DirectSubmissionPipeline {
            feed: feed.clone(),
            answer: 7,
        },
        SchedulerConfig::default(),
    );

    scheduler.start().unwrap();
    scheduler.on_new_head(Head { number: 10 });

    tokio::time::timeout(Duration::from_secs(5), recorded_rx.recv())
        .await
        .expect("scheduler never recorded a run")
        .expect("channel closed");

    // A later head finds no eligible work; nothing else is committed.
    scheduler.on_new_head(Head { number: 11 });
    tokio::time::sleep(Duration::from_millis(200)).await;
    scheduler.stop().await;

    assert_eq!(feed.lock().latest_round_id(), 1);
}
