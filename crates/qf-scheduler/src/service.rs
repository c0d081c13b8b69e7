//! Submission Scheduler - the head-triggered run loop.
//!
//! One loop per scheduler instance. Each wake drains the newest head from
//! the mailbox, loads the targets due at that height, and executes them
//! through a bounded queue: estimate a fee price, buffer it, run the
//! pipeline, and record the height on success. Failures are logged and
//! skipped; the next head is the retry.

use crate::config::SchedulerConfig;
use crate::error::{SchedulerError, SchedulerResult};
use crate::mailbox::Mailbox;
use crate::ports::{
    submission_payload, FeePriceEstimator, Head, PipelineOutcome, SubmissionJob,
    SubmissionPipeline, TargetRegistration, TargetStore,
};
use parking_lot::Mutex;
use primitive_types::U256;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Apply the configured buffer on top of an estimator quote:
/// `quote * (100 + percent) / 100`.
pub fn apply_fee_buffer(quote: U256, buffer_percent: u64) -> U256 {
    quote.saturating_mul(U256::from(100 + buffer_percent)) / U256::from(100)
}

struct Inner<T, F, P> {
    targets: T,
    estimator: F,
    pipeline: P,
    config: SchedulerConfig,
    mailbox: Mailbox<Head>,
    stop: Notify,
    running: AtomicBool,
    execution_queue: Arc<Semaphore>,
}

/// Head-triggered submission runner.
pub struct SubmissionScheduler<T, F, P> {
    inner: Arc<Inner<T, F, P>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<T, F, P> SubmissionScheduler<T, F, P>
where
    T: TargetStore + 'static,
    F: FeePriceEstimator + 'static,
    P: SubmissionPipeline + 'static,
{
    pub fn new(targets: T, estimator: F, pipeline: P, config: SchedulerConfig) -> Self {
        let execution_queue = Arc::new(Semaphore::new(config.execution_queue_size.max(1)));
        Self {
            inner: Arc::new(Inner {
                targets,
                estimator,
                pipeline,
                config,
                mailbox: Mailbox::new(),
                stop: Notify::new(),
                running: AtomicBool::new(false),
                execution_queue,
            }),
            handle: Mutex::new(None),
        }
    }

    /// Deliver a new finalized head. Coalesces: only the newest head still
    /// matters when the loop next wakes.
    pub fn on_new_head(&self, head: Head) {
        self.inner.mailbox.deliver(head);
    }

    /// Spawn the run loop.
    pub fn start(&self) -> SchedulerResult<()> {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyRunning);
        }

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = inner.stop.notified() => break,
                    _ = inner.mailbox.notified() => {
                        Inner::process_latest_head(Arc::clone(&inner)).await;
                    }
                }
            }
        });
        *self.handle.lock() = Some(handle);

        info!("submission scheduler started");
        Ok(())
    }

    /// Stop the run loop and wait for it to drain.
    pub async fn stop(&self) {
        if !self.inner.running.load(Ordering::SeqCst) {
            return;
        }

        self.inner.stop.notify_one();
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        self.inner.running.store(false, Ordering::SeqCst);

        info!("submission scheduler stopped");
    }
}

impl<T, F, P> Inner<T, F, P>
where
    T: TargetStore + 'static,
    F: FeePriceEstimator + 'static,
    P: SubmissionPipeline + 'static,
{
    async fn process_latest_head(inner: Arc<Self>) {
        let Some(head) = inner.mailbox.retrieve() else {
            debug!("no head to retrieve, trigger already consumed");
            return;
        };

        debug!(head = head.number, "checking eligible targets");

        let targets = match inner
            .targets
            .eligible_targets(head.number, inner.config.maximum_grace_period)
            .await
        {
            Ok(targets) => targets,
            Err(error) => {
                warn!(%error, "unable to load eligible targets");
                return;
            }
        };

        let mut handles = Vec::with_capacity(targets.len());
        for target in targets {
            let Ok(permit) = Arc::clone(&inner.execution_queue).acquire_owned().await else {
                return;
            };
            let task_inner = Arc::clone(&inner);
            handles.push(tokio::spawn(async move {
                task_inner.execute(target, head.number).await;
                drop(permit);
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }
    }

    async fn execute(&self, target: TargetRegistration, head_number: u64) {
        debug!(target_id = target.id, head = head_number, "checking target");

        let fee_price = match self.buffered_fee_price(&target).await {
            Ok(price) => price,
            Err(error) => {
                warn!(target_id = target.id, %error, "estimating fee price failed");
                return;
            }
        };

        let job = SubmissionJob {
            target: target.clone(),
            head_number,
            fee_price,
        };

        match self.pipeline.run(job).await {
            Ok(PipelineOutcome::Completed) => {
                // Only runs that actually broadcast move the bookkeeping.
                if let Err(error) = self
                    .targets
                    .record_last_run_height(target.id, head_number)
                    .await
                {
                    warn!(target_id = target.id, %error, "failed to record last run height");
                }
            }
            Ok(PipelineOutcome::Incomplete) => {
                debug!(target_id = target.id, "pipeline run did not broadcast");
            }
            Err(error) => {
                warn!(target_id = target.id, %error, "failed executing run");
            }
        }
    }

    async fn buffered_fee_price(&self, target: &TargetRegistration) -> SchedulerResult<U256> {
        let payload = submission_payload(target);
        let quote = self
            .estimator
            .estimate_fee_price(&payload, target.submit_gas_limit)
            .await?;
        Ok(apply_fee_buffer(quote, self.config.fee_buffer_percent))
    }
}
