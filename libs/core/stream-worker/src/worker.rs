//! The worker loop: read, dispatch, acknowledge.

use crate::config::WorkerConfig;
use crate::consumer::StreamConsumer;
use crate::error::StreamError;
use crate::event::StreamEvent;
use crate::registry::{StreamJob, StreamProcessor};
use redis::aio::ConnectionManager;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

const MAX_BACKOFF_SECS: u64 = 30;

/// Runs a [`StreamProcessor`] against a consumer group until shutdown.
///
/// Each read batch is processed concurrently, one task per entry, and every entry
/// is acknowledged once its task ends. A processor error or panic is logged and does
/// not stop the loop.
pub struct StreamWorker<J, P>
where
    J: StreamJob,
    P: StreamProcessor<J>,
{
    consumer: StreamConsumer,
    processor: Arc<P>,
    config: WorkerConfig,
    _phantom: PhantomData<J>,
}

impl<J, P> StreamWorker<J, P>
where
    J: StreamJob,
    P: StreamProcessor<J> + 'static,
{
    pub fn new(redis: ConnectionManager, processor: Arc<P>, config: WorkerConfig) -> Self {
        Self {
            consumer: StreamConsumer::new(redis, config.clone()),
            processor,
            config,
            _phantom: PhantomData,
        }
    }

    /// Process entries until `shutdown` turns `true`.
    ///
    /// Only failing to create the consumer group at startup is returned as an error;
    /// later Redis errors are logged and retried with backoff.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), StreamError> {
        info!(
            consumer_id = %self.config.consumer_id,
            stream = %self.config.stream_name,
            group = %self.config.consumer_group,
            processor = %self.processor.name(),
            batch_size = self.config.batch_size,
            "Starting stream worker"
        );

        self.consumer.ensure_consumer_group().await?;

        // Entries left unacknowledged by an earlier run under the same consumer id
        match self.consumer.read_pending::<J>().await {
            Ok(events) => self.process_batch(events).await,
            Err(e) => warn!(error = %e, "Failed to read pending entries on startup"),
        }

        let claim_interval = Duration::from_millis(self.config.claim_idle_ms);
        let mut last_claim = Instant::now();
        let mut consecutive_errors: u32 = 0;

        while !*shutdown.borrow() {
            match self.consumer.read_new::<J>().await {
                Ok(events) => {
                    if consecutive_errors > 0 {
                        info!(consecutive_errors, "Stream reads recovered");
                        consecutive_errors = 0;
                    }
                    self.process_batch(events).await;
                }
                Err(e) if e.is_nogroup_error() => {
                    warn!("Consumer group missing, recreating");
                    if let Err(e) = self.consumer.ensure_consumer_group().await {
                        error!(error = %e, "Failed to recreate consumer group");
                    }
                }
                Err(e) => {
                    consecutive_errors += 1;
                    let backoff = backoff_for(consecutive_errors);
                    warn!(
                        error = %e,
                        consecutive_errors,
                        backoff_secs = backoff.as_secs(),
                        "Stream read failed, backing off"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(backoff) => {}
                        _ = stopped(&mut shutdown) => {}
                    }
                    continue;
                }
            }

            if last_claim.elapsed() >= claim_interval {
                match self.consumer.claim_abandoned::<J>().await {
                    Ok(events) => self.process_batch(events).await,
                    Err(e) => debug!(error = %e, "Failed to claim abandoned entries"),
                }
                last_claim = Instant::now();
            }
        }

        info!(stream = %self.config.stream_name, "Stream worker stopped");
        Ok(())
    }

    async fn process_batch(&self, events: Vec<StreamEvent<J>>) {
        if events.is_empty() {
            return;
        }

        let finished = dispatch(Arc::clone(&self.processor), events).await;
        if let Err(e) = self.consumer.ack(&finished).await {
            error!(error = %e, count = finished.len(), "Failed to acknowledge entries");
        }
    }
}

/// Run every event through the processor concurrently and return the IDs of the
/// entries that finished, which is all of them.
pub(crate) async fn dispatch<J, P>(processor: Arc<P>, events: Vec<StreamEvent<J>>) -> Vec<String>
where
    J: StreamJob,
    P: StreamProcessor<J> + 'static,
{
    let mut tasks = JoinSet::new();

    for event in events {
        let processor = Arc::clone(&processor);
        tasks.spawn(async move {
            let job_id = event.job.job_id();
            let age_ms = event.age_ms();
            let job = event.job;
            // Inner task so a panicking processor surfaces as a JoinError we can log
            let outcome = tokio::spawn(async move { processor.process(&job).await }).await;

            match outcome {
                Ok(Ok(())) => debug!(stream_id = %event.stream_id, job_id = %job_id, age_ms, "Processed entry"),
                Ok(Err(e)) => error!(
                    stream_id = %event.stream_id,
                    job_id = %job_id,
                    error = %e,
                    "Processing failed, entry dropped"
                ),
                Err(e) => error!(
                    stream_id = %event.stream_id,
                    job_id = %job_id,
                    error = %e,
                    "Processor task aborted, entry dropped"
                ),
            }

            event.stream_id
        });
    }

    let mut finished = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(stream_id) => finished.push(stream_id),
            Err(e) => error!(error = %e, "Dispatch task failed"),
        }
    }
    finished
}

fn backoff_for(consecutive_errors: u32) -> Duration {
    Duration::from_secs(2u64.pow(consecutive_errors.min(5)).min(MAX_BACKOFF_SECS))
}

/// Resolves once the shutdown flag is set; never resolves if the sender is gone.
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
