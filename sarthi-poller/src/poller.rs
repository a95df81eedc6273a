//! Job poller
//!
//! Submits one job and then checks its status at a fixed interval until the
//! server reports a terminal state, the attempt budget runs out, or the
//! caller cancels. Each `start` gets its own task and its own record; pollers
//! share nothing but the backend.

use chrono::Utc;
use sarthi_client::ClientError;
use sarthi_core::domain::job::{JobRecord, JobStatus, JobUpdate};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::backend::JobBackend;
use crate::config::PollerConfig;
use crate::error::{PollError, PollOutcome};
use crate::handle::{PollHandle, PollState};

type UpdateFn = Box<dyn FnMut(&JobRecord) + Send>;
type TerminalFn = Box<dyn FnOnce(PollOutcome) + Send>;

/// Per-call polling options
///
/// Unset interval and attempt limits fall back to the poller's
/// [`PollerConfig`].
pub struct PollOptions {
    interval: Option<Duration>,
    max_attempts: Option<u32>,
    on_update: UpdateFn,
    on_terminal: TerminalFn,
}

impl PollOptions {
    pub fn new() -> Self {
        Self {
            interval: None,
            max_attempts: None,
            on_update: Box::new(|_| {}),
            on_terminal: Box::new(|_| {}),
        }
    }

    /// Delay between the end of one status check and the start of the next
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Maximum number of status checks, failed ones included
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Called after every successful status check, in attempt order
    pub fn on_update<F>(mut self, f: F) -> Self
    where
        F: FnMut(&JobRecord) + Send + 'static,
    {
        self.on_update = Box::new(f);
        self
    }

    /// Called at most once, after the last `on_update`
    pub fn on_terminal<F>(mut self, f: F) -> Self
    where
        F: FnOnce(PollOutcome) + Send + 'static,
    {
        self.on_terminal = Box::new(f);
        self
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Asynchronous job submission and polling client
pub struct AsyncJobPoller<B: JobBackend> {
    backend: Arc<B>,
    config: PollerConfig,
}

impl<B: JobBackend> AsyncJobPoller<B> {
    /// Creates a poller with default configuration
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, PollerConfig::default())
    }

    pub fn with_config(backend: B, config: PollerConfig) -> Self {
        Self::from_shared(Arc::new(backend), config)
    }

    /// Creates a poller over a backend that is also used elsewhere
    pub fn from_shared(backend: Arc<B>, config: PollerConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Submits `payload` and starts polling for its outcome
    ///
    /// Returns immediately; submission happens on the spawned task. Must be
    /// called from within a Tokio runtime.
    pub fn start(&self, payload: B::Payload, options: PollOptions) -> PollHandle {
        let state = Arc::new(PollState::new());

        let run = PollRun {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&state),
            interval: options.interval.unwrap_or(self.config.interval),
            max_attempts: options.max_attempts.unwrap_or(self.config.max_attempts).max(1),
            on_update: options.on_update,
            on_terminal: Some(options.on_terminal),
        };

        let task = tokio::spawn(run.execute(payload));
        PollHandle::new(state, task)
    }
}

/// One submit-then-poll interaction, owned by its task
struct PollRun<B: JobBackend> {
    backend: Arc<B>,
    state: Arc<PollState>,
    interval: Duration,
    max_attempts: u32,
    on_update: UpdateFn,
    on_terminal: Option<TerminalFn>,
}

impl<B: JobBackend> PollRun<B> {
    async fn execute(mut self, payload: B::Payload) {
        let job_id = match self.backend.submit_job(payload).await {
            Ok(job_id) => job_id,
            Err(e) => {
                warn!("Job submission failed: {}", e);
                self.terminate(Err(PollError::SubmissionFailed(e)));
                return;
            }
        };

        if !self.state.is_active() {
            debug!("Job {} accepted after cancel, not polling", job_id);
            return;
        }

        info!(
            "Job {} accepted, polling every {:?} (max {} attempts)",
            job_id, self.interval, self.max_attempts
        );

        let mut record = JobRecord::new(job_id, Utc::now());

        loop {
            if !wait_interval(&self.state, self.interval).await {
                debug!("Stopped polling job {}", record.job_id());
                return;
            }

            let response = self.backend.get_job_status(record.job_id()).await;
            let attempt = record.record_attempt(Utc::now());

            if !self.state.is_active() {
                debug!(
                    "Discarding status check {} for cancelled job {}",
                    attempt,
                    record.job_id()
                );
                return;
            }

            let update = response.and_then(|r| {
                JobUpdate::try_from(r).map_err(|e| ClientError::ParseError(e.to_string()))
            });

            let update = match update {
                Ok(update) => update,
                Err(e) if attempt >= self.max_attempts => {
                    warn!(
                        "Status check {}/{} for job {} failed, giving up: {}",
                        attempt,
                        self.max_attempts,
                        record.job_id(),
                        e
                    );
                    self.terminate(Err(PollError::PollExhausted {
                        attempts: attempt,
                        last_error: e,
                    }));
                    return;
                }
                Err(e) => {
                    warn!(
                        "Status check {}/{} for job {} failed, retrying: {}",
                        attempt,
                        self.max_attempts,
                        record.job_id(),
                        e
                    );
                    continue;
                }
            };

            if let Err(e) = record.apply(update) {
                error!("Dropping out-of-order status update: {}", e);
                return;
            }

            debug!(
                "Job {} is {} after {} status check(s)",
                record.job_id(),
                record.status(),
                attempt
            );
            self.emit_update(&record);

            match record.status() {
                JobStatus::Pending if attempt >= self.max_attempts => {
                    info!(
                        "Job {} still pending after {} status checks",
                        record.job_id(),
                        attempt
                    );
                    self.terminate(Err(PollError::Timeout { attempts: attempt }));
                    return;
                }
                JobStatus::Pending => {}
                JobStatus::Completed => {
                    info!("Job {} completed", record.job_id());
                    let result = record.result().cloned().unwrap_or_default();
                    self.terminate(Ok(result));
                    return;
                }
                status @ (JobStatus::Failed | JobStatus::NoResult) => {
                    info!("Job {} ended with status {}", record.job_id(), status);
                    self.terminate(Err(PollError::BusinessFailure {
                        status,
                        message: record.message().map(str::to_string),
                    }));
                    return;
                }
            }
        }
    }

    fn emit_update(&mut self, record: &JobRecord) {
        if self.state.is_active() {
            (self.on_update)(record);
        }
    }

    fn terminate(&mut self, outcome: PollOutcome) {
        if !self.state.finish() {
            debug!("Poll cancelled before its outcome was delivered");
            return;
        }

        if let Some(on_terminal) = self.on_terminal.take() {
            on_terminal(outcome);
        }
    }
}

/// Sleeps for one interval; false if the poll was cancelled meanwhile
async fn wait_interval(state: &PollState, interval: Duration) -> bool {
    if !state.is_active() {
        return false;
    }

    tokio::select! {
        _ = tokio::time::sleep(interval) => state.is_active(),
        _ = state.cancelled() => false,
    }
}
