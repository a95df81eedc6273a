//! Poll handles
//!
//! A handle is the caller's grip on one running poll. It shares a single
//! atomic lifecycle word with the polling task; cancellation and terminal
//! delivery race on that word and exactly one of them wins.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const ACTIVE: u8 = 0;
const CANCELLED: u8 = 1;
const FINISHED: u8 = 2;

/// Lifecycle shared between a handle and its polling task
#[derive(Debug)]
pub(crate) struct PollState {
    phase: AtomicU8,
    wake: Notify,
}

impl PollState {
    pub(crate) fn new() -> Self {
        Self {
            phase: AtomicU8::new(ACTIVE),
            wake: Notify::new(),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.phase.load(Ordering::Acquire) == ACTIVE
    }

    /// Moves to cancelled unless a terminal outcome was already committed
    pub(crate) fn cancel(&self) -> bool {
        let won = self
            .phase
            .compare_exchange(ACTIVE, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.wake.notify_one();
        }
        won
    }

    /// Commits the terminal outcome unless the poll was cancelled first
    pub(crate) fn finish(&self) -> bool {
        self.phase
            .compare_exchange(ACTIVE, FINISHED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Resolves once the poll is cancelled
    pub(crate) async fn cancelled(&self) {
        while self.phase.load(Ordering::Acquire) != CANCELLED {
            self.wake.notified().await;
        }
    }

    fn phase(&self) -> u8 {
        self.phase.load(Ordering::Acquire)
    }
}

/// Caller-held reference to a running poll
///
/// Dropping the handle does not stop polling; call [`PollHandle::cancel`].
#[derive(Debug)]
pub struct PollHandle {
    state: Arc<PollState>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub(crate) fn new(state: Arc<PollState>, task: JoinHandle<()>) -> Self {
        Self {
            state,
            task: Some(task),
        }
    }

    /// Stops polling
    ///
    /// No `on_update` or `on_terminal` call happens after this returns. A
    /// status request already on the wire is left to finish and its response
    /// is discarded. Calling this again, or after the job has ended, does
    /// nothing.
    pub fn cancel(&self) {
        if self.state.cancel() {
            debug!("Poll cancelled");
        }
    }

    /// Whether the poll can still deliver callbacks
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.phase() == CANCELLED
    }

    /// Whether a terminal outcome has been committed
    pub fn is_finished(&self) -> bool {
        self.state.phase() == FINISHED
    }

    /// Waits for the polling task to exit
    ///
    /// After a cancel this still waits for any in-flight request to return.
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Poll task ended abnormally: {}", e);
            }
        }
    }
}
