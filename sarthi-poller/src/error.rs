//! Terminal errors reported by the poller

use sarthi_client::ClientError;
use sarthi_core::domain::job::JobStatus;
use thiserror::Error;

/// Outcome delivered to `on_terminal`: the completed job's result, or why it ended
pub type PollOutcome = std::result::Result<serde_json::Value, PollError>;

/// Ways a polled job can end without a result
///
/// Transient transport errors during polling never show up here on their
/// own; they are retried and only surface as `PollExhausted` once the
/// attempt budget is spent.
#[derive(Debug, Error)]
pub enum PollError {
    /// The job could not be submitted; nothing was polled
    #[error("job submission failed: {0}")]
    SubmissionFailed(#[source] ClientError),

    /// The job was still pending after the last allowed status check
    #[error("job still pending after {attempts} status checks")]
    Timeout { attempts: u32 },

    /// The last allowed status check failed at the transport layer
    #[error("status checks exhausted after {attempts} attempts: {last_error}")]
    PollExhausted {
        attempts: u32,
        #[source]
        last_error: ClientError,
    },

    /// The server finished the job without a usable result
    #[error("job ended with status {status}{}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    BusinessFailure {
        status: JobStatus,
        message: Option<String>,
    },
}

impl PollError {
    /// Whether starting the job again could plausibly succeed
    ///
    /// Business failures are the server's final word on this input.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::BusinessFailure { .. })
    }
}
