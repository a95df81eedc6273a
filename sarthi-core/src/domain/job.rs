//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Opaque job identifier assigned by the server at submission time
///
/// Backends encode ids either as strings or as integers (the diagnostics
/// service hands out integer log ids). Both decode into the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for JobId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => JobId(text),
            RawId::Signed(n) => JobId(n.to_string()),
            RawId::Unsigned(n) => JobId(n.to_string()),
        })
    }
}

/// Job processing status as seen by the client
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[serde(alias = "processing", alias = "queued")]
    Pending,
    Completed,
    Failed,
    #[serde(alias = "no_disease_detected")]
    NoResult,
}

impl JobStatus {
    /// Normalizes a wire status string
    ///
    /// Returns `None` for values the client does not recognize.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" | "processing" | "queued" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "no_result" | "no_disease_detected" => Some(Self::NoResult),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::NoResult => "no_result",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string the client does not know how to interpret
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown job status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Normalized status report for one poll of a job
#[derive(Debug, Clone, PartialEq)]
pub struct JobUpdate {
    pub status: JobStatus,
    pub result: Option<serde_json::Value>,
    pub message: Option<String>,
}

impl JobUpdate {
    pub fn pending() -> Self {
        Self {
            status: JobStatus::Pending,
            result: None,
            message: None,
        }
    }

    pub fn completed(result: serde_json::Value) -> Self {
        Self {
            status: JobStatus::Completed,
            result: Some(result),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            result: None,
            message: Some(message.into()),
        }
    }

    pub fn no_result() -> Self {
        Self {
            status: JobStatus::NoResult,
            result: None,
            message: None,
        }
    }
}

/// Rejected attempt to move a job that has already reached a terminal state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("job {job_id} is already {current}, cannot move to {requested}")]
pub struct TransitionError {
    pub job_id: JobId,
    pub current: JobStatus,
    pub requested: JobStatus,
}

/// Client-side record of one submitted job
///
/// Created when the server accepts a submission and mutated only by the
/// poll step. Status moves forward only, and `result` is set exactly when
/// the status is `Completed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    job_id: JobId,
    status: JobStatus,
    result: Option<serde_json::Value>,
    message: Option<String>,
    submitted_at: DateTime<Utc>,
    last_polled_at: Option<DateTime<Utc>>,
    attempt: u32,
}

impl JobRecord {
    /// Creates a pending record for a freshly accepted job
    pub fn new(job_id: JobId, submitted_at: DateTime<Utc>) -> Self {
        Self {
            job_id,
            status: JobStatus::Pending,
            result: None,
            message: None,
            submitted_at,
            last_polled_at: None,
            attempt: 0,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn result(&self) -> Option<&serde_json::Value> {
        self.result.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn last_polled_at(&self) -> Option<DateTime<Utc>> {
        self.last_polled_at
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Time since submission, measured against `now`
    pub fn elapsed(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.submitted_at
    }

    /// Counts one poll attempt, successful or not
    ///
    /// Returns the new attempt number.
    pub fn record_attempt(&mut self, at: DateTime<Utc>) -> u32 {
        self.attempt = self.attempt.saturating_add(1);
        self.last_polled_at = Some(at);
        self.attempt
    }

    /// Applies a status report from the server
    ///
    /// A completed update without a payload stores JSON `null` so that the
    /// result is always present for completed jobs.
    pub fn apply(&mut self, update: JobUpdate) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError {
                job_id: self.job_id.clone(),
                current: self.status,
                requested: update.status,
            });
        }

        self.status = update.status;
        self.result = match update.status {
            JobStatus::Completed => Some(update.result.unwrap_or(serde_json::Value::Null)),
            _ => None,
        };
        self.message = update.message;

        Ok(())
    }
}
