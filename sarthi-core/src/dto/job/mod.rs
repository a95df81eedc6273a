//! Job DTOs for client/backend communication

use serde::{Deserialize, Serialize};

use crate::domain::job::{JobId, JobStatus, JobUpdate, UnknownStatus};

/// Response to a successful job submission
///
/// The diagnostics backend names the id `log_id`; generic job backends use
/// `job_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAccepted {
    #[serde(alias = "log_id")]
    pub job_id: JobId,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Raw status report for a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusResponse {
    #[serde(alias = "processing_status")]
    pub status: String,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default, alias = "error_message")]
    pub message: Option<String>,
}

impl JobStatusResponse {
    pub fn status(&self) -> Result<JobStatus, UnknownStatus> {
        self.status.parse()
    }
}

impl TryFrom<JobStatusResponse> for JobUpdate {
    type Error = UnknownStatus;

    fn try_from(response: JobStatusResponse) -> Result<Self, Self::Error> {
        let status = response.status()?;
        Ok(JobUpdate {
            status,
            result: response.result,
            message: response.message,
        })
    }
}
