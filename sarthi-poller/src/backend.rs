//! Job backends
//!
//! A backend is whatever accepts a job and reports on it. The poller only
//! needs the two calls below; everything about transport and payload shape
//! stays behind this trait.

use async_trait::async_trait;
use sarthi_client::{ApiClient, ClientError};
use sarthi_core::domain::diagnosis::ScanRequest;
use sarthi_core::domain::job::{JobId, JobStatus};
use sarthi_core::dto::job::JobStatusResponse;
use serde_json::Value;

/// Backend trait for submitting and inspecting asynchronous jobs
#[async_trait]
pub trait JobBackend: Send + Sync + 'static {
    /// Payload accepted by [`JobBackend::submit_job`]
    type Payload: Send + 'static;

    /// Submits a job and returns the id the server assigned to it
    async fn submit_job(&self, payload: Self::Payload) -> Result<JobId, ClientError>;

    /// Fetches the current status of a job
    ///
    /// Any error is treated by the poller as transient.
    async fn get_job_status(&self, job_id: &JobId) -> Result<JobStatusResponse, ClientError>;
}

/// Plant disease scans, backed by the diagnostics endpoints
#[derive(Debug, Clone)]
pub struct DiagnosisBackend {
    client: ApiClient,
}

impl DiagnosisBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

#[async_trait]
impl JobBackend for DiagnosisBackend {
    type Payload = ScanRequest;

    async fn submit_job(&self, payload: ScanRequest) -> Result<JobId, ClientError> {
        let accepted = self.client.scan_plant(payload).await?;
        Ok(accepted.job_id)
    }

    async fn get_job_status(&self, job_id: &JobId) -> Result<JobStatusResponse, ClientError> {
        let log = self.client.get_diagnosis_log_raw(job_id).await?;
        status_from_log(log)
    }
}

/// Maps a raw diagnosis log onto a job status report
///
/// The whole log becomes the result of a completed scan so callers get the
/// detected disease and remedies without a second request.
fn status_from_log(log: Value) -> Result<JobStatusResponse, ClientError> {
    let status = log
        .get("processing_status")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ClientError::ParseError("diagnosis log has no processing_status".to_string())
        })?
        .to_string();

    let message = log
        .get("error_message")
        .and_then(Value::as_str)
        .map(str::to_string);

    let completed = JobStatus::parse(&status) == Some(JobStatus::Completed);

    Ok(JobStatusResponse {
        status,
        result: completed.then_some(log),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_completed_log_is_the_result() {
        let log = json!({
            "id": 7,
            "processing_status": "completed",
            "error_message": null,
            "detected_disease": {"id": 1, "disease_name": "Late Blight"}
        });

        let response = status_from_log(log.clone()).unwrap();
        assert_eq!(response.status, "completed");
        assert_eq!(response.result, Some(log));
        assert!(response.message.is_none());
    }

    #[test]
    fn test_failed_log_carries_error_message() {
        let response = status_from_log(json!({
            "id": 7,
            "processing_status": "failed",
            "error_message": "Model inference error"
        }))
        .unwrap();

        assert!(response.result.is_none());
        assert_eq!(response.message.as_deref(), Some("Model inference error"));
    }

    #[test]
    fn test_pending_and_no_disease_have_no_result() {
        for status in ["pending", "no_disease_detected"] {
            let response =
                status_from_log(json!({"id": 7, "processing_status": status})).unwrap();
            assert!(response.result.is_none());
        }
    }

    #[test]
    fn test_missing_status_is_a_parse_error() {
        let err = status_from_log(json!({"id": 7})).unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
    }
}
