//! Diagnostics API endpoints

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use sarthi_core::domain::diagnosis::{DiagnosisLog, ScanRequest};
use sarthi_core::domain::job::JobId;
use sarthi_core::dto::diagnosis::{DiagnosisLogPage, DiagnosisLogQuery};
use sarthi_core::dto::job::JobAccepted;
use tracing::debug;

use crate::ApiClient;
use crate::error::{ClientError, Result};

impl ApiClient {
    // =============================================================================
    // Disease Scans
    // =============================================================================

    /// Upload a plant image for disease analysis
    ///
    /// The backend queues the analysis and answers immediately with the id
    /// of the diagnosis log to poll.
    ///
    /// # Arguments
    /// * `req` - The image and optional land/planting association
    ///
    /// # Returns
    /// The accepted job, carrying the diagnosis log id
    pub async fn scan_plant(&self, req: ScanRequest) -> Result<JobAccepted> {
        if req.image.is_empty() {
            return Err(ClientError::InvalidRequest("image is empty".to_string()));
        }

        debug!(
            "Uploading {} ({} bytes) for diagnosis",
            req.file_name,
            req.image.len()
        );

        let image = Part::bytes(req.image)
            .file_name(req.file_name)
            .mime_str(&req.mime_type)
            .map_err(|e| ClientError::InvalidRequest(format!("Invalid MIME type: {}", e)))?;

        let mut form = Form::new().part("image", image);
        if let Some(land_id) = req.land_id {
            form = form.text("land_id", land_id.to_string());
        }
        if let Some(planting_id) = req.planting_id {
            form = form.text("planting_id", planting_id.to_string());
        }

        let response = self
            .request(Method::POST, "/diagnostics/scan-plant")
            .multipart(form)
            .send()
            .await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Diagnosis Logs
    // =============================================================================

    /// Get a diagnosis log by ID
    ///
    /// # Arguments
    /// * `log_id` - The diagnosis log id returned by [`ApiClient::scan_plant`]
    pub async fn get_diagnosis_log(&self, log_id: &JobId) -> Result<DiagnosisLog> {
        let response = self
            .request(Method::GET, &format!("/diagnostics/logs/{}", log_id))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a diagnosis log as untyped JSON
    ///
    /// Used where the log is forwarded as an opaque result.
    pub async fn get_diagnosis_log_raw(&self, log_id: &JobId) -> Result<serde_json::Value> {
        let response = self
            .request(Method::GET, &format!("/diagnostics/logs/{}", log_id))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List diagnosis logs, newest first
    ///
    /// # Arguments
    /// * `query` - Paging and filter options; unset fields use server defaults
    pub async fn list_diagnosis_logs(&self, query: &DiagnosisLogQuery) -> Result<DiagnosisLogPage> {
        let response = self
            .request(Method::GET, "/diagnostics/logs")
            .query(query)
            .send()
            .await?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn log_body(status: &str) -> String {
        json!({
            "id": 7,
            "processing_status": status,
            "image_storage_url": "dummy_storage/1/leaf.jpg",
            "scan_timestamp": "2025-04-18 10:22:01",
            "confidence_score": null,
            "error_message": null,
            "land_id": null,
            "planting_id": null,
            "detected_disease": null,
            "remedies": []
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_scan_plant_uploads_multipart() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/diagnostics/scan-plant")
            .match_header("authorization", "Bearer t0k3n")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="image"; filename="leaf.jpg""#.to_string()),
                Matcher::Regex(r#"name="land_id""#.to_string()),
            ]))
            .with_status(202)
            .with_header("content-type", "application/json")
            .with_body(r#"{"log_id": 12, "status": "pending", "message": "Image received, analysis queued."}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url()).with_bearer_token("t0k3n");
        let accepted = client
            .scan_plant(ScanRequest::new(b"fake-jpeg".to_vec(), "leaf.jpg").with_land(3))
            .await
            .unwrap();

        assert_eq!(accepted.job_id, JobId::from("12"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_scan_plant_rejects_empty_image() {
        let client = ApiClient::new("http://localhost:1");
        let err = client
            .scan_plant(ScanRequest::new(Vec::new(), "leaf.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_get_diagnosis_log() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/diagnostics/logs/7")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(log_body("pending"))
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let log = client.get_diagnosis_log(&JobId::from("7")).await.unwrap();

        assert_eq!(log.processing_status, "pending");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_diagnosis_log_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/diagnostics/logs/99")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"description": "Diagnosis log not found or access denied."}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client
            .get_diagnosis_log(&JobId::from("99"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("Diagnosis log not found"));
    }

    #[tokio::test]
    async fn test_get_diagnosis_log_bad_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/diagnostics/logs/7")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client
            .get_diagnosis_log_raw(&JobId::from("7"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_list_diagnosis_logs_sends_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/diagnostics/logs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".to_string(), "5".to_string()),
                Matcher::UrlEncoded("status".to_string(), "completed".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"logs": [], "total": 0}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let page = client
            .list_diagnosis_logs(&DiagnosisLogQuery {
                limit: Some(5),
                status: Some("completed".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 0);
        assert!(page.logs.is_empty());
        mock.assert_async().await;
    }
}
