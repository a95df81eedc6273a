//! Diagnosis DTOs
//!
//! Query and listing shapes for the diagnosis log endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::job::JobId;

/// Filters for listing diagnosis logs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosisLogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub land_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// One row of the diagnosis log listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisLogSummary {
    pub log_id: JobId,
    pub scan_timestamp: Option<String>,
    pub processing_status: String,
    pub image_storage_url: Option<String>,
    pub land_id: Option<i64>,
    pub land_name: Option<String>,
    pub detected_disease_id: Option<i64>,
    pub detected_disease_name: Option<String>,
}

/// A page of diagnosis logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisLogPage {
    pub logs: Vec<DiagnosisLogSummary>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_skips_unset_filters() {
        let query = DiagnosisLogQuery {
            limit: Some(10),
            status: Some("pending".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"limit": 10, "status": "pending"})
        );
    }

    #[test]
    fn test_page_deserializes() {
        let page: DiagnosisLogPage = serde_json::from_value(json!({
            "logs": [{
                "log_id": 4,
                "scan_timestamp": "2025-04-18 10:22:01",
                "processing_status": "no_disease_detected",
                "image_storage_url": "dummy_storage/1/leaf.jpg",
                "land_id": null,
                "land_name": null,
                "detected_disease_id": null,
                "detected_disease_name": null
            }],
            "total": 1
        }))
        .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.logs[0].log_id, JobId::from("4"));
    }
}
