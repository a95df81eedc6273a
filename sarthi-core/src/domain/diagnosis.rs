//! Plant disease diagnosis types
//!
//! A diagnosis log is the server-side record behind one image scan. The
//! scan is processed asynchronously; the log's `processing_status` is what
//! the poller watches.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::job::{JobId, JobStatus};

/// Disease identified by a completed scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedDisease {
    pub id: i64,
    pub disease_name: String,
    pub description: Option<String>,
    pub symptoms: Option<String>,
    pub image_url: Option<String>,
}

/// Treatment suggested for a detected disease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remedy {
    pub id: Option<i64>,
    pub remedy_type: Option<String>,
    pub description: Option<String>,
    pub application_instructions: Option<String>,
}

/// Full diagnosis log as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisLog {
    pub id: JobId,
    pub processing_status: String,
    pub image_storage_url: Option<String>,
    pub scan_timestamp: Option<String>,
    pub confidence_score: Option<f64>,
    pub error_message: Option<String>,
    pub land_id: Option<i64>,
    pub planting_id: Option<i64>,
    #[serde(default)]
    pub detected_disease: Option<DetectedDisease>,
    #[serde(default)]
    pub remedies: Vec<Remedy>,
}

impl DiagnosisLog {
    /// Normalized processing status, `None` if the backend sent something unknown
    pub fn status(&self) -> Option<JobStatus> {
        JobStatus::parse(&self.processing_status)
    }

    /// Confidence as a whole percentage
    pub fn confidence_percent(&self) -> Option<u32> {
        self.confidence_score
            .map(|score| (score * 100.0).round().clamp(0.0, 100.0) as u32)
    }

    /// Splits the free-text symptom description into individual symptoms
    ///
    /// Symptoms are stored as one string, separated by newlines or bullets.
    pub fn symptom_list(&self) -> Vec<String> {
        self.detected_disease
            .as_ref()
            .and_then(|disease| disease.symptoms.as_deref())
            .map(|symptoms| {
                symptoms
                    .split(['\n', '•', '-'])
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Groups remedies by their type, keeping the order types first appear in
    ///
    /// Remedies without a type are filed under "Other".
    pub fn remedies_by_type(&self) -> Vec<(String, Vec<&Remedy>)> {
        let mut groups: Vec<(String, Vec<&Remedy>)> = Vec::new();

        for remedy in &self.remedies {
            let kind = remedy
                .remedy_type
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or("Other");

            match groups.iter_mut().find(|(name, _)| name == kind) {
                Some((_, list)) => list.push(remedy),
                None => groups.push((kind.to_string(), vec![remedy])),
            }
        }

        groups
    }
}

/// Image upload that starts a disease scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub image: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
    pub land_id: Option<i64>,
    pub planting_id: Option<i64>,
}

impl ScanRequest {
    /// Creates a scan request, guessing the MIME type from the file extension
    pub fn new(image: Vec<u8>, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_for(&file_name).to_string();
        Self {
            image,
            file_name,
            mime_type,
            land_id: None,
            planting_id: None,
        }
    }

    pub fn with_land(mut self, land_id: i64) -> Self {
        self.land_id = Some(land_id);
        self
    }

    pub fn with_planting(mut self, planting_id: i64) -> Self {
        self.planting_id = Some(planting_id);
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}
