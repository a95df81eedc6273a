//! Scan command handler
//!
//! Uploads a plant image, then follows the diagnosis until it settles.
//! Progress is rendered from the poller's callbacks; Ctrl-C cancels the poll.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use colored::*;
use sarthi_core::domain::diagnosis::{DiagnosisLog, ScanRequest};
use sarthi_core::domain::job::{JobRecord, JobStatus};
use sarthi_poller::{AsyncJobPoller, DiagnosisBackend, PollError, PollOptions, PollOutcome, PollerConfig};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;

use super::diagnosis::{colorize_status, print_diagnosis_details};
use crate::config::Config;

/// Arguments for `sarthi scan`
#[derive(Args)]
pub struct ScanArgs {
    /// Path to the plant image (JPEG, PNG or WebP)
    pub image: PathBuf,

    /// Land plot the image was taken on
    #[arg(long)]
    pub land_id: Option<i64>,

    /// Planting the image belongs to
    #[arg(long)]
    pub planting_id: Option<i64>,

    /// Milliseconds between status checks (default: SARTHI_POLL_INTERVAL_MS or 5000)
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Status checks before giving up (default: SARTHI_MAX_ATTEMPTS or 60)
    #[arg(long)]
    pub max_attempts: Option<u32>,
}

/// Handle `sarthi scan`
pub async fn handle_scan_command(args: ScanArgs, config: &Config) -> Result<()> {
    let image = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("Failed to read image {}", args.image.display()))?;

    let file_name = args
        .image
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("scan.jpg")
        .to_string();

    let mut request = ScanRequest::new(image, file_name);
    if let Some(land_id) = args.land_id {
        request = request.with_land(land_id);
    }
    if let Some(planting_id) = args.planting_id {
        request = request.with_planting(planting_id);
    }

    let mut poller_config = PollerConfig::from_env().context("Invalid poller configuration")?;
    if let Some(interval_ms) = args.interval_ms {
        poller_config.interval = Duration::from_millis(interval_ms);
    }
    if let Some(max_attempts) = args.max_attempts {
        poller_config.max_attempts = max_attempts;
    }
    poller_config.validate()?;

    debug!(
        "Scanning {} with {:?}",
        args.image.display(),
        poller_config
    );

    let max_attempts = poller_config.max_attempts;
    let poller = AsyncJobPoller::with_config(DiagnosisBackend::new(config.client()), poller_config);

    let (outcome_tx, outcome_rx) = oneshot::channel::<PollOutcome>();
    let options = PollOptions::new()
        .on_update(move |record| print_progress(record, max_attempts))
        .on_terminal(move |outcome| {
            let _ = outcome_tx.send(outcome);
        });

    println!("{}", "Uploading image for analysis...".bold());
    let mut handle = poller.start(request, options);

    tokio::select! {
        outcome = outcome_rx => {
            handle.join().await;
            let outcome = outcome.context("Poller stopped without reporting an outcome")?;
            render_outcome(outcome)
        }
        _ = tokio::signal::ctrl_c() => {
            handle.cancel();
            println!();
            println!("{}", "Scan cancelled; the server may still finish the analysis.".yellow());
            Ok(())
        }
    }
}

/// Print one progress line per status check
fn print_progress(record: &JobRecord, max_attempts: u32) {
    let elapsed = record.elapsed(Utc::now()).num_seconds();

    match record.status() {
        JobStatus::Pending => println!(
            "  {} Analyzing image... check {}/{} ({}s elapsed)",
            "⏳".yellow(),
            record.attempt(),
            max_attempts,
            elapsed
        ),
        status => println!(
            "  {} Diagnosis {} is {} ({}s elapsed)",
            "▸".cyan(),
            record.job_id().to_string().dimmed(),
            colorize_status(status.as_str()),
            elapsed
        ),
    }
}

/// Render the terminal outcome of a scan
fn render_outcome(outcome: PollOutcome) -> Result<()> {
    println!();

    match outcome {
        Ok(result) => {
            match serde_json::from_value::<DiagnosisLog>(result.clone()) {
                Ok(log) => print_diagnosis_details(&log),
                Err(e) => {
                    debug!("Result is not a diagnosis log: {}", e);
                    println!("{}", serde_json::to_string_pretty(&result)?);
                }
            }
            Ok(())
        }
        Err(PollError::BusinessFailure {
            status: JobStatus::NoResult,
            ..
        }) => {
            println!("{}", "No disease detected in the image.".green());
            Ok(())
        }
        Err(e) => {
            if e.is_retryable() {
                println!("{}", "The scan did not finish. You can try again.".yellow());
            }
            Err(e).context("Scan failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sarthi_client::ClientError;
    use serde_json::json;

    #[test]
    fn test_no_result_is_not_an_error() {
        let outcome = Err(PollError::BusinessFailure {
            status: JobStatus::NoResult,
            message: None,
        });
        assert!(render_outcome(outcome).is_ok());
    }

    #[test]
    fn test_failures_are_errors() {
        let failed = Err(PollError::BusinessFailure {
            status: JobStatus::Failed,
            message: Some("Model inference error".to_string()),
        });
        assert!(render_outcome(failed).is_err());

        let timeout = Err(PollError::Timeout { attempts: 60 });
        assert!(render_outcome(timeout).is_err());

        let rejected = Err(PollError::SubmissionFailed(ClientError::api_error(
            403,
            "Access denied to the specified land plot.",
        )));
        assert!(render_outcome(rejected).is_err());
    }

    #[test]
    fn test_completed_result_renders() {
        let outcome = Ok(json!({
            "id": 7,
            "processing_status": "completed",
            "confidence_score": 0.91,
            "detected_disease": {
                "id": 1,
                "disease_name": "Late Blight",
                "description": null,
                "symptoms": null,
                "image_url": null
            },
            "remedies": []
        }));
        assert!(render_outcome(outcome).is_ok());

        // Unknown result shapes fall back to raw JSON
        assert!(render_outcome(Ok(json!({"disease": "blight"}))).is_ok());
    }
}
