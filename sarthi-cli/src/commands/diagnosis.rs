//! Diagnosis command handlers
//!
//! Fetching and listing diagnosis logs, plus the renderers the scan command
//! reuses for its final result.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use sarthi_client::ApiClient;
use sarthi_core::domain::diagnosis::DiagnosisLog;
use sarthi_core::domain::job::{JobId, JobStatus};
use sarthi_core::dto::diagnosis::{DiagnosisLogQuery, DiagnosisLogSummary};

use crate::config::Config;

/// Diagnosis subcommands
#[derive(Subcommand)]
pub enum DiagnosisCommands {
    /// Show one diagnosis log
    Get {
        /// Diagnosis log ID
        id: String,

        /// Print the raw JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// List diagnosis logs, newest first
    List {
        /// Maximum number of logs to return (server caps at 100)
        #[arg(long)]
        limit: Option<u32>,

        /// Number of logs to skip
        #[arg(long)]
        offset: Option<u32>,

        /// Only logs for this land plot
        #[arg(long)]
        land_id: Option<i64>,

        /// Only logs with this processing status
        #[arg(long)]
        status: Option<String>,
    },
}

/// Handle diagnosis commands
pub async fn handle_diagnosis_command(command: DiagnosisCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        DiagnosisCommands::Get { id, json } => get_diagnosis(&client, &id, json).await,
        DiagnosisCommands::List {
            limit,
            offset,
            land_id,
            status,
        } => {
            let query = DiagnosisLogQuery {
                limit,
                offset,
                land_id,
                status,
            };
            list_diagnoses(&client, &query).await
        }
    }
}

/// Get and display a single diagnosis log
async fn get_diagnosis(client: &ApiClient, id: &str, json: bool) -> Result<()> {
    let log_id = JobId::from(id);

    if json {
        let raw = client
            .get_diagnosis_log_raw(&log_id)
            .await
            .with_context(|| format!("Failed to fetch diagnosis {}", log_id))?;
        println!("{}", serde_json::to_string_pretty(&raw)?);
        return Ok(());
    }

    let log = client
        .get_diagnosis_log(&log_id)
        .await
        .with_context(|| format!("Failed to fetch diagnosis {}", log_id))?;

    print_diagnosis_details(&log);

    Ok(())
}

/// List diagnosis logs
async fn list_diagnoses(client: &ApiClient, query: &DiagnosisLogQuery) -> Result<()> {
    let page = client
        .list_diagnosis_logs(query)
        .await
        .context("Failed to list diagnoses")?;

    if page.logs.is_empty() {
        println!("{}", "No diagnoses found.".yellow());
    } else {
        println!(
            "{}",
            format!("Showing {} of {} diagnosis log(s):", page.logs.len(), page.total).bold()
        );
        println!();
        for log in &page.logs {
            print_diagnosis_summary(log);
        }
    }

    Ok(())
}

/// Print one row of the diagnosis listing
fn print_diagnosis_summary(log: &DiagnosisLogSummary) {
    println!("  {} Diagnosis {}", "▸".cyan(), log.log_id.to_string().dimmed());
    println!("    Status:   {}", colorize_status(&log.processing_status));
    if let Some(disease) = &log.detected_disease_name {
        println!("    Disease:  {}", disease);
    }
    if let Some(land) = &log.land_name {
        println!("    Land:     {}", land.dimmed());
    }
    if let Some(scanned) = &log.scan_timestamp {
        println!("    Scanned:  {}", scanned.dimmed());
    }
    println!();
}

/// Print detailed diagnosis information
pub(crate) fn print_diagnosis_details(log: &DiagnosisLog) {
    println!("{}", "Diagnosis Details:".bold());
    println!("  ID:          {}", log.id.to_string().cyan());
    println!("  Status:      {}", colorize_status(&log.processing_status));
    if let Some(scanned) = &log.scan_timestamp {
        println!("  Scanned:     {}", scanned);
    }
    if let Some(url) = &log.image_storage_url {
        println!("  Image:       {}", url.dimmed());
    }

    match log.status() {
        Some(JobStatus::Pending) => {
            println!("\n{}", "Analysis still in progress...".yellow());
            return;
        }
        Some(JobStatus::Failed) => {
            println!("\n{}", "Analysis failed. Please try again.".red());
            if let Some(error) = &log.error_message {
                println!("{}", error.red());
            }
            return;
        }
        Some(JobStatus::NoResult) => {
            println!("\n{}", "No disease detected in the image.".green());
            return;
        }
        Some(JobStatus::Completed) | None => {}
    }

    let Some(disease) = &log.detected_disease else {
        println!(
            "\n{}",
            "Analysis complete, but no specific disease was identified.".yellow()
        );
        return;
    };

    println!("\n{}", disease.disease_name.bold());
    if let Some(confidence) = log.confidence_percent() {
        println!("  Confidence:  {}%", confidence);
    }

    println!("\n{}", "Description:".bold());
    println!(
        "  {}",
        disease
            .description
            .as_deref()
            .unwrap_or("No description available.")
    );

    println!("\n{}", "Symptoms:".bold());
    let symptoms = log.symptom_list();
    if symptoms.is_empty() {
        println!("  No specific symptoms listed.");
    }
    for symptom in symptoms {
        println!("  • {}", symptom);
    }

    println!("\n{}", "Recommended Remedies:".bold());
    let groups = log.remedies_by_type();
    if groups.is_empty() {
        println!("  No remedies on record.");
    }
    for (kind, remedies) in groups {
        println!("  {}", kind.cyan());
        for remedy in remedies {
            println!(
                "    • {}",
                remedy.description.as_deref().unwrap_or("(no description)")
            );
            if let Some(instructions) = &remedy.application_instructions {
                println!("      {}", instructions.dimmed());
            }
        }
    }
}

/// Colorize a processing status for display
pub(crate) fn colorize_status(status: &str) -> ColoredString {
    match JobStatus::parse(status) {
        Some(JobStatus::Pending) => status.yellow(),
        Some(JobStatus::Completed) => status.green(),
        Some(JobStatus::Failed) => status.red(),
        Some(JobStatus::NoResult) => status.cyan(),
        None => status.dimmed(),
    }
}
