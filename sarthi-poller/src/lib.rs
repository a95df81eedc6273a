//! Sarthi Poller
//!
//! Submit-then-poll client for long-running server jobs.
//!
//! Architecture:
//! - Backend: the two calls the poller needs (submit, get status), with a
//!   diagnostics implementation over [`sarthi_client::ApiClient`]
//! - Poller: one task per started job, running a fixed-interval status loop
//! - Handle: cancellation and completion for one started job
//! - Config: default interval and attempt budget
//!
//! # Example
//!
//! ```no_run
//! use sarthi_client::ApiClient;
//! use sarthi_core::domain::diagnosis::ScanRequest;
//! use sarthi_poller::{AsyncJobPoller, DiagnosisBackend, PollOptions};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ApiClient::new("http://localhost:5000/api/v1").with_bearer_token("secret");
//! let poller = AsyncJobPoller::new(DiagnosisBackend::new(client));
//!
//! let image = std::fs::read("leaf.jpg")?;
//! let mut handle = poller.start(
//!     ScanRequest::new(image, "leaf.jpg"),
//!     PollOptions::new()
//!         .on_update(|record| println!("attempt {}: {}", record.attempt(), record.status()))
//!         .on_terminal(|outcome| println!("done: {:?}", outcome)),
//! );
//! handle.join().await;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
mod handle;
pub mod poller;

pub use backend::{DiagnosisBackend, JobBackend};
pub use config::PollerConfig;
pub use error::{PollError, PollOutcome};
pub use handle::PollHandle;
pub use poller::{AsyncJobPoller, PollOptions};
