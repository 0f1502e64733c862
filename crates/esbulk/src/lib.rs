//! 🚀 esbulk — NDJSON in, bulk requests out, N workers in between.
//!
//! The public surface is small on purpose: build an [`AppConfig`] (or let
//! [`load_config`] layer one together), hand it to [`run`], read the
//! [`RunSummary`] that comes back. Everything else is the supervisor's business.

pub mod app_config;
mod backends;
mod collectors;
mod common;
mod errors;
mod progress;
mod supervisors;
mod transforms;

use anyhow::{Context, Result};

pub use app_config::{AppConfig, Credentials, load_config};
pub use common::{RunSummary, WorkerReport};
pub use errors::{MalformedDocument, SubmissionFailed};

use crate::supervisors::Supervisor;

/// 🏁 Validate, prepare the index, load every record, restore the index.
///
/// `Ok` means the input was read to the end and teardown was attempted.
/// Documents that were malformed, rejected or lost are in the summary, not here.
pub async fn run(app_config: AppConfig) -> Result<RunSummary> {
    app_config
        .validate()
        .context("💀 the configuration does not describe a load we can run")?;
    Supervisor::new(app_config)?.run().await
}
