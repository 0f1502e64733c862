//! 🎬 *[camera pans across a dimly lit server room]*
//! 🎬 *[dramatic orchestral music swells]*
//! 🎬 "In a world where workers toil endlessly..."
//! 🎬 "One supervisor dared to bracket them all."
//! 🎬 *[record scratch]* 🦆
//!
//! 📦 The Supervisor — part middle manager, part stage crew. It sets the stage
//! before the workers arrive and sweeps it after they leave:
//!
//! ```text
//!   open input → purge? → create if absent → mapping? → refresh -1
//!     → worker pool →
//!   refresh 1s → flush
//! ```
//!
//! Everything before the pool is fatal. Everything after the pool is best-effort
//! and only logged. The pool's own verdict is what the run returns.
//!
//! ⚠️ DO NOT MAKE THE WORKERS PUB. EVER.
//! 🔒 Like Fight Club, but for async tasks. First rule: you don't pub the workers.

mod workers;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::app_config::AppConfig;
use crate::backends::elasticsearch::IndexCreation;
use crate::backends::{ElasticsearchClient, ElasticsearchSink, FileSource, SinkBackend};
use crate::common::RunSummary;

// -- ⏱️ refresh off for the load, back to the cluster default afterwards
const REFRESH_DISABLED: &str = "-1";
const REFRESH_RESTORED: &str = "1s";

/// 📦 Owns the config and the one HTTP client everybody clones.
#[derive(Debug)]
pub(crate) struct Supervisor {
    app_config: AppConfig,
    client: ElasticsearchClient,
}

impl Supervisor {
    pub(crate) fn new(app_config: AppConfig) -> Result<Self> {
        let client = ElasticsearchClient::new(&app_config.server, app_config.credentials()?)?;
        Ok(Self { app_config, client })
    }

    /// 🚀 The whole show, start to finish.
    pub(crate) async fn run(self) -> Result<RunSummary> {
        let input = self
            .app_config
            .input
            .as_deref()
            .context("💀 no input file given")?;
        // -- 📂 open first: a typo in the path should not cost anyone their index
        let source = FileSource::open(input, self.app_config.gzip, self.app_config.verbose)?;

        self.prepare_index().await?;

        let sink = SinkBackend::Elasticsearch(ElasticsearchSink::new(self.client.clone()));
        let outcome = workers::run_pool(source, sink, &self.app_config).await;

        self.teardown().await;

        outcome
    }

    /// 🏗️ Steps 1–4. Any failure here aborts before a single document is sent.
    async fn prepare_index(&self) -> Result<()> {
        let index = self.app_config.index.as_str();

        if self.app_config.purge {
            self.client
                .delete_index(index)
                .await
                .context("💀 purge step failed")?;
        }

        let creation = self
            .client
            .create_index_if_absent(index)
            .await
            .context("💀 create-index step failed")?;
        match creation {
            IndexCreation::Created => info!("🎯 index '{}' created", index),
            IndexCreation::AlreadyExisted => info!("🎯 index '{}' already there, loading into it", index),
        }

        if let Some(mapping) = self.app_config.mapping.as_deref() {
            let body = load_mapping(mapping).await?;
            self.client
                .put_mapping(index, &self.app_config.doc_type, body)
                .await
                .context("💀 mapping step failed")?;
        }

        self.client
            .set_refresh_interval(index, REFRESH_DISABLED)
            .await
            .context("💀 disabling refresh failed")?;
        Ok(())
    }

    /// 🧹 Steps 6a and 6b. Logged, never escalated.
    async fn teardown(&self) {
        let index = self.app_config.index.as_str();
        match self.client.set_refresh_interval(index, REFRESH_RESTORED).await {
            Ok(status) => info!("⏱️ refresh_interval restored to {} ({})", REFRESH_RESTORED, status),
            Err(err) => warn!("⚠️ could not restore refresh_interval on '{}': {:#}", index, err),
        }
        match self.client.flush(index).await {
            Ok(status) => info!("💾 flushed '{}' ({})", index, status),
            Err(err) => warn!("⚠️ could not flush '{}': {:#}", index, err),
        }
    }
}

/// 📐 A mapping is a path if that file exists, otherwise it is the JSON itself.
/// Either way it has to parse as JSON before it goes anywhere near the cluster.
async fn load_mapping(mapping: &str) -> Result<String> {
    let path = Path::new(mapping);
    let body = if tokio::fs::try_exists(path).await.unwrap_or(false) {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("💀 could not read mapping file '{}'", path.display()))?
    } else {
        mapping.to_string()
    };
    serde_json::from_str::<serde_json::Value>(&body)
        .context("💀 mapping is neither an existing file nor valid JSON")?;
    Ok(body)
}
