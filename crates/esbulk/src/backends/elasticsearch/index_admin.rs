//! 🏗️ Index admin — the calls that bracket a bulk load.
//!
//! delete → exists? → create → mapping → refresh off ... load ... → refresh on → flush
//!
//! Every call here is a single blocking HTTP round trip with auth. None of them retry.
//! Whether an error is fatal is the supervisor's call, not ours.

use anyhow::{Context, Result, bail};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde_json::json;
use tracing::{debug, info};

use super::{ElasticsearchClient, expect_success};

/// 🎯 What `create_index_if_absent` actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IndexCreation {
    Created,
    AlreadyExisted,
}

// -- 🏷️ the exception names a concurrent creator gets back, new and old spellings
const ALREADY_EXISTS_MARKERS: [&str; 2] = [
    "resource_already_exists_exception",
    "index_already_exists_exception",
];

impl ElasticsearchClient {
    /// 🔍 `GET /{index}`: 200 → true, 404 → false, anything else → error.
    pub(crate) async fn index_exists(&self, index: &str) -> Result<bool> {
        let response = self
            .request(Method::GET, &format!("/{index}"))
            .send()
            .await
            .with_context(|| {
                format!("💀 Could not reach {} to check whether index '{index}' exists", self.server())
            })?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => {
                expect_success(response, &format!("checking index '{index}'")).await?;
                Ok(true)
            }
        }
    }

    /// 🏗️ Create the index unless it is already there. Running this twice is harmless.
    pub(crate) async fn create_index_if_absent(&self, index: &str) -> Result<IndexCreation> {
        if self.index_exists(index).await? {
            debug!("✅ index '{}' already exists, leaving it alone", index);
            return Ok(IndexCreation::AlreadyExisted);
        }

        let response = self
            .request(Method::PUT, &format!("/{index}"))
            .send()
            .await
            .with_context(|| format!("💀 Could not reach {} to create index '{index}'", self.server()))?;

        let status = response.status();
        if status.is_success() {
            info!("🏗️ created index '{}'", index);
            return Ok(IndexCreation::Created);
        }
        let body = response.text().await.unwrap_or_default();
        // -- 🏁 somebody else created it between our GET and our PUT. Fine by us.
        if status == StatusCode::BAD_REQUEST
            && ALREADY_EXISTS_MARKERS
                .iter()
                .any(|marker| body.contains(marker))
        {
            debug!("✅ index '{}' was created by someone else in the meantime", index);
            return Ok(IndexCreation::AlreadyExisted);
        }
        bail!("💀 creating index '{index}' failed: Elasticsearch said '{status}'. The body of the response read: '{body}'")
    }

    /// 🗑️ `DELETE /{index}`. A missing index is nothing to purge, not an error.
    pub(crate) async fn delete_index(&self, index: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, &format!("/{index}"))
            .send()
            .await
            .with_context(|| format!("💀 Could not reach {} to delete index '{index}'", self.server()))?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("🗑️ index '{}' did not exist, nothing to purge", index);
            return Ok(());
        }
        expect_success(response, &format!("deleting index '{index}'")).await?;
        info!("🗑️ purged index '{}'", index);
        Ok(())
    }

    /// 📐 `PUT /{index}/_mapping/{doc_type}` with the mapping JSON as-is.
    pub(crate) async fn put_mapping(&self, index: &str, doc_type: &str, mapping: String) -> Result<()> {
        let response = self
            .request(Method::PUT, &format!("/{index}/_mapping/{doc_type}"))
            .header(CONTENT_TYPE, "application/json")
            .body(mapping)
            .send()
            .await
            .with_context(|| format!("💀 Could not reach {} to apply the mapping", self.server()))?;
        expect_success(response, &format!("applying mapping to '{index}'")).await?;
        info!("📐 applied mapping to '{}/{}'", index, doc_type);
        Ok(())
    }

    /// ⏱️ `PUT /{index}/_settings` with `{"index": {"refresh_interval": value}}`.
    pub(crate) async fn set_refresh_interval(&self, index: &str, value: &str) -> Result<StatusCode> {
        let body = json!({ "index": { "refresh_interval": value } }).to_string();
        let response = self
            .request(Method::PUT, &format!("/{index}/_settings"))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .with_context(|| {
                format!("💀 Could not reach {} to set refresh_interval={value}", self.server())
            })?;
        let response =
            expect_success(response, &format!("setting index.refresh_interval to {value}")).await?;
        Ok(response.status())
    }

    /// 💾 `POST /{index}/_flush`
    pub(crate) async fn flush(&self, index: &str) -> Result<StatusCode> {
        let response = self
            .request(Method::POST, &format!("/{index}/_flush"))
            .send()
            .await
            .with_context(|| format!("💀 Could not reach {} to flush '{index}'", self.server()))?;
        let response = expect_success(response, &format!("flushing '{index}'")).await?;
        Ok(response.status())
    }
}
