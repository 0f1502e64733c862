//! # 📡 THE ELASTICSEARCH BACKEND
//!
//! 🎬 COLD OPEN — INT. SERVER ROOM — 3:47 AM
//!
//! Forty million lines of NDJSON. One index. Refresh disabled, fingers crossed.
//! "It'll be fast," they said. "Elasticsearch scales horizontally," someone lied,
//! once, at a conference.
//!
//! 🚀 This module owns the one shared HTTP client and the base URL. Two submodules
//! hang off it:
//! - [`elasticsearch_sink`]: `POST /_bulk`, and reading the verdict
//! - [`index_admin`]: the lifecycle calls (delete, create, mapping, settings, flush)
//!
//! 🔒 Basic auth, when configured, rides along on every single request.
//!
//! ⚠️ No request timeout is set. A cluster that never answers hangs its caller forever.
//! TODO: expose an optional per-request deadline in `AppConfig` and pass it to the builder.
//!
//! 🦆 (mandatory duck, no context provided, none shall be requested)

mod elasticsearch_sink;
mod index_admin;

pub(crate) use elasticsearch_sink::ElasticsearchSink;
pub(crate) use index_admin::IndexCreation;

use anyhow::{Context, Result, bail};
use reqwest::{Method, RequestBuilder, Response};

use crate::app_config::Credentials;

/// 📡 The HTTP client plus where to point it. Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub(crate) struct ElasticsearchClient {
    http: reqwest::Client,
    // -- no trailing slash, ever. `https://host//idx` is a different URL and a different bug.
    server: String,
    credentials: Option<Credentials>,
}

impl ElasticsearchClient {
    pub(crate) fn new(server: &str, credentials: Option<Credentials>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("💀 The HTTP client refused to be born. Probably the TLS stack. Either way: tragic.")?;
        Ok(Self {
            http,
            server: server.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// 🔧 A request to `{server}{path}` with auth attached. `path` starts with `/`.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, format!("{}{}", self.server, path));
        match &self.credentials {
            Some(credentials) => {
                request.basic_auth(&credentials.username, Some(&credentials.password))
            }
            None => request,
        }
    }

    pub(crate) fn server(&self) -> &str {
        &self.server
    }
}

/// 💀 Turn a non-2xx into an error that names the step and quotes the cluster.
async fn expect_success(response: Response, step: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    bail!("💀 {step} failed: Elasticsearch said '{status}'. The body of the response read: '{body}'")
}
