//! 💀 The two errors that are NOT allowed to end the run.
//!
//! Everything fatal travels as `anyhow::Error` with a context chain. These two are
//! different: they happen per document or per batch, get counted, get logged, and the
//! worker keeps going. They are typed so the workers can tell them apart from the
//! apocalypse.

use thiserror::Error;

/// 📄 One record could not become a bulk document. The record is skipped.
#[derive(Debug, Error)]
pub enum MalformedDocument {
    /// 🐛 not JSON at all
    #[error("record is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// 🐛 JSON, but an array or a scalar where an object was needed
    #[error("record is not a JSON object, cannot extract id field '{field}'")]
    NotAnObject { field: String },

    /// 🔑 the configured id field is absent
    #[error("record has no '{field}' field to use as id")]
    MissingIdField { field: String },

    /// 🔑 the id field is null, an array or an object
    #[error("id field '{field}' holds a {kind}, expected a string, number or bool")]
    UnsupportedIdValue { field: String, kind: &'static str },
}

/// 📡 A whole bulk request failed. Its documents are lost, reported, and never retried.
#[derive(Debug, Error)]
pub enum SubmissionFailed {
    /// 🔌 never got an HTTP response (refused, reset, DNS, TLS...)
    #[error("bulk request never reached the cluster: {0}")]
    Transport(#[from] reqwest::Error),

    /// 🚫 got a response, and it was not a 2xx
    #[error("bulk request rejected with HTTP {status}: {body}")]
    Status { status: u16, body: String },
}
