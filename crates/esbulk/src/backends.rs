//! 🔌 Backends — where the real I/O happens.
//!
//! 🚰 The file source pours the records in, the sink slurps the bulk bodies up.
//! And in between, we panic! (kidding, we use anyhow)
//!
//! 🎭 This module is the casting agency. Need to ship a bulk body to a cluster?
//! Need to ship it into a Vec so a test can squint at it? We've got a backend for that.
//!
//! 🦆 The duck is here because every file must have one. This is law. Do not question the duck.

use async_trait::async_trait;

use crate::common::SubmissionResult;
use crate::errors::SubmissionFailed;

pub(crate) mod elasticsearch;
pub(crate) mod file_source;
#[cfg(test)]
pub(crate) mod in_mem;

pub(crate) use elasticsearch::{ElasticsearchClient, ElasticsearchSink};
pub(crate) use file_source::FileSource;

/// 🕳️ A sink that consumes collected bulk bodies.
///
/// # Contract
/// - `send` takes one fully collected payload holding `doc_count` documents.
/// - `Ok` means the request got a 2xx; item-level failures live inside the result.
/// - `Err` means the whole batch is gone: the transport broke or the status was not 2xx.
/// - No retries. One payload, one attempt, one verdict.
#[async_trait]
pub(crate) trait Sink: std::fmt::Debug + Send {
    /// 📥 Ship one payload and report what the other side made of it.
    async fn send(
        &mut self,
        payload: String,
        doc_count: u64,
    ) -> Result<SubmissionResult, SubmissionFailed>;
}

/// 🎭 The many faces of a Sink.
///
/// Every worker gets its own clone. Clones share whatever is worth sharing
/// (the HTTP connection pool, the test's Vec), so this stays cheap.
#[derive(Debug, Clone)]
pub(crate) enum SinkBackend {
    Elasticsearch(ElasticsearchSink),
    #[cfg(test)]
    InMemory(in_mem::InMemorySink),
}

#[async_trait]
impl Sink for SinkBackend {
    async fn send(
        &mut self,
        payload: String,
        doc_count: u64,
    ) -> Result<SubmissionResult, SubmissionFailed> {
        match self {
            SinkBackend::Elasticsearch(sink) => sink.send(payload, doc_count).await,
            #[cfg(test)]
            SinkBackend::InMemory(sink) => sink.send(payload, doc_count).await,
        }
    }
}
