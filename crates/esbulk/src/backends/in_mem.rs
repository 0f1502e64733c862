//! 🧪 `in_mem` — a sink that lives entirely in RAM, gone the moment you blink.
//!
//! Tests hand it to the worker pool instead of a cluster and then read back
//! every payload that arrived. Flip it to `failing()` and every submission
//! comes back as a 503, so tests can watch the pool survive a bad day.
//!
//! ⚠️ This is NOT for production. It is compiled for tests only.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::backends::Sink;
use crate::common::SubmissionResult;
use crate::errors::SubmissionFailed;

/// 📦 A sink that never forgets.
///
/// Clone-able because tests need to peek inside after handing clones off to
/// the workers. The `Arc` means everyone shares the same Vec.
#[derive(Debug, Default, Clone)]
pub(crate) struct InMemorySink {
    /// 🔒 every payload, in arrival order
    pub(crate) received: Arc<tokio::sync::Mutex<Vec<String>>>,
    failing: bool,
}

impl InMemorySink {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 💀 records payloads like `new`, then rejects every one of them with a 503
    pub(crate) fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// 📋 snapshot of what arrived so far
    pub(crate) async fn payloads(&self) -> Vec<String> {
        self.received.lock().await.clone()
    }
}

#[async_trait]
impl Sink for InMemorySink {
    async fn send(
        &mut self,
        payload: String,
        doc_count: u64,
    ) -> Result<SubmissionResult, SubmissionFailed> {
        self.received.lock().await.push(payload);
        if self.failing {
            return Err(SubmissionFailed::Status {
                status: 503,
                body: "in-memory sink is failing on purpose".to_string(),
            });
        }
        Ok(SubmissionResult {
            accepted: doc_count,
            rejected: 0,
            rejection_kinds: BTreeMap::new(),
            status: 200,
        })
    }
}
