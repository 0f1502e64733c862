//! 🎬 *[a channel fills with records. somewhere, a cluster waits.]*
//! *[the clock on the wall reads 2:47am.]*
//!
//! 🗑️ The SinkWorker — patient, tireless, and deeply unbothered by the chaos
//! happening upstream. It receives records. It encodes them, batches them, and
//! ships them. It asks no questions. When a batch dies it writes it down and
//! moves on to the next one.
//!
//! 🦆 (the duck has no comment at this time)

use anyhow::Result;
use async_channel::Receiver;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::Worker;
use super::batch::BatchAccumulator;
use crate::backends::{Sink, SinkBackend};
use crate::collectors::NdjsonCollector;
use crate::common::{Batch, WorkerReport};
use crate::transforms::DocumentEncoder;

/// 🗑️ Pulls records off the shared queue until it is closed and drained.
#[derive(Debug)]
pub(crate) struct SinkWorker {
    name: String,
    rx: Receiver<String>,
    encoder: DocumentEncoder,
    accumulator: BatchAccumulator,
    collector: NdjsonCollector,
    sink: SinkBackend,
    verbose: bool,
    report: WorkerReport,
}

impl SinkWorker {
    pub(crate) fn new(
        name: String,
        rx: Receiver<String>,
        encoder: DocumentEncoder,
        batch_size: usize,
        sink: SinkBackend,
        verbose: bool,
    ) -> Self {
        Self {
            name,
            rx,
            encoder,
            accumulator: BatchAccumulator::new(batch_size),
            collector: NdjsonCollector,
            sink,
            verbose,
            report: WorkerReport::default(),
        }
    }

    /// 📡 One batch, one attempt. The outcome lands in the report either way.
    async fn submit(&mut self, batch: Batch) {
        let doc_count = batch.len() as u64;
        let payload = self.collector.collect(&batch);
        // -- 🗑️ the payload owns the bytes now
        drop(batch);

        match self.sink.send(payload, doc_count).await {
            Ok(result) => {
                debug!(
                    "✅ {}: batch of {} docs, HTTP {}, {} rejected",
                    self.name, doc_count, result.status, result.rejected
                );
                if self.verbose {
                    for (kind, count) in &result.rejection_kinds {
                        warn!("⚠️ {}: {} docs rejected with {}", self.name, count, kind);
                    }
                }
                self.report.absorb(&result);
            }
            Err(err) => {
                error!("💀 {}: batch of {} docs lost: {}", self.name, doc_count, err);
                self.report.record_failed_batch(doc_count);
            }
        }
    }
}

impl Worker for SinkWorker {
    type Report = WorkerReport;

    fn start(mut self) -> JoinHandle<Result<WorkerReport>> {
        tokio::spawn(async move {
            debug!("📥 {} started draining the queue", self.name);
            // -- 🏁 Err means closed AND empty: the source is done and nothing is left
            while let Ok(record) = self.rx.recv().await {
                match self.encoder.encode(record) {
                    Ok(doc) => {
                        if let Some(batch) = self.accumulator.push(doc) {
                            self.submit(batch).await;
                        }
                    }
                    Err(err) => {
                        self.report.docs_malformed += 1;
                        if self.verbose {
                            warn!("⚠️ {}: skipping record: {}", self.name, err);
                        } else {
                            debug!("⚠️ {}: skipping record: {}", self.name, err);
                        }
                    }
                }
            }

            if let Some(batch) = self.accumulator.finish() {
                self.submit(batch).await;
            }

            if self.verbose {
                info!(
                    "🏁 {} done: {} batches, {} docs sent",
                    self.name,
                    self.report.batches_submitted + self.report.batches_failed,
                    self.report.docs_sent()
                );
            }
            Ok(self.report)
        })
    }
}
