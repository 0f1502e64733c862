//! 🧵 Workers: the ones who actually do the work while the Supervisor takes
//! all the credit in the sprint retro.
//!
//! 🏭 The factory floor:
//!
//! ```text
//!   SourceWorker ──records──▶ [bounded queue] ──▶ SinkWorker × N ──bulk──▶ sink
//! ```
//!
//! - One producer, N consumers, one `async_channel` between them.
//! - Each record goes to exactly one worker. Which one is none of your business.
//! - Each worker owns its encoder, its batch and its report. Nothing is shared
//!   but the queue and the sink's connection pool.
//! - The pool is finished when the producer hit EOF, the queue is drained, and
//!   every worker has submitted its last partial batch.
//!
//! ⚠️ "If you're reading this, the code review went poorly." 🦆

use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use tokio::task::JoinHandle;
use tracing::debug;

mod batch;
mod sink_worker;
mod source_worker;

use sink_worker::SinkWorker;
use source_worker::SourceWorker;

use crate::app_config::AppConfig;
use crate::backends::{FileSource, SinkBackend};
use crate::common::{RunSummary, WorkerReport};
use crate::transforms::DocumentEncoder;

/// 🏗️ A background worker, that does work. duh.
///
/// "What's the DEAL with lifetime annotations? You borrow something,
///  you give it back. It's not that hard, Jerry!" — Seinfeld, on Rust
pub(crate) trait Worker {
    /// 🧾 what the worker hands back when its shift ends
    type Report;

    /// 🚀 Start the worker. Returns a JoinHandle because we trust
    /// but verify. Mostly verify.
    fn start(self) -> JoinHandle<Result<Self::Report>>;
}

/// 🧵 Run one whole load: start the workers, start the producer, wait for everyone.
///
/// Per-record and per-batch trouble is counted in the reports. Only a broken
/// input stream or a crashed task makes this return `Err`, and even then it
/// waits for the workers to finish what is already queued first.
pub(in crate::supervisors) async fn run_pool(
    source: FileSource,
    sink: SinkBackend,
    app_config: &AppConfig,
) -> Result<RunSummary> {
    let (tx, rx) = async_channel::bounded::<String>(app_config.effective_queue_capacity());
    let encoder = DocumentEncoder::from_config(app_config);

    let sink_workers: Vec<JoinHandle<Result<WorkerReport>>> = (0..app_config.workers)
        .map(|n| {
            SinkWorker::new(
                format!("worker-{n}"),
                rx.clone(),
                encoder.clone(),
                app_config.batch_size,
                sink.clone(),
                app_config.verbose,
            )
            .start()
        })
        .collect();
    // -- 🔒 the workers hold their own receivers; ours would only keep a dead queue alive
    drop(rx);
    debug!("🧵 started {} sink workers", sink_workers.len());

    let started = Instant::now();
    let source_outcome = SourceWorker::new(source, tx)
        .start()
        .await
        .map_err(|join_err| anyhow!("💀 the source worker crashed: {join_err}"))
        .and_then(|outcome| outcome.context("💀 reading the input failed"));

    let mut totals = WorkerReport::default();
    let mut worker_failure: Option<anyhow::Error> = None;
    for outcome in futures::future::join_all(sink_workers).await {
        match outcome {
            Ok(Ok(report)) => totals.merge(report),
            Ok(Err(err)) => {
                worker_failure.get_or_insert(err);
            }
            Err(join_err) => {
                worker_failure.get_or_insert(anyhow!("💀 a sink worker crashed: {join_err}"));
            }
        }
    }
    let elapsed = started.elapsed();

    let source_report = source_outcome?;
    if let Some(err) = worker_failure {
        return Err(err);
    }

    Ok(RunSummary {
        records_read: source_report.records,
        bytes_read: source_report.bytes,
        workers: app_config.workers,
        elapsed,
        totals,
    })
}
