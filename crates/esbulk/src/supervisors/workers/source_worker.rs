//! 🚰 SourceWorker — the one producer.
//!
//! Reads records off the `FileSource` and pushes them into the bounded queue,
//! in file order. A full queue blocks it, which is the whole backpressure story.
//! It runs on a blocking thread because the reader (gzip included) is sync I/O.
//!
//! When the input runs dry it drops the only `Sender`, the queue closes, and
//! the workers drain what is left and go home.

use anyhow::{Result, bail};
use async_channel::Sender;
use tokio::task::JoinHandle;
use tracing::debug;

use super::Worker;
use crate::backends::FileSource;
use crate::common::SourceReport;

#[derive(Debug)]
pub(crate) struct SourceWorker {
    source: FileSource,
    tx: Sender<String>,
}

impl SourceWorker {
    pub(crate) fn new(source: FileSource, tx: Sender<String>) -> Self {
        Self { source, tx }
    }
}

impl Worker for SourceWorker {
    type Report = SourceReport;

    fn start(mut self) -> JoinHandle<Result<SourceReport>> {
        tokio::task::spawn_blocking(move || {
            debug!("🚰 SourceWorker started reading");
            while let Some(record) = self.source.next_record()? {
                if self.tx.send_blocking(record).is_err() {
                    // -- 💀 only happens if every receiver was dropped, i.e. every worker is gone
                    bail!("💀 every worker has exited, nobody is left to take records off the queue");
                }
            }
            let report = self.source.finish();
            debug!("🏁 SourceWorker read {} records, closing the queue", report.records);
            // -- 🚪 dropping self drops the Sender, which closes the queue
            Ok(report)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::file_source::source_from_str;

    #[tokio::test]
    async fn the_one_where_records_arrive_in_file_order_then_the_queue_closes() {
        let (tx, rx) = async_channel::bounded(16);
        let report = SourceWorker::new(source_from_str("{\"a\":1}\n\n{\"a\":2}\n"), tx)
            .start()
            .await
            .expect("no panic")
            .expect("source ok");

        assert_eq!(report.records, 2);
        assert_eq!(rx.recv().await.expect("first"), r#"{"a":1}"#);
        assert_eq!(rx.recv().await.expect("second"), r#"{"a":2}"#);
        assert!(rx.recv().await.is_err(), "queue closed after the last record");
    }

    #[tokio::test]
    async fn the_one_where_nobody_is_left_to_listen() {
        let (tx, rx) = async_channel::bounded(1);
        drop(rx);
        let outcome = SourceWorker::new(source_from_str("{\"a\":1}\n"), tx)
            .start()
            .await
            .expect("no panic");
        assert!(outcome.is_err());
    }
}
