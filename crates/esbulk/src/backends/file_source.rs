//! 📂 FileSource — reads NDJSON line by line and hands out trimmed records.
//!
//! 🧠 Knowledge graph:
//! - Opens the input file, optionally through a gzip decoder (multi-member aware,
//!   so `cat a.gz b.gz > c.gz` still reads to the end).
//! - Synchronous `BufRead` on purpose: flate2 speaks `std::io::Read`, so the
//!   `SourceWorker` drives this from a blocking thread.
//! - Whitespace is trimmed here. Blank lines are not records and are skipped.
//! - Any read error (I/O, bad gzip, invalid UTF-8) is fatal. There is no
//!   "mostly read the file" mode.
//!
//! "He who reads the entire file into one String, OOMs in production." — Ancient proverb 📜

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use tracing::trace;

use crate::common::SourceReport;
use crate::progress::ProgressMetrics;

/// 📂 A lazy, finite sequence of records over an already-open byte stream.
pub(crate) struct FileSource {
    reader: Box<dyn BufRead + Send>,
    // -- ♻️ one line buffer for the whole run, cleared between reads
    line: String,
    progress: ProgressMetrics,
}

impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSource")
            .field("progress", &self.progress)
            .finish()
    }
}

impl FileSource {
    /// 🚀 Open `path`, gunzipping on the fly if asked.
    pub(crate) fn open(path: &Path, gzip: bool, show_progress: bool) -> Result<Self> {
        let file = File::open(path).with_context(|| {
            format!(
                "💀 The door to '{}' would not budge. It might not exist. The permissions might be wrong. \
                 Either way, the input file stays unopened and we stay outside.",
                path.display()
            )
        })?;

        // 📏 gzip input: the on-disk size is the compressed size, so the percentage would lie. 0 = unknown.
        let total_size = if gzip {
            0
        } else {
            file.metadata().map(|m| m.len()).unwrap_or(0)
        };

        let reader: Box<dyn BufRead + Send> = if gzip {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        let progress = ProgressMetrics::new(path.display().to_string(), total_size, show_progress);
        Ok(Self::from_reader(reader, progress))
    }

    /// 🔧 Wrap any reader. Tests feed it cursors; `open` feeds it files.
    pub(crate) fn from_reader(reader: Box<dyn BufRead + Send>, progress: ProgressMetrics) -> Self {
        Self {
            reader,
            line: String::with_capacity(64 * 1024),
            progress,
        }
    }

    /// 📄 The next non-blank, trimmed record, or `None` at end of stream.
    pub(crate) fn next_record(&mut self) -> Result<Option<String>> {
        loop {
            self.line.clear();
            let bytes_read = self
                .reader
                .read_line(&mut self.line)
                .context("💀 Reading the input stream failed mid-flight. The load cannot continue on half a file.")?;
            if bytes_read == 0 {
                trace!("🏁 end of input stream");
                return Ok(None);
            }

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                self.progress.update(bytes_read as u64, 0);
                continue;
            }
            let record = trimmed.to_string();
            self.progress.update(bytes_read as u64, 1);
            return Ok(Some(record));
        }
    }

    /// ✅ Stop the progress bar and return the counters.
    pub(crate) fn finish(&mut self) -> SourceReport {
        self.progress.finish();
        self.report()
    }

    pub(crate) fn report(&self) -> SourceReport {
        SourceReport {
            records: self.progress.total_docs(),
            bytes: self.progress.total_bytes(),
        }
    }
}

#[cfg(test)]
pub(crate) fn source_from_str(contents: &str) -> FileSource {
    FileSource::from_reader(
        Box::new(std::io::Cursor::new(contents.as_bytes().to_vec())),
        ProgressMetrics::new("test".into(), contents.len() as u64, false),
    )
}
