//! 📊 progress.rs — "Are we there yet?" — every bulk load, every time, forever.
//!
//! 🚀 Two jobs:
//!   1. `ProgressMetrics`: the live bar the record source feeds while it reads.
//!      Visible only with `--verbose`; otherwise it is a hidden bar that counts quietly.
//!   2. `RunSummary` rendering: the classic one-liner, plus
//!      a comfy table for people who like their numbers in columns.
//!
//! ⚠️ Watching the progress bar will not make it go faster. Science says no.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::NOTHING};
use indicatif::{ProgressBar, ProgressStyle};

use crate::common::RunSummary;

// -- 📏 one mebibyte. not a megabyte. I will die on this hill.
const MIB: u64 = 1024 * 1024;

// -- 🎨 redraw at most this often; a redraw per line would cost more than the line
const RENDER_EVERY: Duration = Duration::from_millis(250);

/// 🔢 "1000000" → "1,000,000". You're welcome, eyes.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// ⏱️ MM:SS or HH:MM:SS. If it shows hours, call your mom. It's been a while.
fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// 📡 throughput over the sliding window
struct Rates {
    docs_per_sec: f64,
    mib_per_sec: f64,
}

/// 📊 Tracks bytes and docs read from the input, with a 5-second sliding window
/// for rates so a slow bulk response doesn't make the numbers look like a seismograph.
pub(crate) struct ProgressMetrics {
    /// 🏷️ shown above the bar, usually the input path
    source_name: String,
    /// 📏 0 when unknown (gzip input: the compressed size would lie)
    total_size: u64,
    total_bytes: u64,
    total_docs: u64,
    progress_bar: ProgressBar,
    rate_samples: VecDeque<(Instant, u64, u64)>,
    start_time: Instant,
    last_render: Instant,
}

impl std::fmt::Debug for ProgressMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // -- 🎭 ProgressBar is a diva and doesn't derive Debug
        f.debug_struct("ProgressMetrics")
            .field("source_name", &self.source_name)
            .field("total_size", &self.total_size)
            .field("total_bytes", &self.total_bytes)
            .field("total_docs", &self.total_docs)
            .finish()
    }
}

impl ProgressMetrics {
    /// 🚀 `visible = false` gives a hidden bar: counters still work, nothing is drawn.
    pub(crate) fn new(source_name: String, total_size: u64, visible: bool) -> Self {
        let progress_bar = if visible {
            ProgressBar::new(total_size)
        } else {
            ProgressBar::hidden()
        };
        // -- 🐛 the template is a literal; if indicatif ever rejects it we keep the default style
        if let Ok(style) = ProgressStyle::default_bar().template("{msg}\n| [{bar:40.cyan/blue}]") {
            progress_bar.set_style(style.progress_chars("=>-"));
        }

        let start_time = Instant::now();
        let mut rate_samples = VecDeque::new();
        rate_samples.push_back((start_time, 0u64, 0u64));

        Self {
            source_name,
            total_size,
            total_bytes: 0,
            total_docs: 0,
            progress_bar,
            rate_samples,
            start_time,
            last_render: start_time,
        }
    }

    /// 🔄 Count what was just read. Redraws at most every `RENDER_EVERY`.
    pub(crate) fn update(&mut self, bytes_read: u64, docs_read: u64) {
        self.total_bytes += bytes_read;
        self.total_docs += docs_read;

        let now = Instant::now();
        if now.duration_since(self.last_render) >= RENDER_EVERY {
            self.last_render = now;
            let rates = self.calculate_rates(now);
            self.render(rates);
            self.progress_bar.set_position(self.total_bytes);
        }
    }

    pub(crate) fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub(crate) fn total_docs(&self) -> u64 {
        self.total_docs
    }

    /// ✅ EOF. Ring the bell.
    pub(crate) fn finish(&mut self) {
        let rates = self.calculate_rates(Instant::now());
        self.render(rates);
        self.progress_bar.set_position(self.total_bytes);
        self.progress_bar.finish();
    }

    fn calculate_rates(&mut self, now: Instant) -> Rates {
        // 🔄 evict samples older than 5 seconds, like a bouncer, but for data points
        let window = Duration::from_secs(5);
        while let Some(&(timestamp, _, _)) = self.rate_samples.front() {
            if now.duration_since(timestamp) > window {
                self.rate_samples.pop_front();
            } else {
                break;
            }
        }
        self.rate_samples
            .push_back((now, self.total_bytes, self.total_docs));

        if let Some(&(oldest_time, oldest_bytes, oldest_docs)) = self.rate_samples.front() {
            let elapsed = now.duration_since(oldest_time).as_secs_f64();
            if elapsed > 0.0 {
                let bytes_delta = self.total_bytes.saturating_sub(oldest_bytes);
                let docs_delta = self.total_docs.saturating_sub(oldest_docs);
                return Rates {
                    docs_per_sec: docs_delta as f64 / elapsed,
                    mib_per_sec: (bytes_delta as f64 / elapsed) / MIB as f64,
                };
            }
        }

        // -- 💤 not enough elapsed time yet. zeros and composure
        Rates {
            docs_per_sec: 0.0,
            mib_per_sec: 0.0,
        }
    }

    fn render(&self, rates: Rates) {
        let percent = if self.total_size > 0 {
            (self.total_bytes as f64 / self.total_size as f64) * 100.0
        } else {
            0.0
        };

        let mut table = Table::new();
        table.load_preset(NOTHING);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.add_row(vec![
            Cell::new(format!("{} Docs/s", format_number(rates.docs_per_sec as u64)))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{} Docs", format_number(self.total_docs)))
                .set_alignment(CellAlignment::Right),
        ]);
        table.add_row(vec![
            Cell::new(format!("{:.2} MiB/s", rates.mib_per_sec))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}%", percent)).set_alignment(CellAlignment::Right),
        ]);
        table.add_row(vec![
            Cell::new(format!("{} elapsed", format_duration(self.start_time.elapsed())))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!(
                "{:.2} MiB read",
                self.total_bytes as f64 / MIB as f64
            ))
            .set_alignment(CellAlignment::Right),
        ]);

        self.progress_bar
            .set_message(format!("source: {}\n{}", self.source_name, table));
    }
}

impl RunSummary {
    /// 📣 `<N> docs in <duration> at <rate> docs/s with <W> workers`
    pub fn summary_line(&self) -> String {
        format!(
            "{} docs in {:?} at {:.3} docs/s with {} workers",
            self.records_read,
            self.elapsed,
            self.docs_per_sec(),
            self.workers
        )
    }

    /// 🍽️ the long version, one counter per row
    pub fn render_table(&self) -> String {
        let totals = &self.totals;
        let mut table = Table::new();
        table.load_preset(NOTHING);
        table.set_content_arrangement(ContentArrangement::Dynamic);

        let rows = [
            ("records read", format_number(self.records_read)),
            ("docs accepted", format_number(totals.docs_accepted)),
            ("docs rejected", format_number(totals.docs_rejected)),
            ("docs malformed", format_number(totals.docs_malformed)),
            ("docs lost", format_number(totals.docs_lost)),
            ("batches submitted", format_number(totals.batches_submitted)),
            ("batches failed", format_number(totals.batches_failed)),
            ("elapsed", format_duration(self.elapsed)),
            ("docs/s", format!("{:.3}", self.docs_per_sec())),
        ];
        for (label, value) in rows {
            table.add_row(vec![
                Cell::new(label),
                Cell::new(value).set_alignment(CellAlignment::Right),
            ]);
        }
        for (kind, count) in &totals.rejection_kinds {
            table.add_row(vec![
                Cell::new(format!("  rejected: {kind}")),
                Cell::new(format_number(*count)).set_alignment(CellAlignment::Right),
            ]);
        }
        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::WorkerReport;
    use std::collections::BTreeMap;

    #[test]
    fn the_one_where_commas_land_in_the_right_places() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn the_one_where_durations_pick_their_format() {
        assert_eq!(format_duration(Duration::from_secs(65)), "01:05");
        assert_eq!(format_duration(Duration::from_secs(3725)), "01:02:05");
    }

    #[test]
    fn the_one_where_hidden_metrics_still_count() {
        let mut metrics = ProgressMetrics::new("input.ndjson".into(), 0, false);
        metrics.update(10, 1);
        metrics.update(20, 1);
        metrics.finish();
        assert_eq!(metrics.total_bytes(), 30);
        assert_eq!(metrics.total_docs(), 2);
    }

    #[test]
    fn the_one_where_the_summary_line_reads_like_a_receipt() {
        let summary = RunSummary {
            records_read: 3,
            bytes_read: 24,
            workers: 2,
            elapsed: Duration::from_secs(2),
            totals: WorkerReport {
                rejection_kinds: BTreeMap::from([("version_conflict_engine_exception".into(), 1)]),
                ..WorkerReport::default()
            },
        };
        assert_eq!(summary.summary_line(), "3 docs in 2s at 1.500 docs/s with 2 workers");

        let table = summary.render_table();
        assert!(table.contains("records read"));
        assert!(table.contains("version_conflict_engine_exception"));
    }
}
