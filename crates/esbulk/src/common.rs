//! 📦 Common data structures — the building blocks of esbulk.
//!
//! 🎬 A raw line walks out of a file. It gets encoded, batched, shipped,
//! and forgotten. These are the containers it travels in, plus the receipts
//! the workers hand back to the supervisor when the shift is over.
//!
//! ⚠️ No counter in here is shared. Workers fill their own `WorkerReport`
//! and return it by value. The supervisor adds them up. No atomics were harmed.

use std::collections::BTreeMap;
use std::time::Duration;

/// 🎯 One record, ready for the bulk API: the action line and the untouched source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EncodedDocument {
    /// 📎 `{"index":{"_index":..,"_type":..}}`, no trailing newline
    pub action: String,
    /// 📦 the original record, byte for byte
    pub source: String,
}

impl EncodedDocument {
    /// 📏 bytes this document adds to the bulk body, newlines included
    pub(crate) fn wire_len(&self) -> usize {
        self.action.len() + self.source.len() + 2
    }
}

/// 📦 An ordered run of encoded documents, at most `batch_size` long.
///
/// Owned by exactly one worker until it is submitted, then dropped.
/// No batch outlives one submission call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Batch {
    pub docs: Vec<EncodedDocument>,
}

impl Batch {
    pub(crate) fn len(&self) -> usize {
        self.docs.len()
    }

    pub(crate) fn wire_len(&self) -> usize {
        self.docs.iter().map(EncodedDocument::wire_len).sum()
    }
}

/// 🧾 What the cluster said about one bulk request that did get a 2xx.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SubmissionResult {
    pub accepted: u64,
    pub rejected: u64,
    /// 🏷️ error `type` → how many items failed with it
    pub rejection_kinds: BTreeMap<String, u64>,
    pub status: u16,
}

/// 🧾 One worker's receipt for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// batches that got a 2xx (even with item failures inside)
    pub batches_submitted: u64,
    pub docs_accepted: u64,
    pub docs_rejected: u64,
    /// records the encoder refused
    pub docs_malformed: u64,
    /// batches that died as a whole (transport error or non-2xx)
    pub batches_failed: u64,
    /// documents that were inside those failed batches
    pub docs_lost: u64,
    pub rejection_kinds: BTreeMap<String, u64>,
}

impl WorkerReport {
    /// ✅ fold in a successful submission
    pub(crate) fn absorb(&mut self, result: &SubmissionResult) {
        self.batches_submitted += 1;
        self.docs_accepted += result.accepted;
        self.docs_rejected += result.rejected;
        for (kind, count) in &result.rejection_kinds {
            *self.rejection_kinds.entry(kind.clone()).or_default() += count;
        }
    }

    /// 💀 book a whole batch as lost
    pub(crate) fn record_failed_batch(&mut self, doc_count: u64) {
        self.batches_failed += 1;
        self.docs_lost += doc_count;
    }

    /// 🔄 add another worker's receipt to this one
    pub(crate) fn merge(&mut self, other: WorkerReport) {
        self.batches_submitted += other.batches_submitted;
        self.docs_accepted += other.docs_accepted;
        self.docs_rejected += other.docs_rejected;
        self.docs_malformed += other.docs_malformed;
        self.batches_failed += other.batches_failed;
        self.docs_lost += other.docs_lost;
        for (kind, count) in other.rejection_kinds {
            *self.rejection_kinds.entry(kind).or_default() += count;
        }
    }

    /// 📤 documents that left in a batch, whatever happened to them afterwards
    pub fn docs_sent(&self) -> u64 {
        self.docs_accepted + self.docs_rejected + self.docs_lost
    }
}

/// 🧾 What the record source hands back: how much it read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SourceReport {
    pub records: u64,
    pub bytes: u64,
}

/// 📊 The whole run, summed up by the supervisor.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// records pulled off the input stream (blank lines excluded)
    pub records_read: u64,
    pub bytes_read: u64,
    pub workers: usize,
    pub elapsed: Duration,
    pub totals: WorkerReport,
}

impl RunSummary {
    pub fn docs_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.records_read as f64 / secs
        } else {
            0.0
        }
    }

    /// ⚠️ true when at least one document did not make it in
    pub fn has_losses(&self) -> bool {
        self.totals.docs_malformed > 0 || self.totals.docs_rejected > 0 || self.totals.docs_lost > 0
    }
}
