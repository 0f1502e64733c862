//! 📦 BatchAccumulator — a bucket that tips over at exactly `batch_size`.
//!
//! One per worker, never shared. Documents go in, in order. A full batch comes
//! out the moment the bucket fills, and whatever is left at the end of the
//! stream comes out once more from `finish`. An empty bucket produces nothing.

use crate::common::{Batch, EncodedDocument};

#[derive(Debug)]
pub(crate) struct BatchAccumulator {
    batch_size: usize,
    buffer: Vec<EncodedDocument>,
}

impl BatchAccumulator {
    /// 🏗️ `batch_size` is at least 1; config validation sees to that.
    pub(crate) fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch_size,
            buffer: Vec::with_capacity(batch_size),
        }
    }

    /// 📥 Add one document. Returns the full batch when this one filled it.
    pub(crate) fn push(&mut self, doc: EncodedDocument) -> Option<Batch> {
        self.buffer.push(doc);
        if self.buffer.len() < self.batch_size {
            return None;
        }
        let docs = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.batch_size));
        Some(Batch { docs })
    }

    /// 🏁 The partial batch left over at end of stream, if any.
    /// Calling it again returns `None`: the bucket is empty after the first call.
    pub(crate) fn finish(&mut self) -> Option<Batch> {
        if self.buffer.is_empty() {
            return None;
        }
        Some(Batch {
            docs: std::mem::take(&mut self.buffer),
        })
    }
}
