//! 📦 Collectors — payload assembly, extracted and dignified.
//!
//! Takes a batch of encoded documents and assembles the single body that
//! `POST /_bulk` expects:
//!
//! ```text
//!   action1\nsource1\naction2\nsource2\n
//! ```
//!
//! The trailing `\n` is not optional. Elasticsearch will reject the last
//! document without it, and it will do so with a 400 that reads like a riddle.
//!
//! 🦆 (the duck collects newlines. one per line. it is very strict about it.)

use crate::common::Batch;

/// 📡 Newline-Delimited JSON — the format ES `/_bulk` demands.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NdjsonCollector;

impl NdjsonCollector {
    /// 📦 Flatten a batch into one bulk body, in batch order.
    #[inline]
    pub(crate) fn collect(&self, batch: &Batch) -> String {
        // 🧮 Pre-allocate exactly. No reallocs. No drama.
        let mut payload = String::with_capacity(batch.wire_len());
        for doc in &batch.docs {
            payload.push_str(&doc.action);
            payload.push('\n');
            payload.push_str(&doc.source);
            payload.push('\n');
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EncodedDocument;

    fn doc(n: u32) -> EncodedDocument {
        EncodedDocument {
            action: format!(r#"{{"index":{{"_id":"{n}"}}}}"#),
            source: format!(r#"{{"doc":{n}}}"#),
        }
    }

    #[test]
    fn the_one_where_every_doc_gets_two_lines_and_a_trailing_newline() {
        let batch = Batch {
            docs: vec![doc(1), doc(2)],
        };
        let payload = NdjsonCollector.collect(&batch);

        assert!(payload.ends_with('\n'), "bulk body must end with a newline");
        assert_eq!(payload.matches('\n').count(), 4, "two lines per document");
        assert_eq!(payload.len(), batch.wire_len(), "capacity estimate must be exact");

        let lines: Vec<&str> = payload.lines().collect();
        assert_eq!(
            lines,
            vec![
                r#"{"index":{"_id":"1"}}"#,
                r#"{"doc":1}"#,
                r#"{"index":{"_id":"2"}}"#,
                r#"{"doc":2}"#,
            ],
            "metadata then source, in batch order"
        );
    }

    #[test]
    fn the_one_where_an_empty_batch_produces_nothing() {
        // 🧪 No docs, no payload. The void stares back. It is empty. 🦆
        assert!(NdjsonCollector.collect(&Batch::default()).is_empty());
    }
}
