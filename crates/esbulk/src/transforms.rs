//! 🔄 Transforms — raw line in, bulk-ready document out.
//!
//! There is exactly one target format here: the Elasticsearch bulk API.
//! The encoder lives in [`elasticsearch`]; this module just re-exports it so
//! the workers can say `transforms::DocumentEncoder` and move on with their lives.
//!
//! ```text
//!   {"isbn":"42","title":"..."}          (raw record)
//!            │  DocumentEncoder::encode
//!            ▼
//!   {"index":{"_index":"books","_type":"book","_id":"42"}}
//!   {"isbn":"42","title":"..."}          (source line, untouched)
//! ```

pub(crate) mod elasticsearch;

pub(crate) use elasticsearch::DocumentEncoder;
