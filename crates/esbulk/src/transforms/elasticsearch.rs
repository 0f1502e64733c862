//! 📡 Elasticsearch Bulk Encoding — formatting documents for the bulk API's peculiar tastes 🚀
//!
//! Rule 1: Two lines per document. Action metadata, then document source. Always.
//! Rule 2: Newline-delimited. Not comma-separated. Not XML. NEWLINES.
//! Rule 3: The trailing newline on the whole body matters. That one is the
//!         collector's job, not ours.
//!
//! ## Knowledge Graph 🧠
//! - Input: one trimmed record string + index/type/id-field from `AppConfig`
//! - Output: `EncodedDocument { action, source }`
//! - `_id` comes from the configured field, or is left for the cluster to invent
//! - `source` is the record as-is. We parse only to find the id; we never re-serialize.
//!
//! ⚠️ A record that cannot produce an id is a `MalformedDocument`. The worker skips it.
//! One bad line does not get to ruin a 40 million line load. 🦆

use serde_json::{Map, Value, json};

use crate::app_config::AppConfig;
use crate::common::EncodedDocument;
use crate::errors::MalformedDocument;

/// 📡 DocumentEncoder — the format whisperer for ES bulk indexing.
///
/// Cheap to clone; every worker carries its own copy.
#[derive(Debug, Clone)]
pub(crate) struct DocumentEncoder {
    index: String,
    doc_type: String,
    id_field: Option<String>,
    // -- 🧮 the action line when there is no `_id` never changes, so build it once
    auto_id_action: String,
}

impl DocumentEncoder {
    pub(crate) fn new(index: &str, doc_type: &str, id_field: Option<&str>) -> Self {
        let mut encoder = Self {
            index: index.to_string(),
            doc_type: doc_type.to_string(),
            id_field: id_field.map(str::to_string),
            auto_id_action: String::new(),
        };
        encoder.auto_id_action = encoder.action_line(None);
        encoder
    }

    pub(crate) fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.index, &config.doc_type, config.id_field.as_deref())
    }

    /// 🔄 Turn one record into its two bulk lines.
    ///
    /// Without an id field the record is not even parsed. With one, it has to be a
    /// JSON object holding that field, and the field has to be a scalar.
    pub(crate) fn encode(&self, record: String) -> Result<EncodedDocument, MalformedDocument> {
        let action = match self.id_field.as_deref() {
            None => self.auto_id_action.clone(),
            Some(field) => {
                let id = extract_id(&record, field)?;
                self.action_line(Some(&id))
            }
        };
        Ok(EncodedDocument {
            action,
            source: record,
        })
    }

    /// 📎 `{"index":{"_index":..,"_type":..[,"_id":..]}}`
    fn action_line(&self, id: Option<&str>) -> String {
        let mut the_action_metadata = Map::new();
        the_action_metadata.insert("_index".to_string(), Value::String(self.index.clone()));
        the_action_metadata.insert("_type".to_string(), Value::String(self.doc_type.clone()));
        if let Some(id) = id {
            the_action_metadata.insert("_id".to_string(), Value::String(id.to_string()));
        }
        // -- 📦 Value's Display is infallible JSON. No context string needed, no irony either.
        json!({ "index": the_action_metadata }).to_string()
    }
}

/// 🔑 Pull the id out of a record. Strings verbatim, numbers and bools as their JSON text.
fn extract_id(record: &str, field: &str) -> Result<String, MalformedDocument> {
    let value: Value = serde_json::from_str(record)?;
    let Value::Object(mut object) = value else {
        return Err(MalformedDocument::NotAnObject {
            field: field.to_string(),
        });
    };
    match object.remove(field) {
        None => Err(MalformedDocument::MissingIdField {
            field: field.to_string(),
        }),
        Some(Value::String(id)) => Ok(id),
        Some(Value::Number(id)) => Ok(id.to_string()),
        Some(Value::Bool(id)) => Ok(id.to_string()),
        Some(other) => Err(MalformedDocument::UnsupportedIdValue {
            field: field.to_string(),
            kind: match other {
                Value::Null => "null",
                Value::Array(_) => "array",
                _ => "object",
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 🔁 what the cluster would see: (id, index, type, source)
    fn decode(doc: &EncodedDocument) -> (Option<String>, String, String, String) {
        let action: Value = serde_json::from_str(&doc.action).expect("action line must be JSON");
        let meta = &action["index"];
        (
            meta.get("_id").and_then(Value::as_str).map(str::to_string),
            meta["_index"].as_str().expect("_index").to_string(),
            meta["_type"].as_str().expect("_type").to_string(),
            doc.source.clone(),
        )
    }

    #[test]
    fn the_one_where_no_id_field_means_the_cluster_picks() {
        let encoder = DocumentEncoder::new("books", "book", None);
        // 🧪 not even JSON. Without an id field we never look inside
        let doc = encoder
            .encode("this is not json and nobody checked".to_string())
            .expect("passthrough never fails");

        let (id, index, doc_type, source) = decode(&doc);
        assert_eq!(id, None);
        assert_eq!(index, "books");
        assert_eq!(doc_type, "book");
        assert_eq!(source, "this is not json and nobody checked");
        assert!(!doc.action.contains('\n'), "action must stay on one line");
    }

    #[test]
    fn the_one_where_the_id_round_trips_with_the_payload() {
        let encoder = DocumentEncoder::new("books", "default", Some("isbn"));
        let record = r#"{"isbn":"978-0","title":"Snow Crash","emoji":"🔥"}"#.to_string();

        let doc = encoder.encode(record.clone()).expect("valid record");

        let (id, _, _, source) = decode(&doc);
        assert_eq!(id.as_deref(), Some("978-0"));
        assert_eq!(source, record, "source bytes must survive untouched");
    }

    #[test]
    fn the_one_where_numeric_and_bool_ids_become_strings() {
        let encoder = DocumentEncoder::new("i", "t", Some("a"));

        let doc = encoder.encode(r#"{"a":1}"#.to_string()).expect("number id");
        assert_eq!(decode(&doc).0.as_deref(), Some("1"));

        let doc = encoder.encode(r#"{"a":2.5}"#.to_string()).expect("float id");
        assert_eq!(decode(&doc).0.as_deref(), Some("2.5"));

        let doc = encoder.encode(r#"{"a":true}"#.to_string()).expect("bool id");
        assert_eq!(decode(&doc).0.as_deref(), Some("true"));
    }

    #[test]
    fn the_one_where_the_id_field_is_missing() {
        let encoder = DocumentEncoder::new("i", "t", Some("a"));
        let err = encoder
            .encode(r#"{"b":2}"#.to_string())
            .expect_err("missing field must be malformed");
        assert!(matches!(err, MalformedDocument::MissingIdField { ref field } if field == "a"));
    }

    #[test]
    fn the_one_where_garbage_and_odd_shapes_are_rejected() {
        let encoder = DocumentEncoder::new("i", "t", Some("a"));

        assert!(matches!(
            encoder.encode("{not json".to_string()),
            Err(MalformedDocument::InvalidJson(_))
        ));
        assert!(matches!(
            encoder.encode("[1,2,3]".to_string()),
            Err(MalformedDocument::NotAnObject { .. })
        ));
        assert!(matches!(
            encoder.encode(r#"{"a":null}"#.to_string()),
            Err(MalformedDocument::UnsupportedIdValue { kind: "null", .. })
        ));
        assert!(matches!(
            encoder.encode(r#"{"a":{"nested":1}}"#.to_string()),
            Err(MalformedDocument::UnsupportedIdValue { kind: "object", .. })
        ));
    }

    #[test]
    fn the_one_where_index_names_with_quotes_stay_valid_json() {
        let encoder = DocumentEncoder::new(r#"we"ird"#, "t", None);
        let doc = encoder.encode("{}".to_string()).expect("passthrough");
        assert_eq!(decode(&doc).1, r#"we"ird"#);
    }
}
