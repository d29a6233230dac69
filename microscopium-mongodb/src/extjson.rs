//! Extended JSON rendering of query results.
//!
//! Results are written in MongoDB Extended JSON v2, relaxed mode: numbers and
//! strings look like plain JSON, while BSON-only values keep a tagged form,
//! e.g. binary image data becomes
//! `{"$binary": {"base64": "...", "subType": "00"}}` and ObjectIds become
//! `{"$oid": "..."}`. [`from_extended_json`] reverses the encoding, so binary
//! payloads survive a round trip byte for byte.

use bson::{Bson, Document};
use serde_json::Value;

use crate::error::{MongoError, MongoResult};

/// One document as an extended JSON value.
pub fn document_to_value(doc: Document) -> Value {
    Bson::Document(doc).into_relaxed_extjson()
}

/// A sequence of documents as an extended JSON array.
pub fn to_extended_json(docs: &[Document]) -> MongoResult<String> {
    let values: Vec<Value> = docs.iter().cloned().map(document_to_value).collect();
    Ok(serde_json::to_string(&values)?)
}

/// Parse an extended JSON array back into documents.
pub fn from_extended_json(text: &str) -> MongoResult<Vec<Document>> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(MongoError::serialization(
            "expected a JSON array of documents",
        ));
    };

    items
        .into_iter()
        .map(|item| match Bson::try_from(item)? {
            Bson::Document(doc) => Ok(doc),
            other => Err(MongoError::serialization(format!(
                "expected a document, found {:?}",
                other.element_type()
            ))),
        })
        .collect()
}
