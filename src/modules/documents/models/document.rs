// Document model
//
// A document is a field mapping identified by an id within one collection.
// Mutating repository calls return the document echoed back together with
// the store's write time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name to value mapping held by a document
pub type Fields = Map<String, Value>;

/// A stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document id, unique within its collection
    pub id: String,

    /// Document contents
    pub data: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Fields) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Look up a top-level or dotted (`address.city`) field
    pub fn field(&self, path: &str) -> Option<&Value> {
        super::field_value::lookup(&self.data, path)
    }
}

/// Result of a write (add, update, delete)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultData {
    /// The written (or, for deletes, removed) document
    pub document: Document,

    /// Commit time reported by the store, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_time: Option<DateTime<Utc>>,
}

impl ResultData {
    pub fn new(document: Document, write_time: Option<DateTime<Utc>>) -> Self {
        Self {
            document,
            write_time,
        }
    }
}
