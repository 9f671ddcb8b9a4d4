use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::Result;
use crate::modules::documents::models::{Document, Fields, Query};

/// Document store client surface used by the repository
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Execute a query and return matching documents in result order
    async fn run_query(&self, query: &Query) -> Result<Vec<Document>>;

    /// Fetch one document, `None` if it does not exist
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Insert a document under a store-generated id
    async fn create_document(&self, collection: &str, data: &Fields) -> Result<CreatedDocument>;

    /// Write a document at `id`, creating it when absent
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: &Fields,
        options: SetOptions,
    ) -> Result<Option<DateTime<Utc>>>;

    /// Remove a document; deleting a missing document is not an error
    async fn delete_document(&self, collection: &str, id: &str) -> Result<Option<DateTime<Utc>>>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Options for `set_document`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Merge into the existing document instead of replacing it
    pub merge: bool,
}

impl SetOptions {
    pub fn overwrite() -> Self {
        Self { merge: false }
    }

    pub fn merge() -> Self {
        Self { merge: true }
    }
}

/// Outcome of `create_document`
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedDocument {
    /// Id assigned by the store
    pub id: String,

    /// Commit time, if reported
    pub write_time: Option<DateTime<Utc>>,
}
