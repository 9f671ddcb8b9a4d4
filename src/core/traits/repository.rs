use async_trait::async_trait;

use crate::core::error::AppResult;
use crate::modules::documents::models::{Condition, Document, Fields, OrderBy, ResultData};

/// Generic data repository over one collection of documents
///
/// Implementations are free to choose the backing store; callers only
/// depend on this trait.
#[async_trait]
pub trait DataRepository: Send + Sync {
    /// Fetch documents matching every condition, sorted and capped.
    /// A `limit` of `None` or `Some(0)` returns all matches.
    async fn get(
        &self,
        conditions: &[Condition],
        order_by: &[OrderBy],
        limit: Option<u32>,
    ) -> AppResult<Vec<Document>>;

    /// Point lookup, `None` when the document does not exist
    async fn get_by_id(&self, id: &str) -> AppResult<Option<Document>>;

    /// Insert with a generated id, or overwrite at `id` when given
    async fn add(&self, data: Fields, id: Option<&str>) -> AppResult<ResultData>;

    /// Overwrite (or merge into) the document at `id`
    async fn update(&self, data: Fields, id: &str, merge: bool) -> AppResult<ResultData>;

    /// Delete the document at `id`, returning its last data.
    /// `None` when there was nothing to delete.
    async fn delete(&self, id: &str) -> AppResult<Option<ResultData>>;
}
