// Collection repository
//
// Binds to one collection at a time and exposes document CRUD plus a
// filter/sort/limit query shape over any `DocumentBackend`.
//
// Every call builds its own `Query` value; the only state kept between
// calls is the bound collection name.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::core::{AppError, DataRepository, Result};
use crate::modules::documents::backends::{DocumentBackend, SetOptions};
use crate::modules::documents::models::{
    Condition, Document, Fields, OrderBy, Query, ResultData,
};

/// Repository over a single, switchable collection
#[derive(Clone)]
pub struct CollectionRepository {
    backend: Arc<dyn DocumentBackend>,
    collection: Option<String>,
}

impl CollectionRepository {
    /// Create an unbound repository; call `set_collection` before use
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            collection: None,
        }
    }

    /// Create a repository bound to `name`
    pub fn with_collection(backend: Arc<dyn DocumentBackend>, name: &str) -> Result<Self> {
        let mut repository = Self::new(backend);
        repository.set_collection(name)?;
        Ok(repository)
    }

    /// Bind the working collection.
    /// An invalid name is rejected and the previous binding is kept.
    pub fn set_collection(&mut self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            warn!("Collection name cannot be empty");
            return Err(AppError::validation("Collection name cannot be empty"));
        }

        if name.contains('/') {
            warn!(collection = %name, "Collection name cannot contain '/'");
            return Err(AppError::validation(format!(
                "Collection name '{}' cannot contain '/'",
                name
            )));
        }

        debug!(collection = %name, backend = %self.backend.name(), "Collection bound");
        self.collection = Some(name.to_string());
        Ok(())
    }

    /// Currently bound collection, if any
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// A fresh query over the bound collection
    pub fn query(&self) -> Result<Query> {
        Ok(Query::collection(self.bound()?))
    }

    /// Run a query built from `query()`
    pub async fn find(&self, query: Query) -> Result<Vec<Document>> {
        let result = self.run_find(query).await;
        self.logged("find", result)
    }

    fn bound(&self) -> Result<&str> {
        self.collection.as_deref().ok_or(AppError::CollectionNotSet)
    }

    fn validate_id(id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(AppError::validation("Document id cannot be empty"));
        }
        if id.contains('/') || id == "." || id == ".." {
            return Err(AppError::validation(format!("Invalid document id '{}'", id)));
        }
        Ok(())
    }

    /// Log a failed operation before handing the error to the caller
    fn logged<T>(&self, operation: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            let collection = self.collection().unwrap_or("<unset>");
            if e.is_precondition() {
                warn!(operation = %operation, collection = %collection, error = %e, "Repository call rejected");
            } else {
                error!(operation = %operation, collection = %collection, error = %e, "Repository call failed");
            }
        }
        result
    }

    async fn run_find(&self, query: Query) -> Result<Vec<Document>> {
        query.validate()?;
        let documents = self.backend.run_query(&query).await?;

        debug!(
            collection = %query.collection_name(),
            conditions = query.conditions().len(),
            results = documents.len(),
            "Query executed"
        );

        Ok(documents)
    }

    async fn run_get(
        &self,
        conditions: &[Condition],
        order_by: &[OrderBy],
        limit: Option<u32>,
    ) -> Result<Vec<Document>> {
        let query = self
            .query()?
            .filters(conditions.iter().cloned())
            .order_by_all(order_by.iter().cloned());

        let query = match limit {
            Some(limit) => query.limit(limit),
            None => query,
        };

        self.run_find(query).await
    }

    async fn run_get_by_id(&self, id: &str) -> Result<Option<Document>> {
        let collection = self.bound()?;
        Self::validate_id(id)?;

        let document = self.backend.get_document(collection, id).await?;
        if document.is_none() {
            info!(collection = %collection, id = %id, "Document not found");
        }

        Ok(document)
    }

    async fn run_add(&self, data: Fields, id: Option<&str>) -> Result<ResultData> {
        let collection = self.bound()?;

        let (id, write_time) = match id.filter(|id| !id.is_empty()) {
            Some(id) => {
                Self::validate_id(id)?;
                let write_time = self
                    .backend
                    .set_document(collection, id, &data, SetOptions::overwrite())
                    .await?;
                (id.to_string(), write_time)
            }
            None => {
                let created = self.backend.create_document(collection, &data).await?;
                (created.id, created.write_time)
            }
        };

        info!(collection = %collection, id = %id, "Document added");
        Ok(ResultData::new(Document::new(id, data), write_time))
    }

    async fn run_update(&self, data: Fields, id: &str, merge: bool) -> Result<ResultData> {
        let collection = self.bound()?;
        Self::validate_id(id)?;

        let write_time = self
            .backend
            .set_document(collection, id, &data, SetOptions { merge })
            .await?;

        info!(collection = %collection, id = %id, merge, "Document updated");
        Ok(ResultData::new(Document::new(id, data), write_time))
    }

    async fn run_delete(&self, id: &str) -> Result<Option<ResultData>> {
        let collection = self.bound()?;
        Self::validate_id(id)?;

        let Some(existing) = self.backend.get_document(collection, id).await? else {
            info!(collection = %collection, id = %id, "Document does not exist");
            return Ok(None);
        };

        let write_time = self.backend.delete_document(collection, id).await?;

        info!(collection = %collection, id = %id, "Document deleted");
        Ok(Some(ResultData::new(existing, write_time)))
    }
}

#[async_trait]
impl DataRepository for CollectionRepository {
    async fn get(
        &self,
        conditions: &[Condition],
        order_by: &[OrderBy],
        limit: Option<u32>,
    ) -> Result<Vec<Document>> {
        let result = self.run_get(conditions, order_by, limit).await;
        self.logged("get", result)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Document>> {
        let result = self.run_get_by_id(id).await;
        self.logged("get_by_id", result)
    }

    async fn add(&self, data: Fields, id: Option<&str>) -> Result<ResultData> {
        let result = self.run_add(data, id).await;
        self.logged("add", result)
    }

    async fn update(&self, data: Fields, id: &str, merge: bool) -> Result<ResultData> {
        let result = self.run_update(data, id, merge).await;
        self.logged("update", result)
    }

    async fn delete(&self, id: &str) -> Result<Option<ResultData>> {
        let result = self.run_delete(id).await;
        self.logged("delete", result)
    }
}
