use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::backend_trait::{CreatedDocument, DocumentBackend, SetOptions};
use crate::core::Result;
use crate::modules::documents::models::field_value::{self, compare};
use crate::modules::documents::models::{Document, Fields, OrderBy, Query, SortDirection};

type Collection = BTreeMap<String, Fields>;

/// In-process document store with the same query semantics as the remote store
#[derive(Default)]
pub struct MemoryBackend {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in `collection`
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }
}

/// Explicit ordering followed by every inequality-filtered field not already
/// ordered, in field name order, as the remote store applies them implicitly.
/// Implicit fields take the direction of the last explicit order.
fn effective_ordering(query: &Query) -> Vec<OrderBy> {
    let mut ordering = query.ordering().to_vec();
    let direction = ordering.last().map_or(SortDirection::Ascending, |o| o.direction);

    let mut implicit: Vec<&str> = query
        .conditions()
        .iter()
        .filter(|c| c.operator.is_inequality())
        .map(|c| c.field.as_str())
        .filter(|field| !ordering.iter().any(|o| o.field == *field))
        .collect();
    implicit.sort_unstable();
    implicit.dedup();

    ordering.extend(
        implicit
            .into_iter()
            .map(|field| OrderBy::new(field, direction)),
    );
    ordering
}

fn order_documents(a: &Document, b: &Document, order_by: &[OrderBy]) -> Ordering {
    for order in order_by {
        // Documents lacking an ordered field are filtered out before sorting
        let (Some(x), Some(y)) = (a.field(&order.field), b.field(&order.field)) else {
            continue;
        };
        let ord = match order.direction {
            SortDirection::Ascending => compare(x, y),
            SortDirection::Descending => compare(y, x),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    // Stable tie-break on the document id, following the last direction
    match order_by.last().map(|o| o.direction) {
        Some(SortDirection::Descending) => b.id.cmp(&a.id),
        _ => a.id.cmp(&b.id),
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn run_query(&self, query: &Query) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(collection) = collections.get(query.collection_name()) else {
            return Ok(Vec::new());
        };

        let mut documents: Vec<Document> = collection
            .iter()
            .filter(|(_, fields)| {
                query
                    .conditions()
                    .iter()
                    .all(|condition| field_value::matches(condition, fields))
            })
            .filter(|(_, fields)| {
                query
                    .ordering()
                    .iter()
                    .all(|order| field_value::lookup(fields, &order.field).is_some())
            })
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            .collect();

        let ordering = effective_ordering(query);
        documents.sort_by(|a, b| order_documents(a, b, &ordering));

        if let Some(limit) = query.max_results() {
            documents.truncate(limit as usize);
        }

        debug!(
            collection = %query.collection_name(),
            matched = documents.len(),
            "Ran in-memory query"
        );

        Ok(documents)
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn create_document(&self, collection: &str, data: &Fields) -> Result<CreatedDocument> {
        let id = Uuid::new_v4().simple().to_string();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data.clone());

        Ok(CreatedDocument {
            id,
            write_time: Some(Utc::now()),
        })
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: &Fields,
        options: SetOptions,
    ) -> Result<Option<DateTime<Utc>>> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        if options.merge {
            if let Some(existing) = docs.get_mut(id) {
                field_value::merge_into(existing, data.clone());
                return Ok(Some(Utc::now()));
            }
        }

        docs.insert(id.to_string(), data.clone());
        Ok(Some(Utc::now()))
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<Option<DateTime<Utc>>> {
        if let Some(docs) = self.collections.write().await.get_mut(collection) {
            docs.remove(id);
        }
        Ok(Some(Utc::now()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
