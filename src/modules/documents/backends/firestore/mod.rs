pub mod codec;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{IntoUrl, Method, StatusCode, Url};
use reqwest_middleware::{ClientWithMiddleware, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error};

use self::codec::{CommitResponse, ErrorEnvelope, FirestoreDocument, RunQueryRow};
use super::backend_trait::{CreatedDocument, DocumentBackend, SetOptions};
use crate::config::FirestoreConfig;
use crate::core::{AppError, Result};
use crate::modules::documents::models::field_value::merge_paths;
use crate::modules::documents::models::{Document, Fields, Query};

/// Cloud Firestore client over the REST v1 API
///
/// API Documentation: https://firebase.google.com/docs/firestore/reference/rest
pub struct FirestoreBackend {
    client: ClientWithMiddleware,
    base_url: String,
    database: String,
    access_token: Option<String>,
}

impl FirestoreBackend {
    /// Create a Firestore client
    ///
    /// # Arguments
    /// * `client` - HTTP client (with retry middleware)
    /// * `base_url` - API host, e.g. `https://firestore.googleapis.com` or the emulator
    /// * `project_id` - Google Cloud project id
    /// * `database_id` - Database id, usually `(default)`
    /// * `access_token` - OAuth bearer token, if the target requires one
    pub fn new(
        client: ClientWithMiddleware,
        base_url: impl Into<String>,
        project_id: &str,
        database_id: &str,
        access_token: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            database: format!("projects/{}/databases/{}", project_id, database_id),
            access_token,
        }
    }

    pub fn from_config(config: &FirestoreConfig) -> Result<Self> {
        Ok(Self::new(
            config.create_client()?,
            config.base_url.clone(),
            &config.project_id,
            &config.database_id,
            config.bearer_token(),
        ))
    }

    fn documents_root(&self) -> String {
        format!("{}/documents", self.database)
    }

    /// Resource name used inside request bodies
    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_root(), collection, id)
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/v1/{}", self.base_url, resource)
    }

    /// URL of a collection or document; each segment is percent-encoded so
    /// ids holding `#`, `?` or `%` address the document they name
    fn collection_url(&self, collection: &str, id: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.url(&self.documents_root()))
            .map_err(|e| AppError::Configuration(format!("Invalid Firestore base URL: {}", e)))?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                AppError::Configuration(format!("Firestore base URL '{}' has no path", self.base_url))
            })?;
            segments.push(collection);
            if let Some(id) = id {
                segments.push(id);
            }
        }

        Ok(url)
    }

    fn request<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn with_json(builder: RequestBuilder, body: &Value) -> Result<RequestBuilder> {
        Ok(builder
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(body)?))
    }

    /// Turn a non-success response into `AppError::Backend`
    async fn error_for_status(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => match envelope.error.status {
                Some(code) => format!("{}: {}", code, envelope.error.message),
                None => envelope.error.message,
            },
            Err(_) => body,
        };

        AppError::backend(status.as_u16(), message)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        Ok(response.json::<T>().await?)
    }

    async fn commit(&self, write: Value) -> Result<CommitResponse> {
        let resource = format!("{}:commit", self.documents_root());
        let builder = Self::with_json(
            self.request(Method::POST, self.url(&resource)),
            &json!({ "writes": [write] }),
        )?;
        self.send(builder).await
    }
}

#[async_trait]
impl DocumentBackend for FirestoreBackend {
    async fn run_query(&self, query: &Query) -> Result<Vec<Document>> {
        let resource = format!("{}:runQuery", self.documents_root());
        let body = codec::encode_structured_query(query)?;
        debug!(collection = %query.collection_name(), query = %body, "Running Firestore query");

        let builder = Self::with_json(self.request(Method::POST, self.url(&resource)), &body)?;
        let rows: Vec<RunQueryRow> = self.send(builder).await?;

        rows.into_iter()
            .filter_map(|row| row.document)
            .map(FirestoreDocument::into_document)
            .collect()
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let url = self.collection_url(collection, Some(id))?;
        let response = self.request(Method::GET, url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let doc: FirestoreDocument = response.json().await?;
                Ok(Some(doc.into_document()?))
            }
            _ => Err(Self::error_for_status(response).await),
        }
    }

    async fn create_document(&self, collection: &str, data: &Fields) -> Result<CreatedDocument> {
        let url = self.collection_url(collection, None)?;
        let builder = Self::with_json(
            self.request(Method::POST, url),
            &json!({ "fields": codec::encode_fields(data)? }),
        )?;

        let created: FirestoreDocument = self.send(builder).await?;
        let write_time = created.write_time()?;

        Ok(CreatedDocument {
            id: codec::document_id(&created.name),
            write_time,
        })
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: &Fields,
        options: SetOptions,
    ) -> Result<Option<DateTime<Utc>>> {
        let mut write = json!({
            "update": {
                "name": self.document_name(collection, id),
                "fields": codec::encode_fields(data)?,
            }
        });

        if options.merge {
            let field_paths: Vec<String> = merge_paths(data)
                .iter()
                .map(|path| codec::encode_field_path(path.as_slice()))
                .collect();
            write["updateMask"] = json!({ "fieldPaths": field_paths });
        }

        let response = self.commit(write).await.map_err(|e| {
            error!(collection = %collection, id = %id, error = %e, "Firestore write failed");
            e
        })?;
        response.write_time()
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<Option<DateTime<Utc>>> {
        let response = self
            .commit(json!({ "delete": self.document_name(collection, id) }))
            .await?;
        response.write_time()
    }

    fn name(&self) -> &str {
        "firestore"
    }
}
