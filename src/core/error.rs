/// Crate-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Alias kept for trait signatures
pub type AppResult<T> = Result<T>;

/// Main error type for repository and backend operations
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// An operation was attempted before a collection was bound
    #[error("Collection is not set")]
    CollectionNotSet,

    /// Invalid caller input (collection name, document id, query value)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The document store rejected the request
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Errors raised by the HTTP middleware stack (retries exhausted, etc.)
    #[error("HTTP middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn backend(status: u16, msg: impl Into<String>) -> Self {
        AppError::Backend {
            status,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// True for failures caused by caller input or call order rather than the store
    pub fn is_precondition(&self) -> bool {
        matches!(self, AppError::CollectionNotSet | AppError::Validation(_))
    }
}
