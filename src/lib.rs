//! Document Collection Repository Library
//!
//! A repository-pattern facade over a cloud document database. A
//! `CollectionRepository` binds to one collection at a time and offers
//! document CRUD plus equality/inequality filters, ordering and limits,
//! delegating storage and query execution to a `DocumentBackend`.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use crate::core::{AppError, DataRepository, Result};
pub use modules::documents;
