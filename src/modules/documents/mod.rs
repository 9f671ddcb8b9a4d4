// Documents module

pub mod backends;
pub mod models;
pub mod repositories;

pub use backends::{DocumentBackend, FirestoreBackend, MemoryBackend, SetOptions};
pub use models::{Condition, Document, Fields, Operator, OrderBy, Query, ResultData, SortDirection};
pub use repositories::CollectionRepository;
