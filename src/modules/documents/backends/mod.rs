pub mod backend_trait;
pub mod firestore;
pub mod memory;

pub use backend_trait::{CreatedDocument, DocumentBackend, SetOptions};
pub use firestore::FirestoreBackend;
pub use memory::MemoryBackend;
