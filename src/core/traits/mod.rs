pub mod repository;

pub use repository::DataRepository;
