pub mod error;
pub mod timestamp;
pub mod traits;

pub use error::{AppError, AppResult, Result};
pub use traits::DataRepository;
