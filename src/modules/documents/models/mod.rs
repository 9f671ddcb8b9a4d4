pub mod document;
pub mod field_value;
pub mod query;

pub use document::{Document, Fields, ResultData};
pub use query::{Condition, Operator, OrderBy, Query, SortDirection};
