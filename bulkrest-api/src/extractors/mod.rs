//! Custom Axum extractors.

mod criteria;
mod json_body;
mod path_key;

pub use criteria::{Criteria, CriteriaError};
pub use json_body::{JsonBody, JsonBodyError};
pub use path_key::{PathKey, PathKeyError};
