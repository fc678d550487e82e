//! Service Layer
//!
//! Request-independent logic behind the routes. Services take the
//! repository, validator and hooks explicitly so they can be driven without
//! an HTTP layer.

mod create_service;
mod destroy_service;
mod detail_service;
mod update_service;

pub use create_service::*;
pub use destroy_service::*;
pub use detail_service::*;
pub use update_service::*;
