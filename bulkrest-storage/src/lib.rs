//! bulkrest Storage - Repository Trait and In-Memory Implementation
//!
//! Defines the storage abstraction seen by bulk operations. Production
//! backends implement [`Repository`]; [`InMemoryRepository`] backs the demo
//! server and the tests.

pub mod collection;
pub mod memory;
pub mod repository;

pub use collection::{Collection, CollectionId};
pub use memory::InMemoryRepository;
pub use repository::Repository;
