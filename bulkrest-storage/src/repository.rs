//! Record repository trait
//!
//! The repository is the storage engine seen by bulk operations: typed
//! create, read, update and delete over one resource. Implementations decide
//! transactional guarantees; the bulk layer only relies on `bulk_create`
//! being all-or-nothing.

use async_trait::async_trait;
use bulkrest_core::{FilterCriteria, LookupKey, Record, StorageError, StorageResult};

use crate::collection::Collection;

/// Async storage for records of type `R`.
#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    // ========================================================================
    // WRITES
    // ========================================================================

    /// Insert a batch of new records in one operation.
    ///
    /// Either every record is inserted and returned (with generated keys
    /// filled in) or none is.
    async fn bulk_create(&self, records: Vec<R>) -> StorageResult<Vec<R>>;

    /// Insert one new record.
    async fn create(&self, record: R) -> StorageResult<R> {
        let mut created = self.bulk_create(vec![record]).await?;
        created.pop().ok_or_else(|| StorageError::InsertFailed {
            resource: R::RESOURCE_NAME.to_string(),
            reason: "storage returned no record".to_string(),
        })
    }

    /// Persist only `changed_fields` of an existing record.
    async fn save(&self, record: &R, changed_fields: &[String]) -> StorageResult<()>;

    /// Remove an existing record.
    async fn delete(&self, record: &R) -> StorageResult<()>;

    // ========================================================================
    // READS
    // ========================================================================

    /// Get a record by its key.
    async fn get(&self, key: &LookupKey) -> StorageResult<Option<R>>;

    /// The full, unfiltered collection of this resource.
    async fn query_all(&self) -> StorageResult<Collection<R>>;

    /// Narrow a collection by criteria. The result is always a new collection.
    fn filter(&self, collection: &Collection<R>, criteria: &FilterCriteria) -> Collection<R> {
        collection.filter(criteria)
    }
}
