//! Destroy Service
//!
//! Bulk deletion of a filtered collection, guarded by the resource's
//! `allow_bulk_destroy` check.

use bulkrest_core::{DestroyPolicy, Record};
use bulkrest_storage::{Collection, Repository};

use crate::error::{ApiResult, BulkError};
use crate::hooks::BulkHooks;

/// Delete every record of `filtered`, one at a time.
///
/// Rejected with [`BulkError::DestroyRejected`] when the hooks do not allow
/// destroying `filtered` as narrowed from `base`. Deletes are independent: a
/// failing hook or delete stops the loop and earlier deletes stay done.
///
/// Returns the number of deleted records.
pub async fn destroy_records<R: Record>(
    repo: &dyn Repository<R>,
    hooks: &dyn BulkHooks<R>,
    base: &Collection<R>,
    filtered: &Collection<R>,
    policy: DestroyPolicy,
) -> Result<usize, BulkError> {
    if !hooks.allow_bulk_destroy(base, filtered, policy) {
        tracing::warn!(
            resource = R::RESOURCE_NAME,
            base = base.len(),
            filtered = filtered.len(),
            %policy,
            "Bulk destroy rejected"
        );
        return Err(BulkError::DestroyRejected);
    }

    let mut deleted = 0;
    for record in filtered {
        destroy_record(repo, hooks, record).await?;
        deleted += 1;
    }

    tracing::info!(resource = R::RESOURCE_NAME, count = deleted, "Bulk destroyed records");
    Ok(deleted)
}

/// Delete one record between its `before_delete` and `after_delete` hooks.
pub async fn destroy_record<R: Record>(
    repo: &dyn Repository<R>,
    hooks: &dyn BulkHooks<R>,
    record: &R,
) -> ApiResult<()> {
    hooks.before_delete(record).await?;
    repo.delete(record).await?;
    hooks.after_delete(record).await
}
