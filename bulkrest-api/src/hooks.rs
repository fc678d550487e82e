//! Bulk destroy hooks
//!
//! Per-resource customization points for deletion: the safety check that
//! decides whether a bulk destroy may proceed, and callbacks around every
//! single delete.

use async_trait::async_trait;
use bulkrest_core::{DestroyPolicy, Record};
use bulkrest_storage::Collection;

use crate::error::ApiResult;

/// Deletion hooks for records of type `R`.
///
/// Every method has a default, so `impl BulkHooks<R> for MyHooks {}` gives
/// the stock behaviour.
#[async_trait]
pub trait BulkHooks<R: Record>: Send + Sync {
    /// Whether deleting `filtered` is allowed given the full `base`
    /// collection it was narrowed from.
    fn allow_bulk_destroy(
        &self,
        base: &Collection<R>,
        filtered: &Collection<R>,
        policy: DestroyPolicy,
    ) -> bool {
        allow_bulk_destroy(base, filtered, policy)
    }

    /// Called before each record is deleted. An error stops the destroy.
    async fn before_delete(&self, _record: &R) -> ApiResult<()> {
        Ok(())
    }

    /// Called after each record is deleted. An error stops the destroy.
    async fn after_delete(&self, _record: &R) -> ApiResult<()> {
        Ok(())
    }
}

/// Stock bulk destroy check.
///
/// `Distinct` only asks whether `filtered` is a different collection than
/// `base`. A filter that matched every record still passes. `ProperSubset`
/// additionally requires that at least one record was filtered out.
pub fn allow_bulk_destroy<R>(
    base: &Collection<R>,
    filtered: &Collection<R>,
    policy: DestroyPolicy,
) -> bool {
    if base.is_same(filtered) {
        return false;
    }
    match policy {
        DestroyPolicy::Distinct => true,
        DestroyPolicy::ProperSubset => filtered.len() < base.len(),
    }
}

/// Hooks with every default left in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

#[async_trait]
impl<R: Record> BulkHooks<R> for NoopHooks {}

#[cfg(test)]
mod tests {
    use super::*;
    use bulkrest_core::FilterCriteria;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Task {
        id: i64,
        done: bool,
    }

    impl Record for Task {
        const RESOURCE_NAME: &'static str = "task";
    }

    fn tasks() -> Collection<Task> {
        Collection::new(vec![Task { id: 1, done: true }, Task { id: 2, done: false }])
    }

    #[test]
    fn test_same_collection_is_rejected() {
        let base = tasks();
        let reused = base.clone();
        assert!(!allow_bulk_destroy(&base, &reused, DestroyPolicy::Distinct));
        assert!(!allow_bulk_destroy(&base, &reused, DestroyPolicy::ProperSubset));
    }

    #[test]
    fn test_distinct_accepts_any_derived_collection() {
        let base = tasks();
        let everything = base.filter(&FilterCriteria::new());
        let nothing = base.filter(&FilterCriteria::new().eq("id", "9"));
        assert!(allow_bulk_destroy(&base, &everything, DestroyPolicy::Distinct));
        assert!(allow_bulk_destroy(&base, &nothing, DestroyPolicy::Distinct));
    }

    #[test]
    fn test_proper_subset_rejects_full_copy() {
        let base = tasks();
        let everything = base.filter(&FilterCriteria::new());
        let done = base.filter(&FilterCriteria::new().eq("done", "true"));
        assert!(!allow_bulk_destroy(&base, &everything, DestroyPolicy::ProperSubset));
        assert!(allow_bulk_destroy(&base, &done, DestroyPolicy::ProperSubset));
    }

    #[tokio::test]
    async fn test_noop_hooks_defaults() -> ApiResult<()> {
        let hooks = NoopHooks;
        let base = tasks();
        let task = Task { id: 1, done: true };
        BulkHooks::<Task>::before_delete(&hooks, &task).await?;
        BulkHooks::<Task>::after_delete(&hooks, &task).await?;
        assert!(!BulkHooks::<Task>::allow_bulk_destroy(
            &hooks,
            &base,
            &base,
            DestroyPolicy::Distinct
        ));
        Ok(())
    }
}
