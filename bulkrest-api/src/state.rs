//! Per-resource router state.

use std::sync::Arc;

use bulkrest_core::{BulkConfig, Record, Validator};
use bulkrest_storage::Repository;

use crate::hooks::{BulkHooks, NoopHooks};

/// Everything the handlers of one resource need.
///
/// Cloned into every request; all members are shared.
pub struct ResourceState<R: Record> {
    pub repo: Arc<dyn Repository<R>>,
    pub validator: Arc<dyn Validator>,
    pub hooks: Arc<dyn BulkHooks<R>>,
    pub config: Arc<BulkConfig>,
}

impl<R: Record> Clone for ResourceState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            validator: Arc::clone(&self.validator),
            hooks: Arc::clone(&self.hooks),
            config: Arc::clone(&self.config),
        }
    }
}

impl<R: Record> ResourceState<R> {
    /// State with default (no-op) deletion hooks.
    pub fn new<P, V>(repo: P, validator: V, config: BulkConfig) -> Self
    where
        P: Repository<R> + 'static,
        V: Validator + 'static,
    {
        Self {
            repo: Arc::new(repo),
            validator: Arc::new(validator),
            hooks: Arc::new(NoopHooks),
            config: Arc::new(config),
        }
    }

    pub fn with_hooks<H>(mut self, hooks: H) -> Self
    where
        H: BulkHooks<R> + 'static,
    {
        self.hooks = Arc::new(hooks);
        self
    }

    /// Share an existing hooks instance, e.g. one the caller inspects later.
    pub fn with_shared_hooks(mut self, hooks: Arc<dyn BulkHooks<R>>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn lookup_field(&self) -> &str {
        &self.config.lookup_field
    }
}
