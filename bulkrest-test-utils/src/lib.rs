//! bulkrest Test Utilities
//!
//! Centralized test infrastructure for the bulkrest workspace:
//! - A fixture resource (`Widget`) with its validation schema
//! - Recording repository and hooks with failure injection
//! - Proptest generators for payload items and batches
//! - Custom assertions for bulk operation results

pub use bulkrest_core::{
    BulkConfig, DestroyPolicy, FieldErrors, FieldSet, FieldSpec, FilterCriteria, LookupKey, Record,
    ResourceSchema, StorageError, StorageResult, ValidationErrors,
};
pub use bulkrest_storage::{Collection, InMemoryRepository, Repository};

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bulkrest_api::{ApiError, ApiResult, BulkHooks};
use serde::{Deserialize, Serialize};

// ============================================================================
// FIXTURE RESOURCE
// ============================================================================

/// Resource used throughout the test suites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Widget {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub quantity: i64,
}

impl Record for Widget {
    const RESOURCE_NAME: &'static str = "widget";
}

/// `name` is the only required field.
pub fn widget_schema() -> ResourceSchema {
    ResourceSchema::new()
        .field(FieldSpec::integer("id").read_only())
        .field(FieldSpec::string("name").max_length(32))
        .field(FieldSpec::string("color").optional().nullable())
        .field(FieldSpec::integer("quantity").optional().range(Some(0), None))
}

// ============================================================================
// RECORDING REPOSITORY
// ============================================================================

/// One call observed by [`RecordingRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    BulkCreate { count: usize },
    Save { key: LookupKey, fields: Vec<String> },
    Delete { key: LookupKey },
}

#[derive(Debug, Default)]
struct Recorder {
    calls: Vec<RepoCall>,
    fail_save: Option<LookupKey>,
    fail_delete: Option<LookupKey>,
}

/// In-memory repository that records writes and can be told to fail.
#[derive(Debug, Clone)]
pub struct RecordingRepository<R> {
    inner: InMemoryRepository<R>,
    recorder: Arc<Mutex<Recorder>>,
}

impl<R: Record> RecordingRepository<R> {
    pub fn new(inner: InMemoryRepository<R>) -> Self {
        Self {
            inner,
            recorder: Arc::new(Mutex::new(Recorder::default())),
        }
    }

    pub fn inner(&self) -> &InMemoryRepository<R> {
        &self.inner
    }

    /// Fail `save` for the record with this key.
    pub fn fail_save_for(&self, key: impl Into<LookupKey>) {
        self.lock().fail_save = Some(key.into());
    }

    /// Fail `delete` for the record with this key.
    pub fn fail_delete_for(&self, key: impl Into<LookupKey>) {
        self.lock().fail_delete = Some(key.into());
    }

    /// Every write call so far, in order.
    pub fn calls(&self) -> Vec<RepoCall> {
        self.lock().calls.clone()
    }

    pub fn saves(&self) -> Vec<(LookupKey, Vec<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RepoCall::Save { key, fields } => Some((key, fields)),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<LookupKey> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RepoCall::Delete { key } => Some(key),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Recorder> {
        self.recorder.lock().unwrap_or_else(|err| err.into_inner())
    }

    fn key_of(&self, record: &R) -> LookupKey {
        record
            .lookup_key(self.inner.key_field())
            .unwrap_or_else(|| LookupKey::new(""))
    }
}

#[async_trait]
impl<R: Record> Repository<R> for RecordingRepository<R> {
    async fn bulk_create(&self, records: Vec<R>) -> StorageResult<Vec<R>> {
        self.lock().calls.push(RepoCall::BulkCreate {
            count: records.len(),
        });
        self.inner.bulk_create(records).await
    }

    async fn save(&self, record: &R, changed_fields: &[String]) -> StorageResult<()> {
        let key = self.key_of(record);
        {
            let mut recorder = self.lock();
            recorder.calls.push(RepoCall::Save {
                key: key.clone(),
                fields: changed_fields.to_vec(),
            });
            if recorder.fail_save.as_ref() == Some(&key) {
                return Err(StorageError::UpdateFailed {
                    resource: R::RESOURCE_NAME.to_string(),
                    key: key.to_string(),
                    reason: "injected failure".to_string(),
                });
            }
        }
        self.inner.save(record, changed_fields).await
    }

    async fn delete(&self, record: &R) -> StorageResult<()> {
        let key = self.key_of(record);
        {
            let mut recorder = self.lock();
            recorder.calls.push(RepoCall::Delete { key: key.clone() });
            if recorder.fail_delete.as_ref() == Some(&key) {
                return Err(StorageError::DeleteFailed {
                    resource: R::RESOURCE_NAME.to_string(),
                    key: key.to_string(),
                    reason: "injected failure".to_string(),
                });
            }
        }
        self.inner.delete(record).await
    }

    async fn get(&self, key: &LookupKey) -> StorageResult<Option<R>> {
        self.inner.get(key).await
    }

    async fn query_all(&self) -> StorageResult<Collection<R>> {
        self.inner.query_all().await
    }
}

// ============================================================================
// RECORDING HOOKS
// ============================================================================

/// Hook invocation observed by [`RecordingHooks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    BeforeDelete(LookupKey),
    AfterDelete(LookupKey),
}

/// Deletion hooks that log every call. Optionally refuse one key in
/// `before_delete`.
#[derive(Debug, Clone)]
pub struct RecordingHooks {
    lookup_field: String,
    events: Arc<Mutex<Vec<HookEvent>>>,
    refuse: Option<LookupKey>,
}

impl RecordingHooks {
    pub fn new(lookup_field: impl Into<String>) -> Self {
        Self {
            lookup_field: lookup_field.into(),
            events: Arc::new(Mutex::new(Vec::new())),
            refuse: None,
        }
    }

    pub fn refusing(mut self, key: impl Into<LookupKey>) -> Self {
        self.refuse = Some(key.into());
        self
    }

    pub fn events(&self) -> Vec<HookEvent> {
        self.events
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    fn push(&self, event: HookEvent) {
        self.events
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .push(event);
    }
}

#[async_trait]
impl<R: Record> BulkHooks<R> for RecordingHooks {
    async fn before_delete(&self, record: &R) -> ApiResult<()> {
        let key = record
            .lookup_key(&self.lookup_field)
            .unwrap_or_else(|| LookupKey::new(""));
        if self.refuse.as_ref() == Some(&key) {
            return Err(ApiError::validation_failed(format!(
                "{} {} is protected",
                R::RESOURCE_NAME,
                key
            )));
        }
        self.push(HookEvent::BeforeDelete(key));
        Ok(())
    }

    async fn after_delete(&self, record: &R) -> ApiResult<()> {
        let key = record
            .lookup_key(&self.lookup_field)
            .unwrap_or_else(|| LookupKey::new(""));
        self.push(HookEvent::AfterDelete(key));
        Ok(())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for payload items and widget batches.

    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    /// A name the widget schema accepts.
    pub fn arb_widget_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9 ]{0,15}"
    }

    /// A valid create item for [`Widget`].
    pub fn arb_valid_item() -> impl Strategy<Value = FieldSet> {
        (arb_widget_name(), proptest::option::of(0i64..1000)).prop_map(|(name, quantity)| {
            let mut item = FieldSet::new();
            item.insert("name".to_string(), json!(name));
            if let Some(quantity) = quantity {
                item.insert("quantity".to_string(), json!(quantity));
            }
            item
        })
    }

    /// A create item the widget schema rejects.
    pub fn arb_invalid_item() -> impl Strategy<Value = FieldSet> {
        prop_oneof![
            any::<i64>().prop_map(|n| fields(json!({"name": n}))),
            Just(fields(json!({"quantity": 1}))),
            Just(fields(json!({"name": ""}))),
            (i64::MIN..0).prop_map(|n| fields(json!({"name": "ok", "quantity": n}))),
            "[a-z]{33,40}".prop_map(|name| fields(json!({"name": name}))),
        ]
    }

    /// A batch of valid items.
    pub fn arb_valid_batch(max: usize) -> impl Strategy<Value = Vec<FieldSet>> {
        prop::collection::vec(arb_valid_item(), 0..max)
    }

    /// A batch with at least one invalid item, and the invalid positions.
    pub fn arb_mixed_batch(max: usize) -> impl Strategy<Value = (Vec<FieldSet>, Vec<usize>)> {
        prop::collection::vec(
            prop_oneof![
                3 => arb_valid_item().prop_map(|item| (item, false)),
                1 => arb_invalid_item().prop_map(|item| (item, true)),
            ],
            1..max.max(2),
        )
        .prop_filter("needs an invalid item", |items| items.iter().any(|(_, bad)| *bad))
        .prop_map(|items| {
            let invalid: Vec<usize> = items
                .iter()
                .enumerate()
                .filter_map(|(i, (_, bad))| bad.then_some(i))
                .collect();
            let items: Vec<FieldSet> = items.into_iter().map(|(item, _)| item).collect();
            (items, invalid)
        })
    }

    /// Widget names for a seeded repository.
    pub fn arb_seed_names(max: usize) -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(arb_widget_name(), 1..max.max(2))
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for common scenarios.

    use super::*;
    use bulkrest_api::ResourceState;

    /// Unsaved widget with only a name.
    pub fn widget(name: &str) -> Widget {
        Widget {
            id: None,
            name: name.to_string(),
            color: None,
            quantity: 0,
        }
    }

    /// Repository holding one widget per name, keyed 1..=n in order.
    pub fn seeded_repository(names: &[&str]) -> StorageResult<InMemoryRepository<Widget>> {
        InMemoryRepository::with_records("id", names.iter().map(|name| widget(name)).collect())
    }

    /// Router state over `repo` with the widget schema and default config.
    pub fn widget_state<P>(repo: P) -> ResourceState<Widget>
    where
        P: Repository<Widget> + 'static,
    {
        ResourceState::new(repo, widget_schema(), BulkConfig::default())
    }
}

/// Unwrap a JSON object into a payload item. Non-objects give an empty item.
pub fn fields(value: serde_json::Value) -> FieldSet {
    match value {
        serde_json::Value::Object(map) => map,
        _ => FieldSet::new(),
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions on bulk operation outcomes.

    use super::*;

    /// Assert a batch error marks exactly the items at `invalid` as failed.
    #[track_caller]
    pub fn assert_batch_errors(errors: &ValidationErrors, len: usize, invalid: &[usize]) {
        let ValidationErrors::Batch(items) = errors else {
            panic!("Expected batch errors, got: {:?}", errors);
        };
        assert_eq!(items.len(), len, "one error entry per item");
        for (i, item) in items.iter().enumerate() {
            assert_eq!(
                !item.is_empty(),
                invalid.contains(&i),
                "item {} error state mismatch: {:?}",
                i,
                item
            );
        }
    }

    /// Assert that storage holds exactly these widget names, in order.
    #[track_caller]
    pub fn assert_names(widgets: &[Widget], expected: &[&str]) {
        let names: Vec<&str> = widgets.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, expected);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bulkrest_core::Validator;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_seeded_repository_assigns_sequential_keys() -> StorageResult<()> {
        let repo = fixtures::seeded_repository(&["a", "b", "c"])?;
        let all = repo.snapshot().await;
        let ids: Vec<Option<i64>> = all.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_recording_repository_injects_delete_failure() -> StorageResult<()> {
        let repo = RecordingRepository::new(fixtures::seeded_repository(&["a", "b"])?);
        repo.fail_delete_for(2);
        let all = repo.query_all().await?;

        repo.delete(&all.as_slice()[0]).await?;
        let failed = repo.delete(&all.as_slice()[1]).await;
        assert!(matches!(failed, Err(StorageError::DeleteFailed { .. })));
        assert_eq!(repo.deletes(), vec![LookupKey::from(1), LookupKey::from(2)]);
        assert_eq!(repo.inner().count().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_recording_hooks_refuse_key() {
        let hooks = RecordingHooks::new("id").refusing(1);
        let mut w = fixtures::widget("a");
        w.id = Some(1);
        assert!(BulkHooks::<Widget>::before_delete(&hooks, &w).await.is_err());
        w.id = Some(2);
        assert!(BulkHooks::<Widget>::before_delete(&hooks, &w).await.is_ok());
        assert_eq!(hooks.events(), vec![HookEvent::BeforeDelete(LookupKey::from(2))]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_valid_items_pass_schema(item in generators::arb_valid_item()) {
            prop_assert!(widget_schema().validate_one(&item, false).is_ok());
        }

        #[test]
        fn prop_invalid_items_fail_schema(item in generators::arb_invalid_item()) {
            prop_assert!(widget_schema().validate_one(&item, false).is_err());
        }
    }
}
