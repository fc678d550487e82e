//! In-memory repository
//!
//! Reference [`Repository`] used by the demo server and the test suites.
//! Records are kept in insertion order behind a `tokio` read-write lock.
//! Integer keys are generated for records created without one.

use std::sync::Arc;

use async_trait::async_trait;
use bulkrest_core::{LookupKey, Record, StorageError, StorageResult, DEFAULT_LOOKUP_FIELD};
use serde_json::json;
use tokio::sync::RwLock;

use crate::collection::Collection;
use crate::repository::Repository;

#[derive(Debug)]
struct Table<R> {
    rows: Vec<R>,
    /// `None` once a key of `i64::MAX` has been taken.
    next_key: Option<i64>,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_key: Some(1),
        }
    }
}

/// In-memory storage for one resource.
#[derive(Debug)]
pub struct InMemoryRepository<R> {
    key_field: String,
    table: Arc<RwLock<Table<R>>>,
}

impl<R> Clone for InMemoryRepository<R> {
    fn clone(&self) -> Self {
        Self {
            key_field: self.key_field.clone(),
            table: Arc::clone(&self.table),
        }
    }
}

impl<R: Record> Default for InMemoryRepository<R> {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_FIELD)
    }
}

impl<R: Record> InMemoryRepository<R> {
    /// Create an empty repository keyed by `key_field`.
    pub fn new(key_field: impl Into<String>) -> Self {
        Self {
            key_field: key_field.into(),
            table: Arc::new(RwLock::new(Table::default())),
        }
    }

    /// Create a repository pre-populated with `records`.
    pub fn with_records(key_field: impl Into<String>, records: Vec<R>) -> StorageResult<Self> {
        let key_field = key_field.into();
        let mut table = Table::default();
        insert_all(&mut table, &key_field, records)?;
        Ok(Self {
            key_field,
            table: Arc::new(RwLock::new(table)),
        })
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    /// Number of stored records.
    pub async fn count(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// Copy of every stored record, in insertion order.
    pub async fn snapshot(&self) -> Vec<R> {
        self.table.read().await.rows.clone()
    }

    /// Remove all stored records. Key generation continues where it left off.
    pub async fn clear(&self) {
        self.table.write().await.rows.clear();
    }

    fn key_of(&self, record: &R) -> StorageResult<LookupKey> {
        record
            .lookup_key(&self.key_field)
            .ok_or_else(|| StorageError::MissingKey {
                resource: R::RESOURCE_NAME.to_string(),
                field: self.key_field.clone(),
            })
    }
}

/// Assign keys and append `records`, or change nothing on error.
fn insert_all<R: Record>(
    table: &mut Table<R>,
    key_field: &str,
    records: Vec<R>,
) -> StorageResult<Vec<R>> {
    let mut next_key = table.next_key;
    let mut seen: Vec<LookupKey> = table
        .rows
        .iter()
        .filter_map(|row| row.lookup_key(key_field))
        .collect();
    let mut prepared = Vec::with_capacity(records.len());

    for mut record in records {
        let key = match record.lookup_key(key_field) {
            Some(key) => {
                if let Ok(explicit) = key.as_str().parse::<i64>() {
                    next_key = match explicit.checked_add(1) {
                        Some(after) => next_key.map(|next| next.max(after)),
                        None => None,
                    };
                }
                key
            }
            None => {
                let generated = next_key.ok_or_else(|| StorageError::InsertFailed {
                    resource: R::RESOURCE_NAME.to_string(),
                    reason: format!("{} sequence is exhausted", key_field),
                })?;
                next_key = generated.checked_add(1);
                record
                    .set_field(key_field, json!(generated))
                    .map_err(|e| StorageError::InsertFailed {
                        resource: R::RESOURCE_NAME.to_string(),
                        reason: e.to_string(),
                    })?;
                LookupKey::from(generated)
            }
        };

        if seen.contains(&key) {
            return Err(StorageError::InsertFailed {
                resource: R::RESOURCE_NAME.to_string(),
                reason: format!("{} {} already exists", key_field, key),
            });
        }
        seen.push(key);
        prepared.push(record);
    }

    table.next_key = next_key;
    table.rows.extend(prepared.iter().cloned());
    Ok(prepared)
}

#[async_trait]
impl<R: Record> Repository<R> for InMemoryRepository<R> {
    async fn bulk_create(&self, records: Vec<R>) -> StorageResult<Vec<R>> {
        let mut table = self.table.write().await;
        insert_all(&mut table, &self.key_field, records)
    }

    async fn save(&self, record: &R, changed_fields: &[String]) -> StorageResult<()> {
        let key = self.key_of(record)?;
        let mut table = self.table.write().await;
        let stored = table
            .rows
            .iter_mut()
            .find(|row| row.lookup_key(&self.key_field).as_ref() == Some(&key))
            .ok_or_else(|| StorageError::NotFound {
                resource: R::RESOURCE_NAME.to_string(),
                key: key.to_string(),
            })?;

        // Apply to a copy so a failing field leaves the stored row untouched.
        let mut updated = stored.clone();
        for field in changed_fields {
            let value = record.field(field).ok_or_else(|| StorageError::UpdateFailed {
                resource: R::RESOURCE_NAME.to_string(),
                key: key.to_string(),
                reason: format!("record has no field '{}'", field),
            })?;
            updated
                .set_field(field, value)
                .map_err(|e| StorageError::UpdateFailed {
                    resource: R::RESOURCE_NAME.to_string(),
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
        }
        *stored = updated;
        Ok(())
    }

    async fn delete(&self, record: &R) -> StorageResult<()> {
        let key = self.key_of(record)?;
        let mut table = self.table.write().await;
        let position = table
            .rows
            .iter()
            .position(|row| row.lookup_key(&self.key_field).as_ref() == Some(&key))
            .ok_or_else(|| StorageError::NotFound {
                resource: R::RESOURCE_NAME.to_string(),
                key: key.to_string(),
            })?;
        table.rows.remove(position);
        Ok(())
    }

    async fn get(&self, key: &LookupKey) -> StorageResult<Option<R>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .find(|row| row.lookup_key(&self.key_field).as_ref() == Some(key))
            .cloned())
    }

    async fn query_all(&self) -> StorageResult<Collection<R>> {
        let table = self.table.read().await;
        Ok(Collection::new(table.rows.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulkrest_core::FilterCriteria;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Book {
        id: Option<i64>,
        title: String,
        pages: i64,
    }

    impl Record for Book {
        const RESOURCE_NAME: &'static str = "book";
    }

    fn book(title: &str, pages: i64) -> Book {
        Book {
            id: None,
            title: title.to_string(),
            pages,
        }
    }

    #[tokio::test]
    async fn test_bulk_create_assigns_keys_in_order() -> StorageResult<()> {
        let repo = InMemoryRepository::<Book>::new("id");
        let created = repo
            .bulk_create(vec![book("a", 1), book("b", 2)])
            .await?;
        assert_eq!(created[0].id, Some(1));
        assert_eq!(created[1].id, Some(2));
        assert_eq!(repo.count().await, 2);

        let more = repo.create(book("c", 3)).await?;
        assert_eq!(more.id, Some(3));
        Ok(())
    }

    #[tokio::test]
    async fn test_explicit_keys_advance_sequence() -> StorageResult<()> {
        let mut explicit = book("x", 1);
        explicit.id = Some(10);
        let repo = InMemoryRepository::with_records("id", vec![explicit])?;
        let created = repo.create(book("y", 2)).await?;
        assert_eq!(created.id, Some(11));
        Ok(())
    }

    #[tokio::test]
    async fn test_key_sequence_exhaustion_is_an_insert_error() -> StorageResult<()> {
        let mut last = book("last", 1);
        last.id = Some(i64::MAX);
        let repo = InMemoryRepository::with_records("id", vec![last])?;

        let result = repo.create(book("overflow", 2)).await;
        assert!(matches!(result, Err(StorageError::InsertFailed { .. })));
        assert_eq!(repo.count().await, 1);

        let mut keyed = book("keyed", 3);
        keyed.id = Some(5);
        assert_eq!(repo.create(keyed).await?.id, Some(5));
        Ok(())
    }

    #[tokio::test]
    async fn test_last_key_can_still_be_generated() -> StorageResult<()> {
        let mut near = book("near", 1);
        near.id = Some(i64::MAX - 1);
        let repo = InMemoryRepository::with_records("id", vec![near])?;

        assert_eq!(repo.create(book("max", 2)).await?.id, Some(i64::MAX));
        assert!(repo.create(book("past", 3)).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_bulk_create_is_all_or_nothing() -> StorageResult<()> {
        let mut existing = book("x", 1);
        existing.id = Some(1);
        let repo = InMemoryRepository::with_records("id", vec![existing.clone()])?;

        let result = repo.bulk_create(vec![book("new", 5), existing]).await;
        assert!(matches!(result, Err(StorageError::InsertFailed { .. })));
        assert_eq!(repo.count().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_writes_only_changed_fields() -> StorageResult<()> {
        let repo = InMemoryRepository::<Book>::new("id");
        let stored = repo.create(book("draft", 10)).await?;

        let mut changed = stored.clone();
        changed.title = "final".to_string();
        changed.pages = 999;
        repo.save(&changed, &["title".to_string()]).await?;

        let reloaded = repo.get(&LookupKey::from(1)).await?;
        assert_eq!(
            reloaded,
            Some(Book {
                id: Some(1),
                title: "final".to_string(),
                pages: 10,
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_save_missing_record_is_not_found() {
        let repo = InMemoryRepository::<Book>::new("id");
        let mut ghost = book("ghost", 0);
        ghost.id = Some(42);
        let result = repo.save(&ghost, &["title".to_string()]).await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_removes_record() -> StorageResult<()> {
        let repo = InMemoryRepository::<Book>::new("id");
        let created = repo.bulk_create(vec![book("a", 1), book("b", 2)]).await?;
        repo.delete(&created[0]).await?;
        assert_eq!(repo.count().await, 1);
        assert!(repo.get(&LookupKey::from(1)).await?.is_none());

        let again = repo.delete(&created[0]).await;
        assert!(matches!(again, Err(StorageError::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_without_key_is_error() {
        let repo = InMemoryRepository::<Book>::new("id");
        let result = repo.delete(&book("unsaved", 1)).await;
        assert!(matches!(result, Err(StorageError::MissingKey { .. })));
    }

    #[tokio::test]
    async fn test_query_all_returns_fresh_collections() -> StorageResult<()> {
        let repo = InMemoryRepository::<Book>::new("id");
        repo.bulk_create(vec![book("a", 1), book("b", 2)]).await?;
        let first = repo.query_all().await?;
        let second = repo.query_all().await?;
        assert!(!first.is_same(&second));

        let filtered = repo.filter(&first, &FilterCriteria::new().eq("title", "b"));
        assert_eq!(filtered.len(), 1);
        assert!(!filtered.is_same(&first));
        Ok(())
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Option<i64>,
        body: String,
    }

    impl Record for Note {
        const RESOURCE_NAME: &'static str = "note";
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Every created record gets a distinct key and is stored once.
        #[test]
        fn prop_bulk_create_keys_are_unique(bodies in prop::collection::vec("[a-z]{1,8}", 0..20)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            let repo = InMemoryRepository::<Note>::new("id");
            let notes: Vec<Note> = bodies
                .iter()
                .map(|body| Note { id: None, body: body.clone() })
                .collect();

            let created = runtime
                .block_on(repo.bulk_create(notes))
                .map_err(|e| TestCaseError::fail(e.to_string()))?;

            let mut keys: Vec<i64> = created.iter().filter_map(|n| n.id).collect();
            prop_assert_eq!(keys.len(), bodies.len());
            keys.sort_unstable();
            keys.dedup();
            prop_assert_eq!(keys.len(), bodies.len());
            prop_assert_eq!(runtime.block_on(repo.count()), bodies.len());
        }
    }
}
