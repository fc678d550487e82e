//! Identity-tracked record collections
//!
//! A bulk destroy must tell "the whole collection" apart from "a filtered
//! view of it". Collections therefore carry an identity: cloning keeps it,
//! every derivation (filtering, re-scoping) mints a fresh one. Two
//! collections are the same collection only if their identities are equal,
//! regardless of their contents.

use std::sync::Arc;

use bulkrest_core::{FilterCriteria, LookupKey, Record};
use uuid::Uuid;

/// Identity of a collection instance (UUIDv7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(Uuid);

impl CollectionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CollectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CollectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, immutable set of records with an identity.
#[derive(Debug)]
pub struct Collection<R> {
    id: CollectionId,
    records: Arc<Vec<R>>,
}

impl<R> Clone for Collection<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            records: Arc::clone(&self.records),
        }
    }
}

impl<R> Collection<R> {
    /// Wrap records in a new collection with a fresh identity.
    pub fn new(records: Vec<R>) -> Self {
        Self {
            id: CollectionId::new(),
            records: Arc::new(records),
        }
    }

    pub fn id(&self) -> CollectionId {
        self.id
    }

    /// Identity comparison. Contents are not inspected.
    pub fn is_same(&self, other: &Collection<R>) -> bool {
        self.id == other.id
    }

    /// A new collection, with its own identity, derived from this one.
    pub fn derive(&self, records: Vec<R>) -> Self {
        Self::new(records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[R] {
        &self.records
    }
}

impl<R: Clone> Collection<R> {
    pub fn to_vec(&self) -> Vec<R> {
        self.records.as_ref().clone()
    }
}

impl<R: Record> Collection<R> {
    /// Derive the subset matching `criteria`. Always a distinct collection,
    /// even when every record matches.
    pub fn filter(&self, criteria: &FilterCriteria) -> Self {
        self.derive(
            self.records
                .iter()
                .filter(|record| criteria.matches(*record))
                .cloned()
                .collect(),
        )
    }

    /// First record whose `lookup_field` equals `key`.
    pub fn find(&self, lookup_field: &str, key: &LookupKey) -> Option<&R> {
        self.records
            .iter()
            .find(|record| record.lookup_key(lookup_field).as_ref() == Some(key))
    }
}

impl<'a, R> IntoIterator for &'a Collection<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
