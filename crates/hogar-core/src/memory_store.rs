//! In-process [`DocumentStore`] used by tests and single-session tooling.

use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use uuid::Uuid;

use crate::storage::{CollectionPath, Document, DocumentStore, StoreError, StoredDocument, WriteMode};

type Collections = BTreeMap<CollectionPath, BTreeMap<String, Document>>;

/// Keeps every collection in memory behind a mutex.
///
/// `fail_writes_after` makes later writes fail with a transport error so
/// callers can observe partially applied multi-step operations.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<Collections>,
    writes_left: Mutex<Option<usize>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows `count` more successful writes; every write after that fails.
    pub fn fail_writes_after(&self, count: usize) {
        if let Ok(mut guard) = self.writes_left.lock() {
            *guard = Some(count);
        }
    }

    /// Lifts any pending write failure.
    pub fn heal(&self) {
        if let Ok(mut guard) = self.writes_left.lock() {
            *guard = None;
        }
    }

    pub fn document_count(&self, collection: &CollectionPath) -> usize {
        self.collections
            .lock()
            .map(|guard| guard.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Transport("memory store lock poisoned".into()))
    }

    fn consume_write(&self) -> Result<(), StoreError> {
        let mut guard = self
            .writes_left
            .lock()
            .map_err(|_| StoreError::Transport("memory store lock poisoned".into()))?;
        match guard.as_mut() {
            Some(0) => Err(StoreError::Transport("injected write failure".into())),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| StoredDocument::new(id, data.clone())))
    }

    async fn get_all(&self, collection: &CollectionPath) -> Result<Vec<StoredDocument>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| StoredDocument::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(&self, collection: &CollectionPath, data: Document) -> Result<String, StoreError> {
        self.consume_write()?;
        let id = Uuid::new_v4().simple().to_string();
        let mut guard = self.lock()?;
        guard
            .entry(collection.clone())
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }

    async fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        patch: Document,
    ) -> Result<(), StoreError> {
        self.consume_write()?;
        let mut guard = self.lock()?;
        let existing = guard
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        existing.extend(patch);
        Ok(())
    }

    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: Document,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        self.consume_write()?;
        let mut guard = self.lock()?;
        let docs = guard.entry(collection.clone()).or_default();
        if mode == WriteMode::Merge {
            if let Some(existing) = docs.get_mut(id) {
                existing.extend(data);
                return Ok(());
            }
        }
        docs.insert(id.to_string(), data);
        Ok(())
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError> {
        self.consume_write()?;
        let mut guard = self.lock()?;
        guard
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(collection, id))
    }
}
