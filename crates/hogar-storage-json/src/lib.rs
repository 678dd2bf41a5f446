//! Filesystem-backed [`DocumentStore`]: one pretty-printed JSON file per
//! collection, mapping document ids to their fields.

use std::{
    collections::BTreeMap,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use hogar_core::storage::{
    CollectionPath, Document, DocumentStore, StoreError, StoredDocument, WriteMode,
};
use tracing::debug;
use uuid::Uuid;

const COLLECTION_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

type CollectionFile = BTreeMap<String, Document>;

/// Stores collection `a/b/c` at `{root}/a/b/c.json`.
///
/// Writes go through a temp file and a rename. An in-process lock serialises
/// read-modify-write cycles; separate processes sharing a root are last write wins.
pub struct JsonDocumentStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(io_error)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_path(&self, collection: &CollectionPath) -> PathBuf {
        let mut path = self.root.clone();
        let segments = collection.segments();
        if let Some((last, parents)) = segments.split_last() {
            for segment in parents {
                path.push(canonical_segment(segment));
            }
            path.push(format!("{}.{}", canonical_segment(last), COLLECTION_EXTENSION));
        }
        path
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load(&self, collection: &CollectionPath) -> Result<CollectionFile, StoreError> {
        let path = self.collection_path(collection);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(CollectionFile::new()),
            Err(err) => return Err(io_error(err)),
        };
        serde_json::from_str(&data).map_err(|err| {
            StoreError::Serialization(format!("{}: {err}", path.display()))
        })
    }

    fn save(&self, collection: &CollectionPath, docs: &CollectionFile) -> Result<(), StoreError> {
        let path = self.collection_path(collection);
        let data = serde_json::to_string_pretty(docs)
            .map_err(|err| StoreError::Serialization(err.to_string()))?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &data).map_err(io_error)?;
        fs::rename(&tmp, &path).map_err(io_error)?;
        debug!(collection = %collection, documents = docs.len(), "collection saved");
        Ok(())
    }

    /// Loads, mutates and saves one collection under the write lock.
    fn modify<T>(
        &self,
        collection: &CollectionPath,
        apply: impl FnOnce(&mut CollectionFile) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.lock();
        let mut docs = self.load(collection)?;
        let result = apply(&mut docs)?;
        self.save(collection, &docs)?;
        Ok(result)
    }
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    fn backend_tag(&self) -> &'static str {
        "json"
    }

    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let mut docs = self.load(collection)?;
        Ok(docs.remove(id).map(|data| StoredDocument::new(id, data)))
    }

    async fn get_all(&self, collection: &CollectionPath) -> Result<Vec<StoredDocument>, StoreError> {
        Ok(self
            .load(collection)?
            .into_iter()
            .map(|(id, data)| StoredDocument::new(id, data))
            .collect())
    }

    async fn insert(&self, collection: &CollectionPath, data: Document) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        self.modify(collection, |docs| {
            docs.insert(id.clone(), data);
            Ok(())
        })?;
        Ok(id)
    }

    async fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        patch: Document,
    ) -> Result<(), StoreError> {
        self.modify(collection, |docs| {
            let existing = docs
                .get_mut(id)
                .ok_or_else(|| StoreError::not_found(collection, id))?;
            existing.extend(patch);
            Ok(())
        })
    }

    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: Document,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        self.modify(collection, |docs| {
            if mode == WriteMode::Merge {
                if let Some(existing) = docs.get_mut(id) {
                    existing.extend(data);
                    return Ok(());
                }
            }
            docs.insert(id.to_string(), data);
            Ok(())
        })
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError> {
        self.modify(collection, |docs| {
            docs.remove(id)
                .map(|_| ())
                .ok_or_else(|| StoreError::not_found(collection, id))
        })
    }
}

/// Percent-encodes every byte outside `[a-z0-9-]`, so distinct segments never
/// share a file, even on case-insensitive filesystems. The empty segment is `%`.
fn canonical_segment(segment: &str) -> String {
    if segment.is_empty() {
        return "%".into();
    }
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'-' => encoded.push(char::from(byte)),
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn io_error(err: io::Error) -> StoreError {
    if err.kind() == io::ErrorKind::PermissionDenied {
        StoreError::PermissionDenied(err.to_string())
    } else {
        StoreError::Transport(err.to_string())
    }
}
