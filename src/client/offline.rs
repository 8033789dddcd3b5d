//! Local persistence for offline use
//!
//! A [`KeyValueStore`] holds string values by key. On top of it,
//! [`PendingQueue`] keeps the ordered journal of writes made while the
//! server was unreachable and [`EquipmentCache`] keeps the last listing
//! seen from the server.

use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use super::ClientError;
use crate::models::{equipment::Equipment, pending_operation::PendingOperation};

/// Key of the pending-operation journal
pub const PENDING_OPERATIONS_KEY: &str = "pendingOperations";

/// Key of the cached equipment listing
pub const EQUIPMENT_KEY: &str = "equipment";

/// String storage keyed by name
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, ClientError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;

    async fn remove(&self, key: &str) -> Result<(), ClientError>;
}

/// One JSON file per key under a directory
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        match tokio::fs::read_to_string(self.path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        // Write then rename so a crash never leaves a half-written value
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, self.path(key)).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ClientError> {
        match tokio::fs::remove_file(self.path(key)).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Volatile store, mostly for tests
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// Read a JSON list; a value that does not parse counts as empty
async fn read_list<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Vec<T>, ClientError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(&raw) {
        Ok(list) => Ok(list),
        Err(e) => {
            tracing::warn!("Discarding unreadable {} entry: {}", key, e);
            Ok(Vec::new())
        }
    }
}

async fn write_list<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    list: &[T],
) -> Result<(), ClientError> {
    let raw = serde_json::to_string(list)?;
    store.set(key, &raw).await
}

/// Ordered journal of writes not yet confirmed by the server
#[derive(Clone)]
pub struct PendingQueue {
    store: Arc<dyn KeyValueStore>,
    /// Serializes read-modify-write cycles on the journal
    lock: Arc<Mutex<()>>,
}

impl PendingQueue {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Append an operation at the tail
    pub async fn enqueue(&self, operation: PendingOperation) -> Result<(), ClientError> {
        let _guard = self.lock.lock().await;
        let mut operations: Vec<PendingOperation> =
            read_list(self.store.as_ref(), PENDING_OPERATIONS_KEY).await?;
        operations.push(operation);
        write_list(self.store.as_ref(), PENDING_OPERATIONS_KEY, &operations).await?;
        tracing::debug!("Queued operation, {} pending", operations.len());
        Ok(())
    }

    /// All operations in enqueue order. The journal is left untouched.
    pub async fn drain(&self) -> Result<Vec<PendingOperation>, ClientError> {
        let _guard = self.lock.lock().await;
        read_list(self.store.as_ref(), PENDING_OPERATIONS_KEY).await
    }

    /// Overwrite the journal, e.g. with what is left after a partial replay
    pub async fn replace(&self, operations: &[PendingOperation]) -> Result<(), ClientError> {
        let _guard = self.lock.lock().await;
        if operations.is_empty() {
            return self.store.remove(PENDING_OPERATIONS_KEY).await;
        }
        write_list(self.store.as_ref(), PENDING_OPERATIONS_KEY, operations).await
    }

    pub async fn clear(&self) -> Result<(), ClientError> {
        self.replace(&[]).await
    }

    pub async fn len(&self) -> Result<usize, ClientError> {
        Ok(self.drain().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool, ClientError> {
        Ok(self.len().await? == 0)
    }
}

/// Last equipment listing received from the server
#[derive(Clone)]
pub struct EquipmentCache {
    store: Arc<dyn KeyValueStore>,
}

impl EquipmentCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn store_equipment(&self, equipment: &[Equipment]) -> Result<(), ClientError> {
        write_list(self.store.as_ref(), EQUIPMENT_KEY, equipment).await
    }

    pub async fn cached_equipment(&self) -> Result<Vec<Equipment>, ClientError> {
        read_list(self.store.as_ref(), EQUIPMENT_KEY).await
    }
}
