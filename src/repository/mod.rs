//! Repository layer for equipment and category storage
//!
//! Every backend implements [`EquipmentStore`]; configuration decides which
//! one a [`Repository`] wraps, so routes and services never know where the
//! rows come from.

pub mod memory;
pub mod postgres;
pub mod supabase;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::{
    config::{AppConfig, StorageBackend},
    error::{AppError, AppResult},
    models::{
        category::Category,
        equipment::{Equipment, EquipmentChanges, EquipmentFilter, NewEquipment},
    },
};

/// Data-access interface shared by all persistence adapters
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    /// Categories ordered by name
    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    async fn create_category(&self, name: &str) -> AppResult<Category>;

    /// All items in store order
    async fn list_equipment(&self) -> AppResult<Vec<Equipment>>;

    async fn filter_equipment(&self, filter: &EquipmentFilter) -> AppResult<Vec<Equipment>>;

    async fn get_equipment(&self, id: Uuid) -> AppResult<Option<Equipment>>;

    async fn create_equipment(&self, data: &NewEquipment) -> AppResult<Equipment>;

    /// Returns `None` when no item has this id
    async fn update_equipment(
        &self,
        id: Uuid,
        changes: &EquipmentChanges,
    ) -> AppResult<Option<Equipment>>;

    /// Returns `false` when no item has this id
    async fn delete_equipment(&self, id: Uuid) -> AppResult<bool>;

    /// Cheap round trip used by the readiness check
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding the active store
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn EquipmentStore>,
    backend: StorageBackend,
}

impl Repository {
    /// Wrap an already constructed store
    pub fn new(store: Arc<dyn EquipmentStore>, backend: StorageBackend) -> Self {
        Self { store, backend }
    }

    /// Repository backed by an in-process store
    pub fn memory(store: memory::MemoryStore) -> Self {
        Self::new(Arc::new(store), StorageBackend::Memory)
    }

    /// Build the store selected by `storage.backend`
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        let backend = config.storage.backend;
        let store: Arc<dyn EquipmentStore> = match backend {
            StorageBackend::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.database.max_connections)
                    .min_connections(config.database.min_connections)
                    .connect(&config.database.url)
                    .await?;
                tracing::info!("Connected to database");

                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .map_err(sqlx::Error::from)?;
                tracing::info!("Database migrations completed");

                Arc::new(postgres::PgStore::new(pool))
            }
            StorageBackend::Supabase => {
                let client = supabase::SupabaseClient::new(&config.supabase)?;
                tracing::info!("Using Supabase at {}", config.supabase.url);
                Arc::new(supabase::SupabaseStore::new(client))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage, data is lost on restart");
                if config.storage.seed_sample_data {
                    Arc::new(memory::MemoryStore::with_sample_data())
                } else {
                    Arc::new(memory::MemoryStore::new())
                }
            }
        };

        Ok(Self::new(store, backend))
    }

    pub fn backend(&self) -> StorageBackend {
        self.backend
    }
}

impl Deref for Repository {
    type Target = dyn EquipmentStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}

/// Map a write failure to a validation error when the store rejected the
/// row itself (unknown category, constraint, duplicate).
pub(crate) fn classify_sqlx_write_error(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = error {
        if db.is_foreign_key_violation() {
            return AppError::Validation("Unknown category_id".to_string());
        }
        if db.is_check_violation() {
            return AppError::Validation(format!("Rejected by store: {}", db.message()));
        }
        if db.is_unique_violation() {
            return AppError::Validation("Category already exists".to_string());
        }
    }
    AppError::Database(error)
}
