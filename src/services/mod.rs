//! Business logic services

pub mod categories;
pub mod equipment_commands;
pub mod equipment_query;
pub mod uploads;

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::{
    config::UploadsConfig,
    error::{AppError, AppResult},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub equipment_query: equipment_query::EquipmentQueryService,
    pub equipment_commands: equipment_commands::EquipmentCommandService,
    pub categories: categories::CategoriesService,
    pub uploads: uploads::UploadService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, uploads_config: UploadsConfig) -> Self {
        Self {
            equipment_query: equipment_query::EquipmentQueryService::new(repository.clone()),
            equipment_commands: equipment_commands::EquipmentCommandService::new(repository.clone()),
            categories: categories::CategoriesService::new(repository.clone()),
            uploads: uploads::UploadService::new(uploads_config),
            repository,
        }
    }

    /// Round trip to the active store
    pub async fn ping_store(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

static UUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("UUID pattern is valid")
});

/// Parse a hyphenated UUID, naming the offending field on failure
pub(crate) fn parse_uuid(field: &str, value: &str) -> AppResult<Uuid> {
    let value = value.trim();
    if !UUID_PATTERN.is_match(value) {
        return Err(AppError::Validation(format!("Invalid {} format", field)));
    }
    Uuid::parse_str(value).map_err(|_| AppError::Validation(format!("Invalid {} format", field)))
}
