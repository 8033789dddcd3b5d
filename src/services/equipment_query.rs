//! Equipment listing, filtering and sorting

use uuid::Uuid;

use super::parse_uuid;
use crate::{
    error::{AppError, AppResult},
    models::equipment::{Equipment, EquipmentFilter, EquipmentFilterRequest, SortOrder},
    repository::Repository,
};

/// Category value meaning "no filter"
const ALL_CATEGORIES: &str = "All";

#[derive(Clone)]
pub struct EquipmentQueryService {
    repository: Repository,
}

impl EquipmentQueryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List equipment matching a filter request
    pub async fn list(&self, request: &EquipmentFilterRequest) -> AppResult<Vec<Equipment>> {
        let filter = resolve_filter(request)?;
        self.list_filtered(&filter).await
    }

    pub async fn list_filtered(&self, filter: &EquipmentFilter) -> AppResult<Vec<Equipment>> {
        tracing::debug!(
            category_id = ?filter.category_id,
            sort_order = filter.sort_order.as_str(),
            "Filtering equipment"
        );
        let items = self.repository.filter_equipment(filter).await?;
        tracing::debug!("Filter returned {} items", items.len());
        Ok(items)
    }

    /// Every item, in store order
    pub async fn list_all(&self) -> AppResult<Vec<Equipment>> {
        self.repository.list_equipment().await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Equipment> {
        self.repository
            .get_equipment(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }
}

/// Turn a raw filter request into a store filter.
///
/// `sort_order` accepts `none`, `high-low`, `low-high`, and the `asc`/`desc`
/// pair used together with `sort_by = "price"`.
pub fn resolve_filter(request: &EquipmentFilterRequest) -> AppResult<EquipmentFilter> {
    let category_id = match request.category_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) if value.eq_ignore_ascii_case(ALL_CATEGORIES) => None,
        Some(value) => Some(parse_uuid("category_id", value)?),
    };

    if let Some(field) = request.sort_by.as_deref().map(str::trim) {
        if !field.is_empty() && !field.eq_ignore_ascii_case("price") {
            return Err(AppError::Validation(format!("Unsupported sort field: {}", field)));
        }
    }

    let sort_order = match request.sort_order.as_deref().map(|s| s.trim().to_lowercase()) {
        None => SortOrder::None,
        Some(order) => match order.as_str() {
            "" | "none" => SortOrder::None,
            "high-low" | "desc" => SortOrder::HighLow,
            "low-high" | "asc" => SortOrder::LowHigh,
            other => {
                return Err(AppError::Validation(format!("Unsupported sort order: {}", other)))
            }
        },
    };

    Ok(EquipmentFilter {
        category_id,
        sort_order,
    })
}
