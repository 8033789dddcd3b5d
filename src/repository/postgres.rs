//! Postgres adapter calling the stored procedures from `migrations/`

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{classify_sqlx_write_error, EquipmentStore};
use crate::{
    error::AppResult,
    models::{
        category::Category,
        equipment::{Equipment, EquipmentChanges, EquipmentFilter, NewEquipment},
    },
};

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EquipmentStore for PgStore {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at FROM item_categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_category(&self, name: &str) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO item_categories (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(classify_sqlx_write_error)
    }

    async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>("SELECT * FROM get_all_items()")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn filter_equipment(&self, filter: &EquipmentFilter) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>("SELECT * FROM get_filtered_items($1, $2)")
            .bind(filter.category_id)
            .bind(filter.sort_order.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_equipment(&self, id: Uuid) -> AppResult<Option<Equipment>> {
        let row = sqlx::query_as::<_, Equipment>("SELECT * FROM get_item($1)")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_equipment(&self, data: &NewEquipment) -> AppResult<Equipment> {
        let id: Uuid = sqlx::query_scalar("SELECT add_item($1, $2, $3, $4, $5, $6, $7, $8)")
            .bind(&data.name)
            .bind(&data.brand)
            .bind(data.category_id)
            .bind(data.price)
            .bind(&data.description)
            .bind(data.condition)
            .bind(&data.image_filename)
            .bind(data.quantity)
            .fetch_one(&self.pool)
            .await
            .map_err(classify_sqlx_write_error)?;

        let row = sqlx::query_as::<_, Equipment>("SELECT * FROM get_item($1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_equipment(
        &self,
        id: Uuid,
        changes: &EquipmentChanges,
    ) -> AppResult<Option<Equipment>> {
        let found: bool =
            sqlx::query_scalar("SELECT update_item($1, $2, $3, $4, $5, $6, $7, $8, $9)")
                .bind(id)
                .bind(&changes.name)
                .bind(&changes.brand)
                .bind(changes.category_id)
                .bind(changes.price)
                .bind(&changes.description)
                .bind(changes.condition)
                .bind(&changes.image_filename)
                .bind(changes.quantity)
                .fetch_one(&self.pool)
                .await
                .map_err(classify_sqlx_write_error)?;

        if !found {
            return Ok(None);
        }
        self.get_equipment(id).await
    }

    async fn delete_equipment(&self, id: Uuid) -> AppResult<bool> {
        let found: bool = sqlx::query_scalar("SELECT delete_item($1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
