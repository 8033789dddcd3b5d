//! Supabase adapter over the PostgREST API, using the service_role key

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

use super::EquipmentStore;
use crate::{
    config::SupabaseConfig,
    error::{AppError, AppResult},
    models::{
        category::Category,
        equipment::{Condition, Equipment, EquipmentChanges, EquipmentFilter, NewEquipment, SortOrder},
    },
};

const ITEMS: &str = "items";
const CATEGORIES: &str = "item_categories";
const ITEM_SELECT: &str = "select=*,item_categories(name)";

/// Supabase REST client for server-side database operations.
/// The service_role key bypasses RLS, so it never leaves the server.
#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_role_key: String,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        if config.url.is_empty() || config.service_role_key.is_empty() {
            return Err(SupabaseError::NotConfigured);
        }
        Ok(Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            service_role_key: config.service_role_key.clone(),
        })
    }

    /// Get the REST API URL for a table
    fn rest_url(&self, table: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}/rest/v1/{}", self.base_url, table)
        } else {
            format!("{}/rest/v1/{}?{}", self.base_url, table, query)
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", self.service_role_key))
            .header("Content-Type", "application/json")
    }

    async fn rows<R: DeserializeOwned>(response: Response) -> Result<Vec<R>, SupabaseError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(SupabaseError::Parse)
    }

    /// Authenticated GET
    pub async fn get<R: DeserializeOwned>(
        &self,
        table: &str,
        query: &str,
    ) -> Result<Vec<R>, SupabaseError> {
        let response = self
            .authorized(self.client.get(self.rest_url(table, query)))
            .send()
            .await?;
        Self::rows(response).await
    }

    /// Authenticated POST (insert), returning the inserted row
    pub async fn insert<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        query: &str,
        data: &T,
    ) -> Result<R, SupabaseError> {
        let response = self
            .authorized(self.client.post(self.rest_url(table, query)))
            .header("Prefer", "return=representation")
            .json(data)
            .send()
            .await?;

        // PostgREST returns an array, get first element
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or(SupabaseError::NoRowReturned)
    }

    /// Authenticated PATCH (update), returning the updated rows
    pub async fn update<T: Serialize, R: DeserializeOwned>(
        &self,
        table: &str,
        query: &str,
        data: &T,
    ) -> Result<Vec<R>, SupabaseError> {
        let response = self
            .authorized(self.client.patch(self.rest_url(table, query)))
            .header("Prefer", "return=representation")
            .json(data)
            .send()
            .await?;
        Self::rows(response).await
    }

    /// Authenticated DELETE, returning the deleted rows
    pub async fn delete<R: DeserializeOwned>(
        &self,
        table: &str,
        query: &str,
    ) -> Result<Vec<R>, SupabaseError> {
        let response = self
            .authorized(self.client.delete(self.rest_url(table, query)))
            .header("Prefer", "return=representation")
            .send()
            .await?;
        Self::rows(response).await
    }
}

/// Supabase errors
#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(reqwest::Error),

    #[error("No row returned from insert")]
    NoRowReturned,

    #[error("supabase.url and supabase.service_role_key must be set")]
    NotConfigured,
}

impl SupabaseError {
    /// Postgres SQLSTATE carried in a PostgREST error body, if any
    fn sql_state(&self) -> Option<String> {
        #[derive(Deserialize)]
        struct ApiErrorBody {
            code: Option<String>,
        }

        match self {
            SupabaseError::Api { body, .. } => serde_json::from_str::<ApiErrorBody>(body)
                .ok()
                .and_then(|b| b.code),
            _ => None,
        }
    }
}

fn classify_write_error(error: SupabaseError) -> AppError {
    match error.sql_state().as_deref() {
        Some("23503") => AppError::Validation("Unknown category_id".to_string()),
        Some("23514") => AppError::Validation("Rejected by store".to_string()),
        Some("23505") => AppError::Validation("Category already exists".to_string()),
        _ => AppError::Supabase(error),
    }
}

#[derive(Debug, Deserialize)]
struct CategoryRef {
    name: String,
}

/// Row of `items` with the embedded category
#[derive(Debug, Deserialize)]
struct ItemRow {
    id: Uuid,
    name: String,
    brand: String,
    category_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    description: Option<String>,
    condition: Condition,
    image_filename: Option<String>,
    #[serde(default)]
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    item_categories: Option<CategoryRef>,
}

impl From<ItemRow> for Equipment {
    fn from(row: ItemRow) -> Self {
        Equipment {
            id: row.id,
            name: row.name,
            brand: row.brand,
            category_id: row.category_id,
            category_name: row.item_categories.map(|c| c.name),
            price: row.price,
            description: row.description,
            condition: row.condition,
            image_filename: row.image_filename,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct ItemInsert<'a> {
    name: &'a str,
    brand: &'a str,
    category_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    description: Option<&'a str>,
    condition: Condition,
    image_filename: Option<&'a str>,
    quantity: i32,
}

#[derive(Debug, Serialize)]
struct ItemPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brand: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category_id: Option<Uuid>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_filename: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<i32>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct CategoryInsert<'a> {
    name: &'a str,
}

/// Builds the PostgREST query string for a filtered listing
fn filter_query(filter: &EquipmentFilter) -> String {
    let mut query = ITEM_SELECT.to_string();
    if let Some(category_id) = filter.category_id {
        query.push_str(&format!("&category_id=eq.{}", category_id));
    }
    let order = match filter.sort_order {
        SortOrder::None => "created_at.asc,id.asc",
        SortOrder::HighLow => "price.desc,created_at.asc",
        SortOrder::LowHigh => "price.asc,created_at.asc",
    };
    query.push_str("&order=");
    query.push_str(order);
    query
}

#[derive(Clone)]
pub struct SupabaseStore {
    client: SupabaseClient,
}

impl SupabaseStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EquipmentStore for SupabaseStore {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows = self
            .client
            .get(CATEGORIES, "select=id,name,created_at&order=name.asc")
            .await?;
        Ok(rows)
    }

    async fn create_category(&self, name: &str) -> AppResult<Category> {
        self.client
            .insert(CATEGORIES, "select=id,name,created_at", &CategoryInsert { name })
            .await
            .map_err(classify_write_error)
    }

    async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        self.filter_equipment(&EquipmentFilter::default()).await
    }

    async fn filter_equipment(&self, filter: &EquipmentFilter) -> AppResult<Vec<Equipment>> {
        let rows: Vec<ItemRow> = self.client.get(ITEMS, &filter_query(filter)).await?;
        Ok(rows.into_iter().map(Equipment::from).collect())
    }

    async fn get_equipment(&self, id: Uuid) -> AppResult<Option<Equipment>> {
        let query = format!("{}&id=eq.{}&limit=1", ITEM_SELECT, id);
        let rows: Vec<ItemRow> = self.client.get(ITEMS, &query).await?;
        Ok(rows.into_iter().next().map(Equipment::from))
    }

    async fn create_equipment(&self, data: &NewEquipment) -> AppResult<Equipment> {
        let insert = ItemInsert {
            name: &data.name,
            brand: &data.brand,
            category_id: data.category_id,
            price: data.price,
            description: data.description.as_deref(),
            condition: data.condition,
            image_filename: data.image_filename.as_deref(),
            quantity: data.quantity,
        };
        let row: ItemRow = self
            .client
            .insert(ITEMS, ITEM_SELECT, &insert)
            .await
            .map_err(classify_write_error)?;
        Ok(row.into())
    }

    async fn update_equipment(
        &self,
        id: Uuid,
        changes: &EquipmentChanges,
    ) -> AppResult<Option<Equipment>> {
        let patch = ItemPatch {
            name: changes.name.as_deref(),
            brand: changes.brand.as_deref(),
            category_id: changes.category_id,
            price: changes.price,
            description: changes.description.as_deref(),
            condition: changes.condition,
            image_filename: changes.image_filename.as_deref(),
            quantity: changes.quantity,
            updated_at: Utc::now(),
        };
        let query = format!("{}&id=eq.{}", ITEM_SELECT, id);
        let rows: Vec<ItemRow> = self
            .client
            .update(ITEMS, &query, &patch)
            .await
            .map_err(classify_write_error)?;
        Ok(rows.into_iter().next().map(Equipment::from))
    }

    async fn delete_equipment(&self, id: Uuid) -> AppResult<bool> {
        let query = format!("id=eq.{}&select=id", id);
        let rows: Vec<serde_json::Value> = self.client.delete(ITEMS, &query).await?;
        Ok(!rows.is_empty())
    }

    async fn ping(&self) -> AppResult<()> {
        let _: Vec<serde_json::Value> = self.client.get(CATEGORIES, "select=id&limit=1").await?;
        Ok(())
    }
}
