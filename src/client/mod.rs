//! Client side of the inventory API
//!
//! [`InventoryClient`] is a typed wrapper over the HTTP surface. The
//! submodules add what a front end needs around it: a local journal of
//! writes made while the server is unreachable, a connectivity monitor,
//! and a client that switches between the two.

pub mod connectivity;
pub mod offline;
pub mod sync;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    api::{equipment::SuccessResponse, health::HealthResponse},
    models::{
        category::{Category, CreateCategory},
        equipment::{CreateEquipment, Equipment, EquipmentFilterRequest, UpdateEquipment},
    },
};

/// Client-side errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Local storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid pending operation: {0}")]
    InvalidOperation(String),
}

impl ClientError {
    /// The request never got an answer from the server
    pub fn is_transport(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

/// Typed HTTP client for the `/api` routes
#[derive(Clone)]
pub struct InventoryClient {
    http: Client,
    base_url: String,
}

impl InventoryClient {
    /// `base_url` includes the `/api` prefix, e.g. `http://localhost:8080/api`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or(body);
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.http.get(self.url("/health")).send().await?;
        Self::parse(response).await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        let response = self.http.get(self.url("/categories")).send().await?;
        Self::parse(response).await
    }

    pub async fn create_category(&self, name: &str) -> Result<Category, ClientError> {
        let body = CreateCategory {
            name: name.to_string(),
        };
        let response = self
            .http
            .post(self.url("/categories"))
            .json(&body)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn list_equipment(&self) -> Result<Vec<Equipment>, ClientError> {
        let response = self.http.get(self.url("/equipment")).send().await?;
        Self::parse(response).await
    }

    pub async fn get_equipment(&self, id: Uuid) -> Result<Equipment, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/equipment/{}", id)))
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn filter_equipment(
        &self,
        filter: &EquipmentFilterRequest,
    ) -> Result<Vec<Equipment>, ClientError> {
        let response = self
            .http
            .post(self.url("/equipment/filter"))
            .json(filter)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn create_equipment(&self, data: &CreateEquipment) -> Result<Equipment, ClientError> {
        let response = self
            .http
            .post(self.url("/equipment"))
            .json(data)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn update_equipment(
        &self,
        id: Uuid,
        changes: &UpdateEquipment,
    ) -> Result<Equipment, ClientError> {
        let response = self
            .http
            .put(self.url("/equipment"))
            .query(&[("id", id.to_string())])
            .json(changes)
            .send()
            .await?;
        Self::parse(response).await
    }

    pub async fn delete_equipment(&self, id: Uuid) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url("/equipment"))
            .query(&[("id", id.to_string())])
            .send()
            .await?;
        let _: SuccessResponse = Self::parse(response).await?;
        Ok(())
    }
}
