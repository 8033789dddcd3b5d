//! Sportstock Sports Equipment Inventory
//!
//! A REST JSON API for listing, filtering and editing sports equipment,
//! backed by Postgres, Supabase or an in-memory store, plus the client-side
//! pieces (offline journal, connectivity monitor, HTTP client) that talk
//! to it.

use std::sync::Arc;

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, services: services::Services) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
