//! Shared test server setup

use reqwest::Client;
use serde_json::Value;
use sportstock_server::{
    api,
    config::{AppConfig, StorageBackend},
    repository::{memory::MemoryStore, Repository},
    services::Services,
    AppState,
};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub struct TestApp {
    /// Server root, e.g. `http://127.0.0.1:40000`
    pub root_url: String,
    /// API base including the `/api` prefix
    pub base_url: String,
    pub http: Client,
    _uploads: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Id of a seeded category by name
    pub async fn category_id(&self, name: &str) -> String {
        let categories: Vec<Value> = self
            .http
            .get(self.url("/categories"))
            .send()
            .await
            .expect("Failed to list categories")
            .json()
            .await
            .expect("Failed to parse categories");
        categories
            .iter()
            .find(|c| c["name"] == name)
            .and_then(|c| c["id"].as_str())
            .expect("Seeded category missing")
            .to_string()
    }
}

/// Start a server on the memory backend seeded with the demo catalogue
pub async fn spawn_app() -> TestApp {
    let uploads = tempfile::tempdir().expect("Failed to create upload dir");

    let mut config = AppConfig::default();
    config.storage.backend = StorageBackend::Memory;
    config.storage.seed_sample_data = true;
    config.uploads.dir = uploads.path().to_string_lossy().into_owned();
    config.uploads.max_bytes = 1024;

    let repository = Repository::memory(MemoryStore::with_sample_data());
    let services = Services::new(repository, config.uploads.clone());
    let app = api::router(AppState::new(config, services));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });

    let root_url = format!("http://{}", addr);
    TestApp {
        base_url: format!("{}/api", root_url),
        root_url,
        http: Client::new(),
        _uploads: uploads,
    }
}
