//! Image upload storage

use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;

use crate::{
    config::UploadsConfig,
    error::{AppError, AppResult},
};

/// URL prefix uploaded files are served under
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Clone)]
pub struct UploadService {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(config: UploadsConfig) -> Self {
        Self {
            dir: PathBuf::from(config.dir),
            max_bytes: config.max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Write the file under a unique name and return its public path
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> AppResult<String> {
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::BadRequest(format!(
                "File exceeds the {} byte limit",
                self.max_bytes
            )));
        }

        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        let filename = format!(
            "{}-{}-{}",
            Utc::now().timestamp_millis(),
            suffix,
            sanitize_file_name(original_name)
        );

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create upload directory: {}", e)))?;
        tokio::fs::write(self.dir.join(&filename), bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write upload: {}", e)))?;

        tracing::info!("Stored upload {} ({} bytes)", filename, bytes.len());
        Ok(format!("{}/{}", PUBLIC_PREFIX, filename))
    }
}

/// Keep ASCII alphanumerics, `.`, `-` and `_`; anything else becomes `_`
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
