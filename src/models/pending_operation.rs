//! Locally journaled writes awaiting confirmation by the server

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::equipment::{CreateEquipment, UpdateEquipment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

/// A write that has not been confirmed by the server yet.
///
/// `payload` is the request body for creates, `{id, changes}` for updates
/// and `{id}` for deletes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    pub kind: OperationKind,
    pub payload: Value,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl PendingOperation {
    fn new(kind: OperationKind, payload: Value) -> Self {
        Self {
            kind,
            payload,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn create(data: &CreateEquipment) -> serde_json::Result<Self> {
        Ok(Self::new(OperationKind::Create, serde_json::to_value(data)?))
    }

    pub fn update(id: Uuid, changes: &UpdateEquipment) -> serde_json::Result<Self> {
        let changes = serde_json::to_value(changes)?;
        Ok(Self::new(OperationKind::Update, json!({ "id": id, "changes": changes })))
    }

    pub fn delete(id: Uuid) -> Self {
        Self::new(OperationKind::Delete, json!({ "id": id }))
    }

    /// Target id of an update or delete
    pub fn target_id(&self) -> Option<Uuid> {
        self.payload
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
    }
}
