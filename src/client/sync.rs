//! Writes that fall back to the pending queue when the server is away

use std::future::Future;

use serde::Deserialize;
use tokio::sync::watch;
use uuid::Uuid;

use super::{
    connectivity::{ConnectionStatus, Connectivity},
    offline::PendingQueue,
    ClientError, InventoryClient,
};
use crate::models::{
    equipment::{CreateEquipment, Equipment, UpdateEquipment},
    pending_operation::{OperationKind, PendingOperation},
};

/// Result of a write attempt
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome<T> {
    /// The server accepted the write
    Applied(T),
    /// The write was journaled for a later replay
    Queued,
}

impl<T> WriteOutcome<T> {
    pub fn is_queued(&self) -> bool {
        matches!(self, WriteOutcome::Queued)
    }
}

#[derive(Debug, Clone)]
pub struct RejectedOperation {
    pub operation: PendingOperation,
    pub reason: String,
}

/// Summary of a replay pass
#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    pub applied: usize,
    /// Operations the server answered with an error; they will never apply
    pub rejected: Vec<RejectedOperation>,
    /// Operations not attempted because the server went away mid-replay
    pub remaining: Vec<PendingOperation>,
}

impl ReplayReport {
    /// Every journaled operation got an answer from the server
    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }
}

#[derive(Deserialize)]
struct UpdatePayload {
    id: Uuid,
    changes: UpdateEquipment,
}

#[derive(Deserialize)]
struct DeletePayload {
    id: Uuid,
}

/// [`InventoryClient`] wrapper that journals writes while the server is
/// unavailable and replays them on request.
#[derive(Clone)]
pub struct SyncingClient {
    client: InventoryClient,
    queue: PendingQueue,
    status: watch::Receiver<ConnectionStatus>,
}

impl SyncingClient {
    pub fn new(
        client: InventoryClient,
        queue: PendingQueue,
        status: watch::Receiver<ConnectionStatus>,
    ) -> Self {
        Self {
            client,
            queue,
            status,
        }
    }

    pub fn client(&self) -> &InventoryClient {
        &self.client
    }

    pub fn queue(&self) -> &PendingQueue {
        &self.queue
    }

    fn server_available(&self) -> bool {
        self.status.borrow().state() == Connectivity::Available
    }

    /// Send `request` if the server looks reachable. Transport failures and
    /// an unavailable server journal `operation` instead; API errors are
    /// returned as is.
    async fn send_or_queue<T>(
        &self,
        operation: PendingOperation,
        request: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<WriteOutcome<T>, ClientError> {
        if self.server_available() {
            match request.await {
                Ok(value) => return Ok(WriteOutcome::Applied(value)),
                Err(e) if e.is_transport() => {
                    tracing::warn!("Server unreachable, queueing {:?}: {}", operation.kind, e);
                }
                Err(e) => return Err(e),
            }
        }

        self.queue.enqueue(operation).await?;
        Ok(WriteOutcome::Queued)
    }

    pub async fn create(
        &self,
        data: &CreateEquipment,
    ) -> Result<WriteOutcome<Equipment>, ClientError> {
        let operation = PendingOperation::create(data)?;
        self.send_or_queue(operation, self.client.create_equipment(data))
            .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: &UpdateEquipment,
    ) -> Result<WriteOutcome<Equipment>, ClientError> {
        let operation = PendingOperation::update(id, changes)?;
        self.send_or_queue(operation, self.client.update_equipment(id, changes))
            .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<WriteOutcome<()>, ClientError> {
        let operation = PendingOperation::delete(id);
        self.send_or_queue(operation, self.client.delete_equipment(id))
            .await
    }

    /// Send journaled operations in order, stopping at the first transport
    /// failure. The journal is not modified; callers decide whether to
    /// [`PendingQueue::clear`] it or keep [`ReplayReport::remaining`].
    pub async fn replay(&self) -> Result<ReplayReport, ClientError> {
        let operations = self.queue.drain().await?;
        let mut report = ReplayReport::default();

        for (index, operation) in operations.iter().enumerate() {
            match self.apply(operation).await {
                Ok(()) => report.applied += 1,
                Err(e) if e.is_transport() => {
                    tracing::warn!("Replay interrupted: {}", e);
                    report.remaining = operations[index..].to_vec();
                    break;
                }
                Err(e) => {
                    tracing::warn!("Server rejected queued {:?}: {}", operation.kind, e);
                    report.rejected.push(RejectedOperation {
                        operation: operation.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            applied = report.applied,
            rejected = report.rejected.len(),
            remaining = report.remaining.len(),
            "Replay finished"
        );
        Ok(report)
    }

    async fn apply(&self, operation: &PendingOperation) -> Result<(), ClientError> {
        let payload = operation.payload.clone();
        match operation.kind {
            OperationKind::Create => {
                let data: CreateEquipment = serde_json::from_value(payload).map_err(|e| {
                    ClientError::InvalidOperation(format!("malformed create payload: {}", e))
                })?;
                self.client.create_equipment(&data).await?;
            }
            OperationKind::Update => {
                let update: UpdatePayload = serde_json::from_value(payload).map_err(|e| {
                    ClientError::InvalidOperation(format!("malformed update payload: {}", e))
                })?;
                self.client.update_equipment(update.id, &update.changes).await?;
            }
            OperationKind::Delete => {
                let delete: DeletePayload = serde_json::from_value(payload).map_err(|e| {
                    ClientError::InvalidOperation(format!("malformed delete payload: {}", e))
                })?;
                self.client.delete_equipment(delete.id).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::client::offline::MemoryKeyValueStore;

    fn offline_client() -> (SyncingClient, watch::Sender<ConnectionStatus>) {
        let (tx, rx) = watch::channel(ConnectionStatus {
            is_online: false,
            is_server_available: false,
        });
        let queue = PendingQueue::new(Arc::new(MemoryKeyValueStore::new()));
        // Nothing listens on port 1
        let client = InventoryClient::new("http://127.0.0.1:1/api");
        (SyncingClient::new(client, queue, rx), tx)
    }

    #[tokio::test]
    async fn test_writes_are_queued_while_offline() {
        let (client, _tx) = offline_client();
        let id = Uuid::new_v4();

        let outcome = client.delete(id).await.unwrap();
        assert!(outcome.is_queued());
        let changes = UpdateEquipment {
            quantity: Some(4.0),
            ..Default::default()
        };
        assert!(client.update(id, &changes).await.unwrap().is_queued());

        let queued = client.queue().drain().await.unwrap();
        let kinds: Vec<OperationKind> = queued.iter().map(|op| op.kind).collect();
        assert_eq!(kinds, vec![OperationKind::Delete, OperationKind::Update]);
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back_to_queue() {
        let (client, tx) = offline_client();
        tx.send_replace(ConnectionStatus::default());

        let outcome = client.delete(Uuid::new_v4()).await.unwrap();
        assert!(outcome.is_queued());
        assert_eq!(client.queue().len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_replay_stops_on_transport_failure() {
        let (client, _tx) = offline_client();
        client.delete(Uuid::new_v4()).await.unwrap();
        client.delete(Uuid::new_v4()).await.unwrap();

        let report = client.replay().await.unwrap();
        assert_eq!(report.applied, 0);
        assert_eq!(report.remaining.len(), 2);
        assert!(!report.is_complete());
        // Replay leaves the journal alone
        assert_eq!(client.queue().len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_rejected() {
        let (client, _tx) = offline_client();
        let mut operation = PendingOperation::delete(Uuid::new_v4());
        operation.payload = serde_json::json!({ "id": "nope" });
        client.queue().enqueue(operation).await.unwrap();

        let report = client.replay().await.unwrap();
        assert_eq!(report.rejected.len(), 1);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_malformed_create_payload_is_invalid_operation() {
        let (client, _tx) = offline_client();
        let mut operation = PendingOperation::create(&CreateEquipment::default()).unwrap();
        operation.payload = serde_json::json!({ "name": ["not", "a", "name"] });

        let error = client.apply(&operation).await.unwrap_err();
        assert!(matches!(error, ClientError::InvalidOperation(_)));
        assert!(!error.is_transport());
    }
}
