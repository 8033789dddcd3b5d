//! Client library against a live server

use std::sync::Arc;

use rust_decimal::Decimal;
use sportstock_server::{
    client::{
        connectivity::{Connectivity, ConnectivityMonitor, MonitorConfig},
        offline::{FileKeyValueStore, PendingQueue},
        sync::{SyncingClient, WriteOutcome},
        ClientError, InventoryClient,
    },
    models::equipment::{CreateEquipment, EquipmentFilterRequest, UpdateEquipment},
};
use uuid::Uuid;

use crate::common::spawn_app;

fn new_equipment(category_id: &str) -> CreateEquipment {
    CreateEquipment {
        name: Some("Offline Ball".to_string()),
        brand: Some("Acme".to_string()),
        category_id: Some(category_id.to_string()),
        price: Some(Decimal::new(1500, 2)),
        condition: Some("Good".to_string()),
        quantity: Some(2.0),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_typed_client_round_trip() {
    let app = spawn_app().await;
    let client = InventoryClient::new(app.base_url.clone());

    assert_eq!(client.health().await.unwrap().status, "ok");
    assert_eq!(client.list_categories().await.unwrap().len(), 4);

    let category_id = app.category_id("Training").await;
    let created = client
        .create_equipment(&new_equipment(&category_id))
        .await
        .unwrap();
    assert_eq!(created.price, Decimal::new(1500, 2));
    assert_eq!(client.get_equipment(created.id).await.unwrap().id, created.id);

    let filter = EquipmentFilterRequest {
        category_id: Some(category_id),
        sort_by: Some("price".to_string()),
        sort_order: Some("asc".to_string()),
    };
    let items = client.filter_equipment(&filter).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, created.id);

    let changes = UpdateEquipment {
        quantity: Some(9.0),
        ..Default::default()
    };
    let updated = client.update_equipment(created.id, &changes).await.unwrap();
    assert_eq!(updated.quantity, 9);

    client.delete_equipment(created.id).await.unwrap();
    match client.get_equipment(created.id).await {
        Err(ClientError::Api { status, .. }) => assert_eq!(status, 404),
        other => panic!("unexpected result: {:?}", other.map(|e| e.id)),
    }
}

#[tokio::test]
async fn test_api_errors_are_not_queued() {
    let app = spawn_app().await;
    let dir = tempfile::tempdir().unwrap();

    let monitor = ConnectivityMonitor::new(MonitorConfig::new(&app.base_url));
    let queue = PendingQueue::new(Arc::new(FileKeyValueStore::new(dir.path())));
    let client = SyncingClient::new(
        InventoryClient::new(app.base_url.clone()),
        queue.clone(),
        monitor.subscribe(),
    );
    assert_eq!(monitor.check_now().await.state(), Connectivity::Available);

    let result = client.delete(Uuid::new_v4()).await;
    assert!(matches!(result, Err(ClientError::Api { status: 404, .. })));
    assert!(queue.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_offline_writes_replay_in_order() {
    let app = spawn_app().await;
    let dir = tempfile::tempdir().unwrap();
    let category_id = app.category_id("Tennis").await;

    let monitor = ConnectivityMonitor::new(MonitorConfig::new(&app.base_url));
    let queue = PendingQueue::new(Arc::new(FileKeyValueStore::new(dir.path())));
    let client = SyncingClient::new(
        InventoryClient::new(app.base_url.clone()),
        queue.clone(),
        monitor.subscribe(),
    );

    let existing = client.client().list_equipment().await.unwrap();
    let doomed = existing[0].id;

    monitor.set_network_online(false).await;
    let outcome = client.create(&new_equipment(&category_id)).await.unwrap();
    assert_eq!(outcome, WriteOutcome::Queued);
    assert!(client.delete(doomed).await.unwrap().is_queued());
    // Unknown id: the server will refuse this one during replay
    assert!(client.delete(Uuid::new_v4()).await.unwrap().is_queued());
    assert_eq!(queue.len().await.unwrap(), 3);

    // Nothing reached the server yet
    assert_eq!(client.client().list_equipment().await.unwrap().len(), existing.len());

    monitor.set_network_online(true).await;
    let report = client.replay().await.unwrap();
    assert_eq!(report.applied, 2);
    assert_eq!(report.rejected.len(), 1);
    assert!(report.is_complete());
    assert_eq!(queue.len().await.unwrap(), 3);
    queue.clear().await.unwrap();

    let items = client.client().list_equipment().await.unwrap();
    assert_eq!(items.len(), existing.len());
    assert!(items.iter().any(|item| item.name == "Offline Ball"));
    assert!(items.iter().all(|item| item.id != doomed));
}
