//! In-memory document store for tests/dev.
//!
//! Documents are kept as JSON values so every read and write goes through the
//! same serialization a real document backend would.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value as JsonValue;

use firecheck_checklist::{InventoryRecord, Vehicle};
use firecheck_core::{Entity, InventoryId, VehicleId};

use super::document::{DocumentStore, StoreError, StoredInventory};

#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    vehicles: RwLock<HashMap<VehicleId, JsonValue>>,
    inventories: RwLock<Vec<(InventoryId, JsonValue)>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Simulate an unreachable backend for inventory reads.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Simulate a backend rejecting writes.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn inventory_count(&self) -> usize {
        self.inventories.read().unwrap().len()
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<JsonValue, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(value: &JsonValue) -> Result<T, StoreError> {
    serde_json::from_value(value.clone()).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn load_vehicle(&self, vehicle_id: VehicleId) -> Result<Option<Vehicle>, StoreError> {
        let vehicles = self.vehicles.read().unwrap();
        vehicles.get(&vehicle_id).map(from_json::<Vehicle>).transpose()
    }

    async fn save_vehicle(&self, vehicle: &Vehicle) -> Result<(), StoreError> {
        self.check_writes()?;
        let doc = to_json(vehicle)?;
        self.vehicles.write().unwrap().insert(*vehicle.id(), doc);
        Ok(())
    }

    async fn insert_inventory(&self, record: &InventoryRecord) -> Result<InventoryId, StoreError> {
        self.check_writes()?;
        let doc = to_json(record)?;
        let id = InventoryId::new();
        self.inventories.write().unwrap().push((id, doc));
        Ok(id)
    }

    async fn list_inventories(
        &self,
        vehicle_id: VehicleId,
        limit: usize,
    ) -> Result<Vec<StoredInventory>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        let inventories = self.inventories.read().unwrap();
        let mut result = Vec::new();
        for (id, doc) in inventories.iter() {
            let record: InventoryRecord = from_json(doc)?;
            if record.vehicle_id == vehicle_id {
                result.push(StoredInventory { id: *id, record });
            }
        }

        // Newest first; ids are time-ordered, so they break timestamp ties.
        result.sort_by(|a, b| {
            b.record
                .timestamp
                .cmp(&a.record.timestamp)
                .then_with(|| b.id.as_uuid().cmp(a.id.as_uuid()))
        });
        result.truncate(limit);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use firecheck_checklist::{ChecklistTree, Identity};
    use firecheck_core::AgentId;

    use super::*;

    fn record(vehicle_id: VehicleId, minutes_ago: i64) -> InventoryRecord {
        InventoryRecord {
            vehicle_id,
            vehicle_name: "FPT".into(),
            agent: Identity {
                id: AgentId::from("a"),
                name: "Sam".into(),
                role: "crew".into(),
            },
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
            defects: Vec::new(),
            merged_tree: ChecklistTree::default(),
            note: Some(format!("{minutes_ago}")),
            total_items: 0,
            completed_items: 0,
            percent_complete: 0,
        }
    }

    #[tokio::test]
    async fn lists_newest_first_per_vehicle() {
        let store = InMemoryDocumentStore::new();
        let vehicle = VehicleId::new();
        store.insert_inventory(&record(vehicle, 30)).await.unwrap();
        store.insert_inventory(&record(vehicle, 5)).await.unwrap();
        store.insert_inventory(&record(VehicleId::new(), 1)).await.unwrap();
        store.insert_inventory(&record(vehicle, 60)).await.unwrap();

        let list = store.list_inventories(vehicle, 10).await.unwrap();
        let notes: Vec<_> = list.iter().map(|s| s.record.note.clone().unwrap()).collect();
        assert_eq!(notes, vec!["5", "30", "60"]);

        let latest = store.latest_inventory(vehicle).await.unwrap().unwrap();
        assert_eq!(latest.record.note.as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn failing_writes_store_nothing() {
        let store = InMemoryDocumentStore::new();
        store.set_fail_writes(true);
        let err = store.insert_inventory(&record(VehicleId::new(), 0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.inventory_count(), 0);
    }
}
