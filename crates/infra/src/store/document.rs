use serde::{Deserialize, Serialize};
use thiserror::Error;

use firecheck_checklist::{InventoryRecord, Vehicle};
use firecheck_core::{InventoryId, VehicleId};

/// A persisted submission with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredInventory {
    pub id: InventoryId,
    #[serde(flatten)]
    pub record: InventoryRecord,
}

/// Document store operation error.
///
/// These are **infrastructure errors** as opposed to domain errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// A stored document could not be (de)serialized.
    #[error("document serialization failed: {0}")]
    Serialization(String),
}

/// JSON document store holding vehicles and inventory submissions.
///
/// Implementations must write an inventory record atomically: either the full
/// record is stored or nothing is.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load_vehicle(&self, vehicle_id: VehicleId) -> Result<Option<Vehicle>, StoreError>;

    async fn save_vehicle(&self, vehicle: &Vehicle) -> Result<(), StoreError>;

    /// Store a submission and return its generated id.
    async fn insert_inventory(&self, record: &InventoryRecord) -> Result<InventoryId, StoreError>;

    /// Submissions for a vehicle, newest first.
    async fn list_inventories(
        &self,
        vehicle_id: VehicleId,
        limit: usize,
    ) -> Result<Vec<StoredInventory>, StoreError>;

    /// The submission the next session merges against.
    async fn latest_inventory(
        &self,
        vehicle_id: VehicleId,
    ) -> Result<Option<StoredInventory>, StoreError> {
        Ok(self.list_inventories(vehicle_id, 1).await?.into_iter().next())
    }
}
