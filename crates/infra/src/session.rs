//! Starting an inventory visit: template + latest history -> working tree.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use firecheck_checklist::{ChecklistTree, MergeKey, Vehicle, start_session};
use firecheck_core::VehicleId;

use crate::error::SubmitError;
use crate::store::DocumentStore;

/// One operator visit in progress.
///
/// `tree` is the working copy the operator edits; `previous` is the merged tree
/// of the latest submission, kept for the merge at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventorySession {
    pub vehicle: Vehicle,
    pub previous: Option<ChecklistTree>,
    pub tree: ChecklistTree,
    pub started_at: DateTime<Utc>,
}

impl InventorySession {
    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle.id_typed()
    }

    pub fn has_history(&self) -> bool {
        self.previous.is_some()
    }
}

pub struct SessionService {
    store: Arc<dyn DocumentStore>,
    merge_key: MergeKey,
}

impl SessionService {
    pub fn new(store: Arc<dyn DocumentStore>, merge_key: MergeKey) -> Self {
        Self { store, merge_key }
    }

    /// Load the template and latest submission for `vehicle_id` and open a session.
    ///
    /// The template is required. History is not: when it cannot be read the
    /// session starts as a first inventory and a warning is logged.
    #[tracing::instrument(skip(self), fields(vehicle_id = %vehicle_id))]
    pub async fn begin(&self, vehicle_id: VehicleId) -> Result<InventorySession, SubmitError> {
        let vehicle = self
            .store
            .load_vehicle(vehicle_id)
            .await
            .map_err(SubmitError::TemplateUnavailable)?
            .ok_or_else(|| SubmitError::NotFound(format!("vehicle {vehicle_id}")))?;

        let previous = match self.store.latest_inventory(vehicle_id).await {
            Ok(latest) => latest.map(|stored| stored.record.merged_tree),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "previous inventory unavailable; starting without history"
                );
                None
            }
        };

        let tree = start_session(vehicle.template(), previous.as_ref(), self.merge_key);
        tracing::info!(
            items = tree.item_count(),
            has_history = previous.is_some(),
            "inventory session started"
        );

        Ok(InventorySession {
            vehicle,
            previous,
            tree,
            started_at: Utc::now(),
        })
    }
}
