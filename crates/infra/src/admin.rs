//! Template administration.

use std::sync::Arc;

use chrono::Utc;

use firecheck_checklist::{ChecklistTree, InventoryEvent, Vehicle};
use firecheck_core::{DomainResult, VehicleId};
use firecheck_events::{EventBus, EventEnvelope};

use crate::error::SubmitError;
use crate::store::DocumentStore;

pub struct TemplateAdmin<B>
where
    B: EventBus<EventEnvelope<InventoryEvent>>,
{
    store: Arc<dyn DocumentStore>,
    bus: B,
}

impl<B> TemplateAdmin<B>
where
    B: EventBus<EventEnvelope<InventoryEvent>>,
{
    pub fn new(store: Arc<dyn DocumentStore>, bus: B) -> Self {
        Self { store, bus }
    }

    pub async fn register(&self, vehicle: &Vehicle) -> Result<(), SubmitError> {
        self.store
            .save_vehicle(vehicle)
            .await
            .map_err(SubmitError::Persistence)
    }

    /// Apply `edit` to the stored template and notify subscribers.
    ///
    /// Sessions already open keep the snapshot they started from.
    #[tracing::instrument(skip(self, edit), fields(vehicle_id = %vehicle_id))]
    pub async fn update_template(
        &self,
        vehicle_id: VehicleId,
        edit: impl FnOnce(&mut ChecklistTree) -> DomainResult<()>,
    ) -> Result<Vehicle, SubmitError> {
        let mut vehicle = self
            .store
            .load_vehicle(vehicle_id)
            .await
            .map_err(SubmitError::TemplateUnavailable)?
            .ok_or_else(|| SubmitError::NotFound(format!("vehicle {vehicle_id}")))?;

        let updated = vehicle.edit_template(Utc::now(), edit)?;
        self.store
            .save_vehicle(&vehicle)
            .await
            .map_err(SubmitError::Persistence)?;

        tracing::info!(revision = updated.revision, "vehicle template updated");
        let event = InventoryEvent::TemplateUpdated(updated);
        if let Err(e) = self.bus.publish(EventEnvelope::wrap(vehicle_id, event)) {
            tracing::warn!(error = ?e, "template notification not published");
        }
        Ok(vehicle)
    }
}
