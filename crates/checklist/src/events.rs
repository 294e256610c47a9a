use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use firecheck_core::{InventoryId, VehicleId};
use firecheck_events::Event;

/// Event: InventorySubmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySubmitted {
    pub inventory_id: InventoryId,
    pub vehicle_id: VehicleId,
    pub defect_count: usize,
    pub percent_complete: u8,
    pub occurred_at: DateTime<Utc>,
}

/// Event: TemplateUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateUpdated {
    pub vehicle_id: VehicleId,
    pub revision: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    InventorySubmitted(InventorySubmitted),
    TemplateUpdated(TemplateUpdated),
}

impl InventoryEvent {
    pub fn vehicle_id(&self) -> VehicleId {
        match self {
            InventoryEvent::InventorySubmitted(e) => e.vehicle_id,
            InventoryEvent::TemplateUpdated(e) => e.vehicle_id,
        }
    }
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::InventorySubmitted(_) => "inventory.submitted",
            InventoryEvent::TemplateUpdated(_) => "inventory.template.updated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::InventorySubmitted(e) => e.occurred_at,
            InventoryEvent::TemplateUpdated(e) => e.occurred_at,
        }
    }
}
