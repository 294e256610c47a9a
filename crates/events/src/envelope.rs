use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use firecheck_core::VehicleId;

use crate::event::Event;

/// Envelope for an event, carrying the vehicle it concerns.
///
/// Subscribers filter on `vehicle_id` to refresh only the views showing that vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    vehicle_id: VehicleId,
    event_type: String,
    /// Payload schema version, so subscribers can skip shapes they do not know.
    version: u32,
    occurred_at: DateTime<Utc>,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        vehicle_id: VehicleId,
        event_type: impl Into<String>,
        version: u32,
        occurred_at: DateTime<Utc>,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            vehicle_id,
            event_type: event_type.into(),
            version,
            occurred_at,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap a typed event, reading type, version and time from the event itself.
    pub fn wrap(vehicle_id: VehicleId, event: E) -> Self {
        Self::new(
            Uuid::now_v7(),
            vehicle_id,
            event.event_type(),
            event.version(),
            event.occurred_at(),
            event,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Checked {
        at: DateTime<Utc>,
    }

    impl Event for Checked {
        fn event_type(&self) -> &'static str {
            "inventory.checked"
        }

        fn version(&self) -> u32 {
            2
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.at
        }
    }

    #[test]
    fn wrap_copies_event_metadata() {
        let vehicle = VehicleId::new();
        let event = Checked { at: Utc::now() };

        let envelope = EventEnvelope::wrap(vehicle, event.clone());

        assert_eq!(envelope.vehicle_id(), vehicle);
        assert_eq!(envelope.event_type(), "inventory.checked");
        assert_eq!(envelope.version(), 2);
        assert_eq!(envelope.occurred_at(), event.at);
        assert_eq!(envelope.payload(), &event);
    }
}
