//! Inventory notifications: event trait, vehicle-scoped envelopes and a pub/sub bus.
//!
//! Views that display inventory history subscribe to the bus instead of being
//! poked through shared global state.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
