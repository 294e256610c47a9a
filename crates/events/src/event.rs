use chrono::{DateTime, Utc};

/// A fact about a vehicle's inventories, broadcast after it happened.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name subscribers match on, e.g. `"inventory.submitted"`.
    fn event_type(&self) -> &'static str;

    /// Payload schema version; bumped when the payload shape changes.
    fn version(&self) -> u32;

    fn occurred_at(&self) -> DateTime<Utc>;
}
