//! Checklist domain module: equipment inventories for vehicles.
//!
//! This crate contains the reconciliation and defect rules for vehicle
//! inventories, implemented purely as deterministic domain logic (no IO, no
//! storage). Storage, blobs and delivery live in `firecheck-infra`.

pub mod edit;
pub mod events;
pub mod extract;
pub mod index;
pub mod item;
pub mod merge;
pub mod photo;
pub mod record;
pub mod semantics;
pub mod session;
pub mod tree;
pub mod vehicle;

pub use events::{InventoryEvent, InventorySubmitted, TemplateUpdated};
pub use extract::{Defect, Findings, Progress, extract};
pub use index::{NodeAddress, NodeLocation, TreeIndex, resolve_path};
pub use item::{FieldValue, Item, ItemKind};
pub use merge::{MergeKey, item_modified, merge, section_modified, tree_modified};
pub use photo::{Photo, PhotoState};
pub use record::{Identity, InventoryRecord, prepare_record};
pub use semantics::{defect_detail, is_complete, is_defective, is_touched};
pub use session::start_session;
pub use tree::{ChecklistTree, Section};
pub use vehicle::Vehicle;
