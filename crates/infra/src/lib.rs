//! Infrastructure layer: collaborator ports, in-memory adapters, config, and
//! the session/submission pipeline that drives the checklist engine.

pub mod admin;
pub mod auth;
pub mod blob;
pub mod config;
pub mod error;
pub mod photo_upload;
pub mod reporting;
pub mod session;
pub mod store;
pub mod submission;

pub use admin::TemplateAdmin;
pub use auth::{AuthError, Authenticator, StaticAuthenticator};
pub use blob::{BlobError, BlobStore, ImagePayload, InMemoryBlobStore};
pub use config::EngineConfig;
pub use error::SubmitError;
pub use photo_upload::UploadFailure;
pub use reporting::{DefectReport, RecordingReportSink, ReportError, ReportSink};
pub use session::{InventorySession, SessionService};
pub use store::{DocumentStore, InMemoryDocumentStore, StoreError, StoredInventory};
pub use submission::{SubmissionReceipt, SubmissionService};
