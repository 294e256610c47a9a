//! Submitting a finished session: merge, upload, persist, notify, report.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::Instrument;

use firecheck_checklist::{
    Identity, InventoryEvent, InventoryRecord, InventorySubmitted, prepare_record,
};
use firecheck_core::{InventoryId, VehicleId};
use firecheck_events::{EventBus, EventEnvelope};

use crate::auth::{AuthError, Authenticator};
use crate::blob::BlobStore;
use crate::config::EngineConfig;
use crate::error::SubmitError;
use crate::photo_upload::{UploadFailure, upload_local_photos};
use crate::reporting::{DefectReport, ReportSink};
use crate::session::InventorySession;
use crate::store::{DocumentStore, StoredInventory};

/// What the operator gets back after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub inventory_id: InventoryId,
    pub record: InventoryRecord,
    /// Items whose photos were stored as local data.
    pub upload_failures: Vec<UploadFailure>,
}

pub struct SubmissionService<B>
where
    B: EventBus<EventEnvelope<InventoryEvent>>,
{
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    reports: Arc<dyn ReportSink>,
    auth: Arc<dyn Authenticator>,
    bus: B,
    config: EngineConfig,
    pending_reports: Mutex<JoinSet<()>>,
}

impl<B> SubmissionService<B>
where
    B: EventBus<EventEnvelope<InventoryEvent>>,
{
    pub fn new(
        store: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        reports: Arc<dyn ReportSink>,
        auth: Arc<dyn Authenticator>,
        bus: B,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            blobs,
            reports,
            auth,
            bus,
            config,
            pending_reports: Mutex::new(JoinSet::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn sign_in(&self, name: &str, pin: &str) -> Result<Identity, SubmitError> {
        match self.auth.authenticate(name, pin).await {
            Ok(identity) => Ok(identity),
            Err(AuthError::InvalidCredentials) => Err(SubmitError::Unauthorized),
            Err(e @ AuthError::Unavailable(_)) => {
                tracing::warn!(error = %e, "sign-in failed");
                Err(SubmitError::Unauthorized)
            }
        }
    }

    /// Persist the session as a new inventory.
    ///
    /// Only the document write is fatal. Upload failures leave local data in
    /// the record; notification failures are logged. The defect report is
    /// delivered in the background, see [`Self::wait_for_reports`].
    #[tracing::instrument(skip_all, fields(vehicle_id = %session.vehicle_id()))]
    pub async fn submit(
        &self,
        session: &InventorySession,
        agent: Identity,
        note: Option<String>,
    ) -> Result<SubmissionReceipt, SubmitError> {
        let mut record = prepare_record(
            &session.vehicle,
            session.previous.as_ref(),
            &session.tree,
            agent,
            note,
            Utc::now(),
            self.config.merge_key,
        )?;

        // Blob paths are keyed on the session start so a retried submit overwrites.
        let upload_failures = upload_local_photos(
            &mut record.merged_tree,
            self.blobs.clone(),
            record.vehicle_id,
            session.started_at,
            &self.config,
        )
        .await;

        let inventory_id = self.store.insert_inventory(&record).await.map_err(|e| {
            tracing::error!(error = %e, "inventory could not be saved");
            SubmitError::Persistence(e)
        })?;

        let event = InventoryEvent::InventorySubmitted(InventorySubmitted {
            inventory_id,
            vehicle_id: record.vehicle_id,
            defect_count: record.defects.len(),
            percent_complete: record.percent_complete,
            occurred_at: record.timestamp,
        });
        if let Err(e) = self.bus.publish(EventEnvelope::wrap(record.vehicle_id, event)) {
            tracing::warn!(error = ?e, "inventory notification not published");
        }

        if self.config.reporting_enabled {
            let report = DefectReport::from_record(&record);
            let sink = self.reports.clone();
            let delivery = async move {
                if let Err(e) = sink.deliver(&report).await {
                    tracing::warn!(error = %e, "defect report not delivered");
                }
            };
            let mut pending = self.pending_reports.lock().unwrap();
            while pending.try_join_next().is_some() {}
            pending.spawn(delivery.in_current_span());
        }

        tracing::info!(
            inventory_id = %inventory_id,
            defects = record.defects.len(),
            percent_complete = record.percent_complete,
            upload_failures = upload_failures.len(),
            "inventory submitted"
        );

        Ok(SubmissionReceipt {
            inventory_id,
            record,
            upload_failures,
        })
    }

    /// Wait until every report spawned by earlier submissions has settled.
    pub async fn wait_for_reports(&self) {
        let mut pending = std::mem::take(&mut *self.pending_reports.lock().unwrap());
        while let Some(joined) = pending.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "defect report task did not complete");
            }
        }
    }

    /// Submissions for a vehicle, newest first.
    pub async fn history(
        &self,
        vehicle_id: VehicleId,
        limit: usize,
    ) -> Result<Vec<StoredInventory>, SubmitError> {
        self.store
            .list_inventories(vehicle_id, limit)
            .await
            .map_err(SubmitError::Persistence)
    }
}
