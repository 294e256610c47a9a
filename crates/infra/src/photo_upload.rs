//! Bounded-concurrency upload of device-local photos before persistence.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use firecheck_checklist::{ChecklistTree, Photo, Section};
use firecheck_core::{NodeId, VehicleId};

use crate::blob::{BlobStore, ImagePayload};
use crate::config::EngineConfig;

/// An item whose photos stayed local because an upload failed.
///
/// `section_path` holds the ids from the main section down to the item's
/// section; item ids are only unique among siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    pub section_path: Vec<NodeId>,
    pub item_id: NodeId,
    pub reason: String,
}

#[derive(Debug, Clone)]
struct PendingItem {
    ordinal: usize,
    section_path: Vec<NodeId>,
    item_id: NodeId,
    current: Vec<Photo>,
    previous: Vec<Photo>,
}

impl PendingItem {
    fn failure(&self, reason: impl Into<String>) -> UploadFailure {
        UploadFailure {
            section_path: self.section_path.clone(),
            item_id: self.item_id.clone(),
            reason: reason.into(),
        }
    }

    /// `{section ids}/{item id}`, unique within a tree that validates.
    fn node_path(&self) -> String {
        let mut segments: Vec<&str> = self.section_path.iter().map(NodeId::as_str).collect();
        segments.push(self.item_id.as_str());
        segments.join("/")
    }
}

type ItemOutcome = (usize, Result<(Vec<Photo>, Vec<Photo>), UploadFailure>);

/// Replace every `Photo::Local` in `tree` with its stored URL.
///
/// Items upload independently, at most `upload_concurrency` at a time. An item
/// with any failed upload keeps all its photos local and is reported back;
/// other items are unaffected.
pub async fn upload_local_photos(
    tree: &mut ChecklistTree,
    blobs: Arc<dyn BlobStore>,
    vehicle_id: VehicleId,
    stamp: DateTime<Utc>,
    config: &EngineConfig,
) -> Vec<UploadFailure> {
    let pending = collect_pending(tree);
    if pending.is_empty() {
        return Vec::new();
    }
    tracing::debug!(items = pending.len(), "uploading local photos");

    let permits = Arc::new(Semaphore::new(config.upload_concurrency.max(1)));
    let prefix = format!("{}/{}", config.photo_prefix.trim_end_matches('/'), vehicle_id);
    let stamp = stamp.timestamp_millis();

    let mut outstanding: HashMap<usize, PendingItem> = HashMap::new();
    let mut tasks: JoinSet<ItemOutcome> = JoinSet::new();
    for item in pending {
        outstanding.insert(item.ordinal, item.clone());
        let blobs = blobs.clone();
        let permits = permits.clone();
        let base = format!("{prefix}/{}/{stamp}", item.node_path());
        tasks.spawn(async move {
            // The semaphore is never closed.
            let _permit = permits.acquire_owned().await.ok();
            let ordinal = item.ordinal;
            (ordinal, upload_item(item, blobs.as_ref(), &base).await)
        });
    }

    let mut uploaded = HashMap::new();
    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((ordinal, Ok(photos))) => {
                outstanding.remove(&ordinal);
                uploaded.insert(ordinal, photos);
            }
            Ok((ordinal, Err(failure))) => {
                outstanding.remove(&ordinal);
                failures.push((ordinal, failure));
            }
            Err(e) => tracing::warn!(error = %e, "photo upload task aborted"),
        }
    }
    // Tasks that panicked or were cancelled never reported back.
    failures.extend(
        outstanding
            .into_values()
            .map(|item| (item.ordinal, item.failure("upload task did not complete"))),
    );
    failures.sort_by_key(|(ordinal, _)| *ordinal);
    for (_, failure) in &failures {
        tracing::warn!(
            item_id = %failure.item_id,
            reason = %failure.reason,
            "photo upload failed; keeping local image data"
        );
    }

    let mut ordinal = 0usize;
    tree.visit_items_mut(|item| {
        if let Some((current, previous)) = uploaded.remove(&ordinal) {
            item.photos_current = current;
            item.photos_previous = previous;
        }
        ordinal += 1;
    });

    failures.into_iter().map(|(_, f)| f).collect()
}

/// Items holding local photos, numbered in the order `visit_items_mut` yields them.
fn collect_pending(tree: &ChecklistTree) -> Vec<PendingItem> {
    let mut pending = Vec::new();
    let mut ordinal = 0usize;
    let mut path = Vec::new();
    for section in &tree.sections {
        collect_section(section, &mut path, &mut ordinal, &mut pending);
    }
    pending
}

fn collect_section(
    section: &Section,
    path: &mut Vec<NodeId>,
    ordinal: &mut usize,
    pending: &mut Vec<PendingItem>,
) {
    path.push(section.id.clone());
    for item in &section.items {
        let has_local = item
            .photos_current
            .iter()
            .chain(item.photos_previous.iter())
            .any(Photo::is_local);
        if has_local {
            pending.push(PendingItem {
                ordinal: *ordinal,
                section_path: path.clone(),
                item_id: item.id.clone(),
                current: item.photos_current.clone(),
                previous: item.photos_previous.clone(),
            });
        }
        *ordinal += 1;
    }
    for sub in &section.subsections {
        collect_section(sub, path, ordinal, pending);
    }
    path.pop();
}

async fn upload_item(
    item: PendingItem,
    blobs: &dyn BlobStore,
    base: &str,
) -> Result<(Vec<Photo>, Vec<Photo>), UploadFailure> {
    let mut n = 0usize;
    let mut current = Vec::with_capacity(item.current.len());
    for photo in &item.current {
        current.push(upload_photo(photo, blobs, base, &mut n, &item).await?);
    }
    let mut previous = Vec::with_capacity(item.previous.len());
    for photo in &item.previous {
        previous.push(upload_photo(photo, blobs, base, &mut n, &item).await?);
    }
    Ok((current, previous))
}

async fn upload_photo(
    photo: &Photo,
    blobs: &dyn BlobStore,
    base: &str,
    n: &mut usize,
    item: &PendingItem,
) -> Result<Photo, UploadFailure> {
    let Photo::Local { data } = photo else {
        return Ok(photo.clone());
    };
    let payload = ImagePayload::from_data_url(data).map_err(|e| item.failure(e.to_string()))?;
    let hint = format!("{base}-{n}");
    *n += 1;
    let url = blobs
        .put(&hint, payload)
        .await
        .map_err(|e| item.failure(e.to_string()))?;
    Ok(Photo::stored(url))
}
