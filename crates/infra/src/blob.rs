//! Blob store for inventory photographs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Raw image bytes plus their media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    /// Decode a `data:<type>;base64,<payload>` URL as captured on the device.
    pub fn from_data_url(data_url: &str) -> Result<Self, BlobError> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| BlobError::InvalidPayload("not a data: URL".to_string()))?;
        let (meta, encoded) = rest
            .split_once(',')
            .ok_or_else(|| BlobError::InvalidPayload("missing ',' separator".to_string()))?;
        let content_type = meta
            .strip_suffix(";base64")
            .ok_or_else(|| {
                BlobError::InvalidPayload("only base64 data URLs are supported".to_string())
            })?;
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| BlobError::InvalidPayload(e.to_string()))?;
        Ok(Self {
            content_type: if content_type.is_empty() {
                "application/octet-stream".to_string()
            } else {
                content_type.to_string()
            },
            bytes,
        })
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlobError {
    #[error("invalid image payload: {0}")]
    InvalidPayload(String),

    #[error("blob store unavailable: {0}")]
    Unavailable(String),
}

/// Stores images and returns stable, fetchable URLs.
///
/// Writing the same `path_hint` twice must overwrite, so a per-item retry never
/// disturbs other items' uploads.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, path_hint: &str, payload: ImagePayload) -> Result<String, BlobError>;
}

/// In-memory blob store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, ImagePayload>>,
    /// Path hints containing this fragment are rejected (failure injection).
    reject_fragment: RwLock<Option<String>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn reject_paths_containing(&self, fragment: impl Into<String>) {
        *self.reject_fragment.write().unwrap() = Some(fragment.into());
    }

    pub fn get(&self, path: &str) -> Option<ImagePayload> {
        self.blobs.read().unwrap().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, path_hint: &str, payload: ImagePayload) -> Result<String, BlobError> {
        if let Some(fragment) = self.reject_fragment.read().unwrap().as_deref() {
            if path_hint.contains(fragment) {
                return Err(BlobError::Unavailable(format!("upload of {path_hint} refused")));
            }
        }
        self.blobs
            .write()
            .unwrap()
            .insert(path_hint.to_string(), payload);
        Ok(format!("memory://{path_hint}"))
    }
}
