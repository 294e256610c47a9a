//! Error surfaced to the operator by the session and submission pipeline.

use firecheck_core::DomainError;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The session cannot be submitted as is (nothing verified, incomplete identity, ...).
    #[error("validation failed: {0}")]
    Validation(String),
    /// The merged tree broke a checklist invariant.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized")]
    Unauthorized,
    /// The vehicle template could not be read when starting a session.
    #[error("vehicle template unavailable: {0}")]
    TemplateUnavailable(StoreError),
    /// The record could not be stored; nothing was committed.
    #[error("inventory could not be saved, please retry: {0}")]
    Persistence(StoreError),
}

impl SubmitError {
    /// Whether asking the operator to retry can succeed without changing the session.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubmitError::Persistence(_) | SubmitError::TemplateUnavailable(_)
        )
    }
}

impl From<DomainError> for SubmitError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => {
                SubmitError::Validation(msg)
            }
            DomainError::InvariantViolation(msg) | DomainError::Conflict(msg) => {
                SubmitError::InvariantViolation(msg)
            }
            DomainError::NotFound(what) => SubmitError::NotFound(what),
            DomainError::Unauthorized => SubmitError::Unauthorized,
        }
    }
}
