//! Operator authentication port.

use std::sync::Arc;

use thiserror::Error;

use firecheck_checklist::Identity;
use firecheck_core::AgentId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("authentication service unavailable: {0}")]
    Unavailable(String),
}

/// Resolves operator credentials to an identity.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, name: &str, pin: &str) -> Result<Identity, AuthError>;
}

#[derive(Debug, Clone)]
struct Account {
    identity: Identity,
    pin: String,
}

/// Fixed roster of operators, for tests/dev.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthenticator {
    accounts: Vec<Account>,
}

impl StaticAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(
        mut self,
        id: impl Into<AgentId>,
        name: impl Into<String>,
        role: impl Into<String>,
        pin: impl Into<String>,
    ) -> Self {
        self.accounts.push(Account {
            identity: Identity {
                id: id.into(),
                name: name.into(),
                role: role.into(),
            },
            pin: pin.into(),
        });
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait::async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, name: &str, pin: &str) -> Result<Identity, AuthError> {
        // Operators type their name on a shared tablet; case is not significant.
        self.accounts
            .iter()
            .find(|a| a.identity.name.eq_ignore_ascii_case(name.trim()) && a.pin == pin)
            .map(|a| a.identity.clone())
            .ok_or(AuthError::InvalidCredentials)
    }
}
