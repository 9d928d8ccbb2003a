use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Treat a token as expired this long before the provider would.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn is_usable(&self) -> bool {
        !self.access_token.is_empty()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry
            .is_some_and(|expiry| expiry - Duration::seconds(EXPIRY_SKEW_SECS) <= now)
    }
}

/// Holds the credential of the single active session. Cloning shares the
/// same underlying slot.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Option<Credential>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current credential; callers read once per operation.
    pub async fn get(&self) -> Option<Credential> {
        self.inner.read().await.clone()
    }

    pub async fn set(&self, credential: Credential) {
        *self.inner.write().await = Some(credential);
    }

    /// Empty the slot, returning whatever was held.
    pub async fn clear(&self) -> Option<Credential> {
        self.inner.write().await.take()
    }

    pub async fn is_usable(&self) -> bool {
        self.inner
            .read()
            .await
            .as_ref()
            .is_some_and(Credential::is_usable)
    }
}
