use crate::credentials::CredentialStore;
use crate::error::{RemoteError, ServiceError};
use crate::gmail_api::MailProvider;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeletionErrorKind {
    AuthExpired,
    Forbidden,
    RemoteFailure,
}

impl From<&RemoteError> for DeletionErrorKind {
    fn from(e: &RemoteError) -> Self {
        match e {
            RemoteError::Unauthorized(_) => DeletionErrorKind::AuthExpired,
            RemoteError::Forbidden(_) => DeletionErrorKind::Forbidden,
            _ => DeletionErrorKind::RemoteFailure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionOutcome {
    pub id: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<DeletionErrorKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    pub requested: usize,
    pub succeeded: usize,
    pub outcomes: Vec<DeletionOutcome>,
}

impl DeletionReport {
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.requested
    }

    pub fn failed(&self) -> impl Iterator<Item = &DeletionOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }

    pub fn has_failure(&self, kind: DeletionErrorKind) -> bool {
        self.failed().any(|o| o.error_kind == Some(kind))
    }
}

/// Validate a caller-supplied id list: it must be a non-empty array of
/// strings. Duplicates are dropped, keeping the first occurrence.
pub fn parse_message_ids(value: Option<&Value>) -> Result<Vec<String>, ServiceError> {
    let invalid = || ServiceError::Validation("Invalid message IDs".to_string());

    let items = value.and_then(Value::as_array).ok_or_else(invalid)?;
    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        let id = item.as_str().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        if seen.insert(id) {
            ids.push(id.to_string());
        }
    }
    if ids.is_empty() {
        return Err(ServiceError::Validation(
            "At least one message ID is required".to_string(),
        ));
    }
    Ok(ids)
}

/// Issues one independent delete call per id. A failed id never stops the
/// others from being attempted or reported.
pub struct BatchDeleter {
    provider: Arc<dyn MailProvider>,
    credentials: CredentialStore,
    concurrency: usize,
}

impl BatchDeleter {
    pub fn new(
        provider: Arc<dyn MailProvider>,
        credentials: CredentialStore,
        concurrency: usize,
    ) -> Self {
        Self {
            provider,
            credentials,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn delete_many(&self, ids: &[String]) -> Result<DeletionReport, ServiceError> {
        if ids.is_empty() {
            return Err(ServiceError::Validation(
                "At least one message ID is required".to_string(),
            ));
        }
        let credential = self
            .credentials
            .get()
            .await
            .filter(|c| c.is_usable())
            .ok_or_else(|| ServiceError::Auth("Not authenticated".to_string()))?;
        let token = credential.access_token.as_str();
        let provider = self.provider.as_ref();

        let outcomes: Vec<DeletionOutcome> = stream::iter(ids.to_vec())
            .map(|id| async move { delete_one(provider, token, id).await })
            .buffered(self.concurrency)
            .collect()
            .await;

        let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
        let report = DeletionReport {
            requested: ids.len(),
            succeeded,
            outcomes,
        };
        info!(
            requested = report.requested,
            succeeded = report.succeeded,
            "batch deletion finished"
        );
        Ok(report)
    }
}

async fn delete_one(provider: &dyn MailProvider, token: &str, id: String) -> DeletionOutcome {
    match provider.delete_message(token, &id).await {
        Ok(()) => DeletionOutcome {
            id,
            succeeded: true,
            error_kind: None,
        },
        Err(e) => {
            warn!(message_id = %id, error = %e, "delete failed");
            DeletionOutcome {
                id,
                succeeded: false,
                error_kind: Some(DeletionErrorKind::from(&e)),
            }
        }
    }
}
