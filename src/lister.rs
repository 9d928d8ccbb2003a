use crate::credentials::CredentialStore;
use crate::error::ServiceError;
use crate::gmail_api::{MailProvider, METADATA_HEADERS};
use crate::types::{header_value, MessageRef, SenderRecord};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Retrieves message ids and per-message metadata from the provider.
pub struct MessageLister {
    provider: Arc<dyn MailProvider>,
    credentials: CredentialStore,
    concurrency: usize,
}

impl MessageLister {
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

    /// List up to `cap` messages in one listing call and fetch their
    /// headers. Records come back in listing order; messages without a
    /// `From` header are left out. The first failed metadata fetch aborts
    /// the listing and no further fetches are started.
    pub async fn list_all(&self, cap: usize) -> Result<Vec<SenderRecord>, ServiceError> {
        let credential = self
            .credentials
            .get()
            .await
            .filter(|c| c.is_usable())
            .ok_or_else(|| ServiceError::Auth("Not authenticated".to_string()))?;
        let token = credential.access_token.as_str();

        let ids = self
            .provider
            .list_message_ids(token, cap)
            .await
            .map_err(|e| {
                warn!(error = %e, "message listing failed");
                ServiceError::from(e)
            })?;
        let ids: Vec<String> = ids.into_iter().take(cap).collect();
        info!(count = ids.len(), cap, "listed message ids");

        let fetched: Vec<Option<SenderRecord>> = stream::iter(ids)
            .map(|id| fetch_record(self.provider.as_ref(), token, id))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        Ok(fetched.into_iter().flatten().collect())
    }
}

async fn fetch_record(
    provider: &dyn MailProvider,
    token: &str,
    id: String,
) -> Result<Option<SenderRecord>, ServiceError> {
    let headers = provider
        .get_message_metadata(token, &id, METADATA_HEADERS)
        .await
        .map_err(|e| {
            warn!(message_id = %id, error = %e, "metadata fetch failed");
            ServiceError::from(e)
        })?;

    let sender = match header_value(&headers, "From") {
        Some(from) if !from.is_empty() => from.to_string(),
        _ => {
            debug!(message_id = %id, "skipping message without From header");
            return Ok(None);
        }
    };
    let message = MessageRef::new(
        id,
        header_value(&headers, "Subject"),
        header_value(&headers, "Date"),
    );
    Ok(Some(SenderRecord { sender, message }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Credential;
    use crate::error::RemoteError;
    use crate::gmail_api::MockMailProvider;
    use crate::types::Header;

    async fn authenticated_store() -> CredentialStore {
        let store = CredentialStore::new();
        store
            .set(Credential {
                access_token: "tok".to_string(),
                refresh_token: None,
                expiry: None,
            })
            .await;
        store
    }

    fn headers_for(id: &str) -> Vec<Header> {
        match id {
            "m1" => vec![
                Header::new("From", "Jane Doe <jane@x.com>"),
                Header::new("Subject", "Hello"),
                Header::new("Date", "Mon, 1 Jan 2024 10:00:00 +0000"),
            ],
            "m2" => vec![Header::new("Subject", "No sender here")],
            _ => vec![Header::new("From", "bob@y.com")],
        }
    }

    #[tokio::test]
    async fn test_lists_in_order_and_skips_missing_from() {
        let mut provider = MockMailProvider::new();
        provider
            .expect_list_message_ids()
            .withf(|token, limit| token == "tok" && *limit == 500)
            .returning(|_, _| Ok(vec!["m1".into(), "m2".into(), "m3".into()]));
        provider
            .expect_get_message_metadata()
            .times(3)
            .returning(|_, id, _| Ok(headers_for(id)));

        let lister = MessageLister::new(Arc::new(provider), authenticated_store().await, 4);
        let records = lister.list_all(500).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sender, "Jane Doe <jane@x.com>");
        assert_eq!(records[0].message.subject, "Hello");
        assert_eq!(records[1].message.id, "m3");
        assert_eq!(records[1].message.subject, "No Subject");
        assert_eq!(records[1].message.date, "Unknown Date");
    }

    #[tokio::test]
    async fn test_auth_error_aborts_listing() {
        let mut provider = MockMailProvider::new();
        provider
            .expect_list_message_ids()
            .returning(|_, _| Ok(vec!["m1".into(), "m2".into()]));
        provider
            .expect_get_message_metadata()
            .returning(|_, id, _| {
                if id == "m2" {
                    Err(RemoteError::Unauthorized("expired".into()))
                } else {
                    Ok(headers_for(id))
                }
            });

        let lister = MessageLister::new(Arc::new(provider), authenticated_store().await, 1);
        let err = lister.list_all(500).await.unwrap_err();
        assert!(matches!(err, ServiceError::Auth(_)));
        assert!(err.needs_reauth());
    }

    #[tokio::test]
    async fn test_other_metadata_failures_are_surfaced() {
        let mut provider = MockMailProvider::new();
        provider
            .expect_list_message_ids()
            .returning(|_, _| Ok(vec!["m1".into()]));
        provider.expect_get_message_metadata().returning(|_, _, _| {
            Err(RemoteError::Status {
                status: 500,
                message: "backend".into(),
            })
        });

        let lister = MessageLister::new(Arc::new(provider), authenticated_store().await, 2);
        let err = lister.list_all(10).await.unwrap_err();
        assert!(matches!(err, ServiceError::Remote(_)));
    }

    #[tokio::test]
    async fn test_requires_credential_before_any_call() {
        let mut provider = MockMailProvider::new();
        provider.expect_list_message_ids().times(0);

        let lister = MessageLister::new(Arc::new(provider), CredentialStore::new(), 2);
        let err = lister.list_all(10).await.unwrap_err();
        assert!(matches!(err, ServiceError::Auth(_)));
    }
}
