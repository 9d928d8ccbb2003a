use crate::auth::AuthOrchestrator;
use crate::config::AppConfig;
use crate::credentials::CredentialStore;
use crate::deleter::BatchDeleter;
use crate::error::ConfigError;
use crate::gmail_api::{GmailClient, GoogleOAuthFlow, MailProvider, OAuthFlow};
use crate::lister::MessageLister;
use std::sync::Arc;

/// Everything a request handler needs. All three components share one
/// [`CredentialStore`], so the service supports a single active session.
pub struct AppState {
    pub auth: AuthOrchestrator,
    pub lister: MessageLister,
    pub deleter: BatchDeleter,
    pub list_cap: usize,
}

impl AppState {
    pub fn new(
        flow: Arc<dyn OAuthFlow>,
        provider: Arc<dyn MailProvider>,
        list_cap: usize,
        concurrency: usize,
    ) -> Self {
        let credentials = CredentialStore::new();
        Self {
            auth: AuthOrchestrator::new(flow, credentials.clone()),
            lister: MessageLister::new(provider.clone(), credentials.clone(), concurrency),
            deleter: BatchDeleter::new(provider, credentials, concurrency),
            list_cap,
        }
    }

    pub fn from_config(config: &AppConfig, client: reqwest::Client) -> Result<Self, ConfigError> {
        let flow = GoogleOAuthFlow::new(config.oauth.clone())?;
        let provider = GmailClient::new(client, config.delete_mode);
        Ok(Self::new(
            Arc::new(flow),
            Arc::new(provider),
            config.list_cap,
            config.concurrency,
        ))
    }
}
