//! Gmail API module split into logical submodules
//!
//! This module provides the remote provider used by the core:
//! - auth: OAuth consent URL, code exchange and token refresh
//! - messages: Message listing and metadata fetching
//! - operations: Message deletion (permanent or trash)

pub mod auth;
pub mod messages;
pub mod operations;

pub use auth::{GoogleOAuthFlow, OAuthFlow, OAuthSettings, GMAIL_FULL_SCOPE};
pub use operations::DeleteMode;

#[cfg(test)]
pub use auth::MockOAuthFlow;

use crate::error::RemoteError;
use crate::types::Header;
use async_trait::async_trait;

pub const GMAIL_MESSAGES_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages";

/// Headers requested for every listed message.
pub const METADATA_HEADERS: &[&str] = &["From", "Subject", "Date"];

// Define a trait for the mailbox operations to allow mocking
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailProvider: Send + Sync {
    async fn list_message_ids(
        &self,
        access_token: &str,
        limit: usize,
    ) -> Result<Vec<String>, RemoteError>;

    async fn get_message_metadata(
        &self,
        access_token: &str,
        id: &str,
        header_names: &[&'static str],
    ) -> Result<Vec<Header>, RemoteError>;

    async fn delete_message(&self, access_token: &str, id: &str) -> Result<(), RemoteError>;
}

#[derive(Debug, Clone)]
pub struct GmailClient {
    client: reqwest::Client,
    base_url: String,
    delete_mode: DeleteMode,
}

impl GmailClient {
    pub fn new(client: reqwest::Client, delete_mode: DeleteMode) -> Self {
        Self {
            client,
            base_url: GMAIL_MESSAGES_URL.to_string(),
            delete_mode,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl MailProvider for GmailClient {
    async fn list_message_ids(
        &self,
        access_token: &str,
        limit: usize,
    ) -> Result<Vec<String>, RemoteError> {
        self.fetch_message_ids(access_token, limit).await
    }

    async fn get_message_metadata(
        &self,
        access_token: &str,
        id: &str,
        header_names: &[&'static str],
    ) -> Result<Vec<Header>, RemoteError> {
        self.fetch_metadata(access_token, id, header_names).await
    }

    async fn delete_message(&self, access_token: &str, id: &str) -> Result<(), RemoteError> {
        match self.delete_mode {
            DeleteMode::Permanent => self.delete_permanently(access_token, id).await,
            DeleteMode::Trash => self.move_to_trash(access_token, id).await,
        }
    }
}

// Turn a non-success response into a classified error, keeping the body text
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(RemoteError::from_status(status.as_u16(), error_text))
}
