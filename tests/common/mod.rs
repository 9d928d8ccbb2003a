#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use mailpurge::credentials::Credential;
use mailpurge::error::RemoteError;
use mailpurge::gmail_api::{MailProvider, OAuthFlow};
use mailpurge::types::Header;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const GOOD_CODE: &str = "4/good-code";

/// In-memory mailbox standing in for the Gmail API.
#[derive(Default)]
pub struct FakeMailbox {
    pub messages: Vec<(String, Vec<Header>)>,
    pub metadata_failures: HashMap<String, RemoteError>,
    pub delete_failures: HashMap<String, RemoteError>,
    pub deleted: Mutex<Vec<String>>,
    pub tokens_seen: Mutex<Vec<String>>,
    pub metadata_calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeMailbox {
    pub fn with_message(mut self, id: &str, from: Option<&str>, subject: Option<&str>) -> Self {
        let mut headers = Vec::new();
        if let Some(from) = from {
            headers.push(Header::new("From", from));
        }
        if let Some(subject) = subject {
            headers.push(Header::new("Subject", subject));
        }
        headers.push(Header::new("Date", "Tue, 10 Jun 2025 22:00:00 -0600"));
        self.messages.push((id.to_string(), headers));
        self
    }

    pub fn failing_metadata(mut self, id: &str, error: RemoteError) -> Self {
        self.metadata_failures.insert(id.to_string(), error);
        self
    }

    pub fn failing_delete(mut self, id: &str, error: RemoteError) -> Self {
        self.delete_failures.insert(id.to_string(), error);
        self
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        // Give sibling calls a chance to start before this one finishes
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl MailProvider for FakeMailbox {
    async fn list_message_ids(
        &self,
        access_token: &str,
        limit: usize,
    ) -> Result<Vec<String>, RemoteError> {
        if access_token.is_empty() {
            return Err(RemoteError::Unauthorized("missing token".into()));
        }
        self.tokens_seen
            .lock()
            .unwrap()
            .push(access_token.to_string());
        Ok(self
            .messages
            .iter()
            .take(limit)
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn get_message_metadata(
        &self,
        _access_token: &str,
        id: &str,
        _header_names: &[&'static str],
    ) -> Result<Vec<Header>, RemoteError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await;
        let result = match self.metadata_failures.get(id) {
            Some(e) => Err(e.clone()),
            None => Ok(self
                .messages
                .iter()
                .find(|(mid, _)| mid == id)
                .map(|(_, headers)| headers.clone())
                .unwrap_or_default()),
        };
        self.leave();
        result
    }

    async fn delete_message(&self, access_token: &str, id: &str) -> Result<(), RemoteError> {
        self.tokens_seen
            .lock()
            .unwrap()
            .push(access_token.to_string());
        self.enter().await;
        let result = match self.delete_failures.get(id) {
            Some(e) => Err(e.clone()),
            None => {
                self.deleted.lock().unwrap().push(id.to_string());
                Ok(())
            }
        };
        self.leave();
        result
    }
}

pub const RENEWED_TOKEN: &str = "renewed-token";

/// Token endpoint stand-in. Only [`GOOD_CODE`] is accepted; refreshes hand
/// out [`RENEWED_TOKEN`] unless a failure is configured.
pub struct FakeOAuthFlow {
    lifetime_secs: i64,
    refresh_failure: Option<RemoteError>,
    pub refresh_calls: AtomicUsize,
}

impl Default for FakeOAuthFlow {
    fn default() -> Self {
        Self {
            lifetime_secs: 3600,
            refresh_failure: None,
            refresh_calls: AtomicUsize::new(0),
        }
    }
}

impl FakeOAuthFlow {
    /// Issue access tokens that are already inside the refresh window.
    pub fn expiring_soon(mut self) -> Self {
        self.lifetime_secs = 30;
        self
    }

    pub fn failing_refresh(mut self, error: RemoteError) -> Self {
        self.refresh_failure = Some(error);
        self
    }
}

#[async_trait]
impl OAuthFlow for FakeOAuthFlow {
    fn authorization_url(&self) -> String {
        "https://accounts.google.com/o/oauth2/auth?access_type=offline&scope=https%3A%2F%2Fmail.google.com%2F&response_type=code&client_id=test&redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback".to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<Credential, RemoteError> {
        if code == GOOD_CODE {
            Ok(Credential {
                access_token: "access-token".to_string(),
                refresh_token: Some("refresh-token".to_string()),
                expiry: Some(Utc::now() + Duration::seconds(self.lifetime_secs)),
            })
        } else {
            Err(RemoteError::Unauthorized("invalid_grant".to_string()))
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Credential, RemoteError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(refresh_token, "refresh-token");
        match &self.refresh_failure {
            Some(e) => Err(e.clone()),
            None => Ok(Credential {
                access_token: RENEWED_TOKEN.to_string(),
                refresh_token: None,
                expiry: Some(Utc::now() + Duration::seconds(3600)),
            }),
        }
    }
}
