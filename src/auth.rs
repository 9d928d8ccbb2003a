use crate::credentials::{Credential, CredentialStore};
use crate::error::ServiceError;
use crate::gmail_api::OAuthFlow;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub message: String,
}

/// Drives the credential lifecycle. This is the only component that writes
/// to the [`CredentialStore`].
pub struct AuthOrchestrator {
    flow: Arc<dyn OAuthFlow>,
    credentials: CredentialStore,
}

impl AuthOrchestrator {
    pub fn new(flow: Arc<dyn OAuthFlow>, credentials: CredentialStore) -> Self {
        Self { flow, credentials }
    }

    pub fn build_authorization_url(&self) -> String {
        self.flow.authorization_url()
    }

    /// Exchange a one-time authorization code. The store is left untouched
    /// when the exchange fails.
    pub async fn exchange_code(&self, code: &str) -> Result<Credential, ServiceError> {
        if code.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Authorization code is required".to_string(),
            ));
        }

        match self.flow.exchange_code(code.trim()).await {
            Ok(credential) if credential.is_usable() => {
                self.credentials.set(credential.clone()).await;
                info!(
                    has_refresh_token = credential.refresh_token.is_some(),
                    "authorization code exchanged"
                );
                Ok(credential)
            }
            Ok(_) => {
                warn!("token endpoint returned an empty access token");
                Err(ServiceError::Auth(
                    "Provider returned an empty access token".to_string(),
                ))
            }
            Err(e) => {
                warn!(error = %e, "authorization code exchange failed");
                Err(ServiceError::Auth(e.to_string()))
            }
        }
    }

    pub async fn status(&self) -> AuthStatus {
        if self.credentials.is_usable().await {
            AuthStatus {
                authenticated: true,
                message: "User is authenticated".to_string(),
            }
        } else {
            AuthStatus {
                authenticated: false,
                message: "User is not authenticated".to_string(),
            }
        }
    }

    /// Renew the access token when it is about to expire and a refresh
    /// token is available. Anything else is left for the provider to judge.
    pub async fn refresh_if_expired(&self) -> Result<(), ServiceError> {
        let Some(current) = self.credentials.get().await else {
            return Ok(());
        };
        if !current.is_expired_at(Utc::now()) {
            return Ok(());
        }
        let Some(refresh_token) = current.refresh_token.as_deref() else {
            return Ok(());
        };

        match self.flow.refresh(refresh_token).await {
            Ok(mut renewed) if renewed.is_usable() => {
                if renewed.refresh_token.is_none() {
                    renewed.refresh_token = current.refresh_token.clone();
                }
                self.credentials.set(renewed).await;
                info!("access token refreshed");
                Ok(())
            }
            Ok(_) => Err(ServiceError::Auth(
                "Provider returned an empty access token".to_string(),
            )),
            // Only a rejected grant ends the session; transport and server
            // failures leave the current token in place.
            Err(e) => {
                warn!(error = %e, "access token refresh failed");
                Err(ServiceError::from(e))
            }
        }
    }

    /// React to an error observed by a listing or deletion. A 401 means the
    /// stored credential is dead; a 403 leaves it in place.
    pub async fn observe_remote_error(&self, error: &ServiceError) {
        if matches!(error, ServiceError::Auth(_)) {
            self.invalidate().await;
        }
    }

    pub async fn invalidate(&self) {
        if self.credentials.clear().await.is_some() {
            warn!("stored credential invalidated");
        }
    }
}
