use crate::credentials::Credential;
use crate::error::{ConfigError, RemoteError};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use oauth2::basic::{BasicClient, BasicErrorResponse, BasicTokenResponse};
use oauth2::reqwest::async_http_client;
use oauth2::url::ParseError;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl,
    RefreshToken, RequestTokenError, Scope, TokenResponse, TokenUrl,
};

pub const GMAIL_FULL_SCOPE: &str = "https://mail.google.com/";
pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

// The code is relayed back by hand, so `state` is never checked. A fixed
// value keeps the consent URL stable between calls.
const RELAY_STATE: &str = "mailpurge";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_uri: String,
    pub token_uri: String,
}

// Define a trait for OAuth flow operations to allow mocking
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuthFlow: Send + Sync {
    /// Consent URL requesting offline access and the full-mailbox scope.
    fn authorization_url(&self) -> String;

    async fn exchange_code(&self, code: &str) -> Result<Credential, RemoteError>;

    async fn refresh(&self, refresh_token: &str) -> Result<Credential, RemoteError>;
}

pub struct GoogleOAuthFlow {
    client: BasicClient,
}

impl GoogleOAuthFlow {
    pub fn new(settings: OAuthSettings) -> Result<Self, ConfigError> {
        let auth_url = AuthUrl::new(settings.auth_uri).map_err(invalid_url("auth_uri"))?;
        let token_url = TokenUrl::new(settings.token_uri).map_err(invalid_url("token_uri"))?;
        let redirect_url =
            RedirectUrl::new(settings.redirect_uri).map_err(invalid_url("redirect_uri"))?;

        // Google expects the client credentials in the form body
        let client = BasicClient::new(
            ClientId::new(settings.client_id),
            Some(ClientSecret::new(settings.client_secret)),
            auth_url,
            Some(token_url),
        )
        .set_auth_type(AuthType::RequestBody)
        .set_redirect_uri(redirect_url);

        Ok(Self { client })
    }
}

#[async_trait]
impl OAuthFlow for GoogleOAuthFlow {
    fn authorization_url(&self) -> String {
        let (url, _state) = self
            .client
            .authorize_url(|| CsrfToken::new(RELAY_STATE.to_string()))
            .add_scope(Scope::new(GMAIL_FULL_SCOPE.to_string()))
            .add_extra_param("access_type", "offline")
            .url();
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<Credential, RemoteError> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(classify_token_error)?;
        Ok(into_credential(&token))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Credential, RemoteError> {
        let token = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(classify_token_error)?;
        Ok(into_credential(&token))
    }
}

fn invalid_url(name: &'static str) -> impl Fn(ParseError) -> ConfigError {
    move |e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    }
}

fn into_credential(token: &BasicTokenResponse) -> Credential {
    Credential {
        access_token: token.access_token().secret().clone(),
        refresh_token: token.refresh_token().map(|t| t.secret().clone()),
        expiry: token
            .expires_in()
            .and_then(|lifetime| Duration::from_std(lifetime).ok())
            .map(|lifetime| Utc::now() + lifetime),
    }
}

/// An error body from the token endpoint (`invalid_grant`, `invalid_client`,
/// ...) means the grant itself was refused. Everything else is a failure to
/// reach or understand the endpoint.
fn classify_token_error<RE>(e: RequestTokenError<RE, BasicErrorResponse>) -> RemoteError
where
    RE: std::error::Error + 'static,
{
    match e {
        RequestTokenError::ServerResponse(response) => RemoteError::Unauthorized(
            response
                .error_description()
                .cloned()
                .unwrap_or_else(|| response.error().to_string()),
        ),
        RequestTokenError::Request(e) => RemoteError::Transport(e.to_string()),
        RequestTokenError::Parse(e, _) => RemoteError::Decode(e.to_string()),
        RequestTokenError::Other(message) => RemoteError::Decode(message),
    }
}
