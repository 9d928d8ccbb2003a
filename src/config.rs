use crate::cli::Cli;
use crate::error::ConfigError;
use crate::gmail_api::auth::{GOOGLE_AUTH_URI, GOOGLE_TOKEN_URI};
use crate::gmail_api::{DeleteMode, OAuthSettings};
use std::net::{Ipv4Addr, SocketAddr};
use yup_oauth2::ApplicationSecret;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub oauth: OAuthSettings,
    pub list_cap: usize,
    pub concurrency: usize,
    pub delete_mode: DeleteMode,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Resolve OAuth settings from the command line / environment, falling
    /// back to the client secret file when any of them is missing.
    pub async fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let oauth = match (&cli.client_id, &cli.client_secret, &cli.redirect_uri) {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => OAuthSettings {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                redirect_uri: redirect_uri.clone(),
                auth_uri: GOOGLE_AUTH_URI.to_string(),
                token_uri: GOOGLE_TOKEN_URI.to_string(),
            },
            _ => {
                let secret = yup_oauth2::read_application_secret(&cli.client_secret_file)
                    .await
                    .map_err(|source| ConfigError::SecretFile {
                        path: cli.client_secret_file.display().to_string(),
                        source,
                    })?;
                oauth_from_secret(secret, cli)?
            }
        };
        Self::from_cli(cli, oauth)
    }

    pub fn from_cli(cli: &Cli, oauth: OAuthSettings) -> Result<Self, ConfigError> {
        if cli.list_cap == 0 {
            return Err(ConfigError::Invalid {
                name: "list_cap",
                reason: "must be at least 1".to_string(),
            });
        }
        if cli.concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: "concurrency",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, cli.port)),
            oauth,
            list_cap: cli.list_cap,
            concurrency: cli.concurrency,
            delete_mode: if cli.trash {
                DeleteMode::Trash
            } else {
                DeleteMode::Permanent
            },
            allowed_origins: cli.allowed_origins.clone(),
        })
    }
}

// Explicit command line values win over the ones in the secret file
pub fn oauth_from_secret(
    secret: ApplicationSecret,
    cli: &Cli,
) -> Result<OAuthSettings, ConfigError> {
    let redirect_uri = cli
        .redirect_uri
        .clone()
        .or_else(|| secret.redirect_uris.first().cloned())
        .ok_or(ConfigError::Missing("redirect_uri"))?;
    let client_id = cli.client_id.clone().unwrap_or(secret.client_id);
    if client_id.is_empty() {
        return Err(ConfigError::Missing("client_id"));
    }
    let client_secret = cli.client_secret.clone().unwrap_or(secret.client_secret);
    if client_secret.is_empty() {
        return Err(ConfigError::Missing("client_secret"));
    }

    Ok(OAuthSettings {
        client_id,
        client_secret,
        redirect_uri,
        auth_uri: non_empty_or(secret.auth_uri, GOOGLE_AUTH_URI),
        token_uri: non_empty_or(secret.token_uri, GOOGLE_TOKEN_URI),
    })
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}
