use thiserror::Error;

/// Failure reported by the remote mailbox provider, tagged once at the
/// boundary so callers never have to re-inspect status codes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("credential rejected: {0}")]
    Unauthorized(String),

    #[error("permission denied: {0}")]
    Forbidden(String),

    #[error("provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed provider response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => RemoteError::Unauthorized(message),
            403 => RemoteError::Forbidden(message),
            _ => RemoteError::Status { status, message },
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            RemoteError::from_status(status.as_u16(), e.to_string())
        } else {
            RemoteError::Transport(e.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("insufficient permissions: {0}")]
    Permission(String),

    #[error("remote provider failure: {0}")]
    Remote(String),
}

impl ServiceError {
    /// True when the caller has to restart the authorization flow.
    pub fn needs_reauth(&self) -> bool {
        matches!(self, ServiceError::Auth(_) | ServiceError::Permission(_))
    }
}

impl From<RemoteError> for ServiceError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::Unauthorized(msg) => ServiceError::Auth(msg),
            RemoteError::Forbidden(msg) => ServiceError::Permission(msg),
            other => ServiceError::Remote(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing OAuth setting: {0}")]
    Missing(&'static str),

    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("failed to read client secret file {path}: {source}")]
    SecretFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
