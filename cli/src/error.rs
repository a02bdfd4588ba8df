use reqwest::StatusCode;

/// Failures of the persistent key-value backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is corrupt: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize storage file: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("could not determine config directory")]
    NoConfigDir,
}

/// Failures of calls against the auth API.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}{}", detail_suffix(.detail))]
    Api {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("could not persist token: {0}")]
    Storage(#[from] StorageError),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

impl AuthError {
    /// The server-provided message, if the failure carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AuthError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}
