use forge_core::ForgeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("failed to decode '{endpoint}' response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("'{0}' does not accept a generation request")]
    WrongMethod(String),

    #[error("a request for '{0}' is already in flight")]
    InFlight(String),

    #[error(transparent)]
    Core(#[from] ForgeError),
}

impl ClientError {
    /// HTTP status of an API failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Unauthorized(_) => Some(401),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
