use std::io;

use crate::config::ConfigError;

/// Kind of document a post-processing check was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Json,
    Xml,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Json => f.write_str("JSON"),
            DocumentKind::Xml => f.write_str("XML"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A URL (or URL template) could not be turned into a request target.
    #[error("Invalid argument '{input}': {reason}")]
    InvalidArgument { input: String, reason: String },

    /// Opening the connection, writing the body or reading the response failed.
    #[error("Network error while talking to {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported text encoding: {charset}")]
    Encoding { charset: String },

    #[error("{kind} parse error: {message}")]
    Parse { kind: DocumentKind, message: String },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client backing the default connector could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl ApiError {
    pub(crate) fn invalid_argument(input: impl Into<String>, reason: impl ToString) -> Self {
        ApiError::InvalidArgument {
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true for failures raised during an HTTP exchange.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
