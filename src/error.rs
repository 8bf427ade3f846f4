//! Error types for dynaform

use thiserror::Error;

/// dynaform error type
#[derive(Error, Debug)]
pub enum DynaformError {
    /// Transport failure talking to the form service
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response from the form service
    #[error("{message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Server-supplied message, or a generic one
        message: String,
    },

    /// Success response that could not be used
    #[error("{0}")]
    Payload(String),

    /// Request refused with a user-facing message
    #[error("{0}")]
    Rejected(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DynaformError {
    /// Returns true if the server reported a conflict (409)
    pub fn is_conflict(&self) -> bool {
        matches!(self, DynaformError::Server { status: 409, .. })
    }
}

impl From<toml::de::Error> for DynaformError {
    fn from(e: toml::de::Error) -> Self {
        DynaformError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for DynaformError {
    fn from(e: toml::ser::Error) -> Self {
        DynaformError::Config(e.to_string())
    }
}

/// Result type for dynaform
pub type Result<T> = std::result::Result<T, DynaformError>;
