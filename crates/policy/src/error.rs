use thiserror::Error;

/// Raised while building a [`crate::HeaderPolicy`]. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed reading policy file {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },
    #[error("invalid policy document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{category}: {message}")]
    Invalid { category: &'static str, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(category: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid { category, message: message.into() }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
