use thiserror::Error;

/// Application-wide error types for the collector.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (fetching a page).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Page bytes could not be decoded from the source charset.
    #[error("Transcode error: {0}")]
    TranscodeError(String),

    /// RSS/Atom body could not be parsed.
    #[error("Feed error: {0}")]
    FeedError(String),

    /// A field rule cannot be compiled (e.g. more than one `[内容]` marker).
    #[error("Invalid rule for field '{field}': {reason}")]
    InvalidRule { field: String, reason: String },

    /// A filter line is missing its `[|]` separator or holds a bad regex.
    #[error("Malformed filter for field '{field}' at line {line}: {text}")]
    MalformedFilter {
        field: String,
        line: usize,
        text: String,
    },

    /// Any other configuration problem caught at load time.
    #[error("Config error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AppError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) => true,
            AppError::HttpError(msg) => {
                msg.contains("timeout") || msg.contains("connect") || msg.contains("reset")
            }
            _ => false,
        }
    }

    /// Returns true if this error comes from a bad rule set rather than from the network.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidRule { .. }
                | AppError::MalformedFilter { .. }
                | AppError::ConfigError(_)
                | AppError::SerializationError(_)
        )
    }
}
