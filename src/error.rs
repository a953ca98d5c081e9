use thiserror::Error;

#[derive(Debug, Error)]
pub enum NailedItError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backend answered with a non-success status.
    #[error("{operation} failed: {reason}")]
    Http {
        operation: &'static str,
        status: u16,
        reason: String,
    },

    #[error("{operation} failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    #[error("Failed to decode {what}: {message}")]
    Decode { what: &'static str, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NailedItError {
    pub(crate) fn http(operation: &'static str, status: reqwest::StatusCode) -> Self {
        Self::Http {
            operation,
            status: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
        }
    }

    pub(crate) fn transport(operation: &'static str, err: reqwest::Error) -> Self {
        Self::Transport {
            operation,
            message: err.to_string(),
        }
    }
}

impl From<NailedItError> for String {
    fn from(err: NailedItError) -> Self {
        err.to_string()
    }
}

pub type Result<T> = std::result::Result<T, NailedItError>;
