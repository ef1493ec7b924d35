use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PennyError {
    /// A session record that cannot be persisted or trusted.
    #[error("Invalid session data: {0}")]
    InvalidSessionData(String),

    /// 401/403 from the server, or no usable local session. The top-level
    /// handler clears the stored session when it sees this.
    #[error("Not authenticated")]
    AuthenticationFailure,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 4xx with a server-provided message and optional per-field details.
    #[error("{message}")]
    Validation {
        message: String,
        errors: BTreeMap<String, String>,
    },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PennyError>;
