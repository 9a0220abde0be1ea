//! Error handling for the application

use thiserror::Error;

/// Errors raised while polling the open-interest endpoint.
///
/// None of these are fatal: the scheduler logs them and skips the tick.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Field not found in response: {0}")]
    MissingField(String),

    #[error("Field {field} is not numeric: {value}")]
    NotNumeric { field: String, value: String },
}

/// History persistence errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("History I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("History record is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Startup configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
