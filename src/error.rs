//! Error types for mythlink.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mythlink.
#[derive(Error, Debug)]
pub enum Error {
    // Backend errors
    #[error("MythTV backend unreachable at {0}")]
    BackendUnreachable(String),

    #[error("Recording not found: chanid {chan_id} starttime {start}")]
    RecordingNotFound { chan_id: u32, start: String },

    #[error("Recording file not found in any storage directory: {0}")]
    CheckfileNotFound(String),

    #[error("Backend request failed: {0}")]
    Backend(String),

    // Metadata provider errors
    #[error("TheTVDB API key not configured. Set TVDB_API_KEY or [tvdb].api_key")]
    TvdbApiKeyMissing,

    #[error("TheTVDB request failed: {0}")]
    Tvdb(String),

    // Destination tree errors
    #[error("Non-link file found in destination path: {}", .0.display())]
    ForeignFile(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    // Skip list errors
    #[error(transparent)]
    SkipList(#[from] SkipListError),

    // Configuration errors
    #[error("Invalid start time: {0}")]
    InvalidStartTime(String),

    #[error("Config error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // TOML errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}

/// Failure of the commercial-break detector for a single recording.
///
/// These never abort a resync; the synchronizer logs and counts them.
#[derive(Error, Debug)]
pub enum SkipListError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    ExitStatus { program: String, status: String },

    #[error("malformed skip list output: {0}")]
    Malformed(String),

    #[error("failed to write sidecar: {0}")]
    Write(#[from] std::io::Error),
}
