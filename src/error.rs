use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the photo buffer.
#[derive(Debug, Clone, Error)]
pub enum PhotoError {
    /// Requested buffer position is outside `[0, size)`
    #[error("Photo not found: position {position} (buffer holds {size})")]
    NotFound { position: usize, size: usize },

    /// Writing the photo to disk failed
    #[error("Failed to write photo {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },
}

/// Errors raised while forwarding an upload to a relay peer.
#[derive(Debug, Clone, Error)]
pub enum RelayError {
    /// The HTTP client could not be constructed
    #[error("Relay client error: {0}")]
    Client(String),

    /// Connection, timeout or transfer failure
    #[error("Relay transport error: {0}")]
    Transport(String),

    /// The peer answered with a non-success status
    #[error("Relay failed with status {0}")]
    Status(u16),
}

/// Startup configuration errors. These are fatal.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Invalid relay target {value}: {reason}")]
    InvalidRelayTarget { value: String, reason: String },
}

/// Per-request failures, mapped to HTTP status codes at the handler boundary.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// `/photos/{n}` where `n` is not a non-negative integer (400)
    #[error("Invalid photo number: {0}")]
    InvalidPhotoNumber(String),

    /// Path escapes the allowed roots or has a disallowed extension (403)
    #[error("Forbidden")]
    Forbidden,

    /// File does not exist (404)
    #[error("File not found: {0}")]
    NotFound(String),

    /// Unknown path/method combination (404)
    #[error("Endpoint not found")]
    EndpointNotFound,

    /// Upload without a `Content-Length` header (400)
    #[error("Content-Length header is required")]
    LengthRequired,

    /// Reading a file failed for a reason other than absence (500)
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error(transparent)]
    Photo(#[from] PhotoError),

    #[error("Failed to handle photo: {0}")]
    Relay(#[from] RelayError),
}
