//! Error types for playback control

use thiserror::Error;

/// Errors reported by an [`AudioBackend`](crate::AudioBackend)
#[derive(Debug, Error)]
pub enum BackendError {
    /// The locator does not point at anything the backend can open
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The resource exists but cannot be decoded
    #[error("Unsupported format: {0}")]
    Unsupported(String),

    /// An operation needed a loaded resource
    #[error("Nothing loaded")]
    NothingLoaded,

    /// Any other backend failure
    #[error("Backend error: {0}")]
    Other(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Playback errors
///
/// `NoTrackSelected`, `LoadFailure` and `PlayFailure` are never fatal: the
/// controller maps them to [`PlayerState::Error`](crate::PlayerState::Error)
/// and notifies observers before returning them.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Resume requested with nothing selected
    #[error("No track selected")]
    NoTrackSelected,

    /// Backend could not open or decode the resource
    #[error("Failed to load {uri}: {source}")]
    LoadFailure {
        /// Locator that was being loaded
        uri: String,
        /// Underlying backend error
        source: BackendError,
    },

    /// Backend could not start playback after a successful load
    #[error("Failed to start playback of {uri}: {source}")]
    PlayFailure {
        /// Locator that was loaded
        uri: String,
        /// Underlying backend error
        source: BackendError,
    },

    /// Position or duration could not be sampled
    #[error("Failed to sample playback position: {0}")]
    Sampling(#[source] BackendError),

    /// Controller was created outside a tokio runtime
    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Failure reported by an observer while handling a notification
#[derive(Debug, Error)]
#[error("Observer failed: {0}")]
pub struct ObserverError(pub String);

/// Result type returned by observer callbacks
pub type ObserverResult = std::result::Result<(), ObserverError>;
