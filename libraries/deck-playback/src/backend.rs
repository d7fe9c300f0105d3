//! Audio backend trait
//!
//! Abstracts the platform decode/output engine. The controller never talks
//! to a backend directly; it goes through [`PlaybackEngine`](crate::PlaybackEngine).

use crate::error::BackendError;
use std::time::Duration;

/// Platform audio backend
///
/// Implementors own the actual decoder and output device. A backend holds at
/// most one loaded resource at a time.
#[cfg_attr(test, mockall::automock)]
pub trait AudioBackend: Send {
    /// Open the resource at `uri`, ready to play from the start
    ///
    /// `uri` is an opaque locator, passed through unchanged from the track.
    fn load(&mut self, uri: &str) -> Result<(), BackendError>;

    /// Start or resume output of the loaded resource
    fn play(&mut self) -> Result<(), BackendError>;

    /// Suspend output, keeping the current position
    fn pause(&mut self);

    /// Stop output and release the loaded resource
    ///
    /// Must be safe to call with nothing loaded.
    fn stop(&mut self);

    /// Current position within the loaded resource
    fn position(&self) -> Result<Duration, BackendError>;

    /// Total duration of the loaded resource (zero if unknown)
    fn duration(&self) -> Result<Duration, BackendError>;
}
