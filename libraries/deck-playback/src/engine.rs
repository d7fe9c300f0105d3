//! Playback engine
//!
//! Owns the single [`AudioBackend`] handle and translates backend failures
//! into [`PlaybackError`]s.

use crate::{
    backend::AudioBackend,
    error::{PlaybackError, Result},
};
use std::time::Duration;
use tracing::debug;

/// Wrapper around one audio backend handle
///
/// Tracks which locator is loaded so that reloads always release the
/// previous resource first and `stop()` with nothing loaded never reaches
/// the backend.
pub struct PlaybackEngine {
    backend: Box<dyn AudioBackend>,
    loaded: Option<String>,
}

impl PlaybackEngine {
    /// Create an engine owning `backend`
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            loaded: None,
        }
    }

    /// Load `uri`, replacing any previously loaded resource
    pub fn load(&mut self, uri: &str) -> Result<()> {
        self.release();

        debug!(uri, "Loading resource");
        self.backend
            .load(uri)
            .map_err(|source| PlaybackError::LoadFailure {
                uri: uri.to_string(),
                source,
            })?;

        self.loaded = Some(uri.to_string());
        Ok(())
    }

    /// Start or resume playback of the loaded resource
    pub fn play(&mut self) -> Result<()> {
        let uri = self
            .loaded
            .as_deref()
            .ok_or(PlaybackError::NoTrackSelected)?;

        self.backend
            .play()
            .map_err(|source| PlaybackError::PlayFailure {
                uri: uri.to_string(),
                source,
            })
    }

    /// Pause output; no-op with nothing loaded
    pub fn pause(&mut self) {
        if self.loaded.is_some() {
            self.backend.pause();
        }
    }

    /// Stop output and release the loaded resource; no-op with nothing loaded
    pub fn stop(&mut self) {
        self.release();
    }

    /// Current position (zero with nothing loaded)
    pub fn position(&self) -> Result<Duration> {
        if self.loaded.is_none() {
            return Ok(Duration::ZERO);
        }
        self.backend.position().map_err(PlaybackError::Sampling)
    }

    /// Total duration (zero with nothing loaded or unknown)
    pub fn duration(&self) -> Result<Duration> {
        if self.loaded.is_none() {
            return Ok(Duration::ZERO);
        }
        self.backend.duration().map_err(PlaybackError::Sampling)
    }

    /// Locator of the loaded resource
    pub fn loaded_uri(&self) -> Option<&str> {
        self.loaded.as_deref()
    }

    /// Whether a resource is loaded
    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    fn release(&mut self) {
        if let Some(uri) = self.loaded.take() {
            debug!(uri = %uri, "Releasing resource");
            self.backend.stop();
        }
    }
}
