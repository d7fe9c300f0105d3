//! Playback service
//!
//! Long-lived owner of the playback controller. Front ends come and go as
//! observers; the service, and with it the player, outlives all of them.

use crate::backend::HeadlessBackend;
use crate::config::DaemonConfig;
use crate::error::{DaemonError, Result};
use crate::library::MediaLibrary;
use deck_playback::{AudioBackend, PlaybackController, PlayerState, Track};
use tracing::{debug, info};

pub struct PlaybackService {
    controller: PlaybackController,
    library: MediaLibrary,
    shut_down: bool,
}

impl PlaybackService {
    /// Scan the configured library and start a controller on a headless backend
    pub fn start(config: &DaemonConfig) -> Result<Self> {
        let library = MediaLibrary::scan(&config.library.music_dirs, config.library.follow_links);
        Self::with_backend(HeadlessBackend::new(), library, config)
    }

    /// Start with an explicit backend and library
    pub fn with_backend(
        backend: impl AudioBackend + 'static,
        library: MediaLibrary,
        config: &DaemonConfig,
    ) -> Result<Self> {
        let controller = PlaybackController::new(backend, config.playback.clone())?;
        info!(
            tracks = library.len(),
            interval_ms = config.playback.progress_interval_ms,
            "Playback service started"
        );

        Ok(Self {
            controller,
            library,
            shut_down: false,
        })
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn library(&self) -> &MediaLibrary {
        &self.library
    }

    /// Play the library item at zero-based `index`
    pub fn play_index(&self, index: usize) -> Result<()> {
        let track = self.track(index)?;
        self.controller.play(Some(track))?;
        Ok(())
    }

    /// Activate a library item the way a list click does
    ///
    /// Stops when something is playing, otherwise plays the item.
    pub fn select_index(&self, index: usize) -> Result<()> {
        let track = self.track(index)?;

        if self.controller.state() == PlayerState::Playing {
            self.controller.stop();
            Ok(())
        } else {
            self.controller.play(Some(track))?;
            Ok(())
        }
    }

    /// Stop playback and release the backend; later calls do nothing
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        debug!(observers = self.controller.observer_count(), "Shutting down playback");
        self.controller.stop();
        info!("Playback service stopped");
    }

    fn track(&self, index: usize) -> Result<Track> {
        self.library.get(index).cloned().ok_or_else(|| {
            DaemonError::Library(format!(
                "no track #{} (library has {})",
                index + 1,
                self.library.len()
            ))
        })
    }
}

impl Drop for PlaybackService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
