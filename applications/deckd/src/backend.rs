//! Headless audio backend
//!
//! Opens local files with symphonia to learn their duration, then tracks a
//! playback position against the clock instead of driving an output device.

use deck_playback::{AudioBackend, BackendError};
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio::time::Instant;

struct Loaded {
    uri: String,
    duration: Duration,
    /// Position accumulated before the current run
    elapsed: Duration,
    /// Start of the current run, `None` while paused
    running_since: Option<Instant>,
}

impl Loaded {
    fn position(&self) -> Duration {
        let running = self.running_since.map_or(Duration::ZERO, |t| t.elapsed());
        let position = self.elapsed + running;

        if self.duration.is_zero() {
            position
        } else {
            position.min(self.duration)
        }
    }
}

/// Backend that plays silently in wall-clock time
#[derive(Default)]
pub struct HeadlessBackend {
    loaded: Option<Loaded>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// URI of the loaded file, if any
    pub fn loaded_uri(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.uri.as_str())
    }
}

impl AudioBackend for HeadlessBackend {
    fn load(&mut self, uri: &str) -> Result<(), BackendError> {
        self.stop();

        let duration = probe_duration(Path::new(uri))?;
        tracing::debug!(uri, duration_ms = duration.as_millis() as u64, "Loaded file");

        self.loaded = Some(Loaded {
            uri: uri.to_string(),
            duration,
            elapsed: Duration::ZERO,
            running_since: None,
        });
        Ok(())
    }

    fn play(&mut self) -> Result<(), BackendError> {
        let loaded = self.loaded.as_mut().ok_or(BackendError::NothingLoaded)?;
        if loaded.running_since.is_none() {
            loaded.running_since = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.elapsed = loaded.position();
            loaded.running_since = None;
        }
    }

    fn stop(&mut self) {
        if let Some(loaded) = self.loaded.take() {
            tracing::debug!(uri = %loaded.uri, "Released file");
        }
    }

    fn position(&self) -> Result<Duration, BackendError> {
        self.loaded
            .as_ref()
            .map(Loaded::position)
            .ok_or(BackendError::NothingLoaded)
    }

    fn duration(&self) -> Result<Duration, BackendError> {
        self.loaded
            .as_ref()
            .map(|l| l.duration)
            .ok_or(BackendError::NothingLoaded)
    }
}

/// Probe `path` and return the duration of its default track
///
/// Zero when the container does not report a frame count.
pub fn probe_duration(path: &Path) -> Result<Duration, BackendError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => BackendError::NotFound(path.display().to_string()),
        _ => BackendError::Io(e),
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| BackendError::Unsupported(format!("{}: {}", path.display(), e)))?;

    let track = probed
        .format
        .default_track()
        .ok_or_else(|| BackendError::Unsupported(format!("{}: no audio track", path.display())))?;

    let params = &track.codec_params;
    let duration = match (params.n_frames, params.sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => {
            Duration::from_secs_f64(frames as f64 / f64::from(rate))
        }
        _ => Duration::ZERO,
    };

    Ok(duration)
}
