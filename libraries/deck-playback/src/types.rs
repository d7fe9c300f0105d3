//! Core types for playback control

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

/// A playable audio item
///
/// Immutable once created. Two tracks are equal when their locators are
/// equal; the display name does not take part in comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    name: String,
    uri: String,
}

impl Track {
    /// Create a track from a display name and an opaque locator
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Locator handed to the audio backend unchanged
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.uri)
    }
}

/// Player lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    /// Nothing loaded
    #[default]
    Stopped,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// Last load or play attempt failed
    Error,
}

impl PlayerState {
    /// All states, in declaration order
    pub const ALL: [PlayerState; 4] = [
        PlayerState::Stopped,
        PlayerState::Playing,
        PlayerState::Paused,
        PlayerState::Error,
    ];

    /// Whether a track must be selected in this state
    pub fn holds_track(self) -> bool {
        matches!(self, PlayerState::Playing | PlayerState::Paused)
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerState::Stopped => "stopped",
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Point-in-time view of the controller, replayed to new subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Current lifecycle state
    pub state: PlayerState,

    /// Currently selected track, if any
    pub track: Option<Track>,

    /// Percent complete, 0.0 to 100.0
    pub progress: f64,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            state: PlayerState::Stopped,
            track: None,
            progress: 0.0,
        }
    }
}

/// Default progress polling interval in milliseconds
pub const DEFAULT_PROGRESS_INTERVAL_MS: u64 = 500;

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Progress polling interval in milliseconds (default: 500)
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
}

fn default_progress_interval_ms() -> u64 {
    DEFAULT_PROGRESS_INTERVAL_MS
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: DEFAULT_PROGRESS_INTERVAL_MS,
        }
    }
}

impl ControllerConfig {
    /// Progress polling interval as a [`Duration`]
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.progress_interval_ms == 0 {
            return Err(PlaybackError::Config(
                "progress_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Percent complete for a position within a duration
///
/// Zero when the duration is unknown (zero); clamped to `[0.0, 100.0]` when
/// the backend reports a position past the end.
pub fn progress_percent(position: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 0.0;
    }
    // Scale before dividing so exact fractions stay exact
    ((position.as_nanos() * 100) as f64 / duration.as_nanos() as f64).clamp(0.0, 100.0)
}
