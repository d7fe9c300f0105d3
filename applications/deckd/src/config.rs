/// Daemon configuration
use crate::error::{DaemonError, Result};
use deck_playback::ControllerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `DECK_PLAYBACK__PROGRESS_INTERVAL_MS`
pub const ENV_PREFIX: &str = "DECK";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DaemonConfig {
    #[serde(default)]
    pub library: LibrarySettings,

    #[serde(default)]
    pub playback: ControllerConfig,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LibrarySettings {
    /// Directories scanned for audio files, in listing order
    #[serde(default = "default_music_dirs")]
    pub music_dirs: Vec<PathBuf>,

    #[serde(default)]
    pub follow_links: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Command-line values that take precedence over file and environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub music_dirs: Vec<PathBuf>,
    pub progress_interval_ms: Option<u64>,
    pub log_level: Option<String>,
}

impl DaemonConfig {
    /// Load configuration from an optional file and `DECK_` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load configuration using an explicit environment source
    pub fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        // An explicitly named file must exist
        if let Some(path) = path {
            if !path.exists() {
                return Err(DaemonError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            env.prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("library.music_dirs")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Apply command-line overrides
    pub fn apply(&mut self, overrides: Overrides) {
        if !overrides.music_dirs.is_empty() {
            self.library.music_dirs = overrides.music_dirs;
        }
        if let Some(interval) = overrides.progress_interval_ms {
            self.playback.progress_interval_ms = interval;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.playback.validate()?;

        if self.logging.level.trim().is_empty() {
            return Err(DaemonError::Config("log level must not be empty".to_string()));
        }

        if self.library.music_dirs.is_empty() {
            tracing::warn!("No music directories configured, library will be empty");
        }

        Ok(())
    }
}

// Default values
impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            music_dirs: default_music_dirs(),
            follow_links: false,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_music_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("./music")]
}

fn default_log_level() -> String {
    "deckd=info,deck_playback=info".to_string()
}
