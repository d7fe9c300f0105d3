//! Media library
//!
//! Flat, ordered listing of the audio files under the configured
//! directories. Tracks are named after the file stem and located by path.

use crate::error::{DaemonError, Result};
use deck_playback::Track;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported audio file extensions
const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "aac", "m4a", "opus"];

/// Ordered list of playable tracks
#[derive(Debug, Clone, Default)]
pub struct MediaLibrary {
    tracks: Vec<Track>,
}

impl MediaLibrary {
    /// Scan `dirs` in order; files within a directory are sorted by path
    ///
    /// Directories that are missing or unreadable are logged and skipped.
    pub fn scan(dirs: &[PathBuf], follow_links: bool) -> Self {
        let mut tracks = Vec::new();

        for dir in dirs {
            match scan_directory(dir, follow_links) {
                Ok(mut found) => {
                    tracing::debug!(dir = %dir.display(), count = found.len(), "Scanned directory");
                    tracks.append(&mut found);
                }
                Err(e) => {
                    tracing::warn!("Failed to scan {}: {}", dir.display(), e);
                }
            }
        }

        tracing::info!(tracks = tracks.len(), "Library ready");
        Self { tracks }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Track at zero-based `index`
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

fn scan_directory(dir: &Path, follow_links: bool) -> Result<Vec<Track>> {
    if !dir.is_dir() {
        return Err(DaemonError::Library(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let tracks = WalkDir::new(dir)
        .follow_links(follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file() && is_audio_file(entry.path()))
        .filter_map(|entry| track_for(entry.path()))
        .collect();

    Ok(tracks)
}

fn track_for(path: &Path) -> Option<Track> {
    let name = path.file_stem()?.to_string_lossy().into_owned();
    Some(Track::new(name, path.to_string_lossy().into_owned()))
}

/// Check if a file is a supported audio file
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
