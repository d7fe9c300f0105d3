//! Playback events
//!
//! Owned, serializable form of observer notifications, and an observer that
//! forwards them into a channel. Delivery to a [`ChannelObserver`] is an
//! enqueue and never waits on the consumer, so slow consumers (a UI
//! thread, a network client) cannot stall playback control.

use crate::{
    error::{ObserverError, ObserverResult, PlaybackError},
    hub::PlaybackObserver,
    types::{PlayerState, Track},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Events emitted to channel subscribers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Player state changed
    StateChanged {
        /// The new state
        state: PlayerState,
    },

    /// Progress sampled (periodic while playing)
    ProgressUpdated {
        /// Percent complete, 0.0 to 100.0
        progress: f64,
    },

    /// Selected track changed
    TrackChanged {
        /// The new selection, `None` after stop
        track: Option<Track>,
    },

    /// A playback operation failed
    Error {
        /// Error message
        message: String,
    },
}

/// Observer that forwards every notification into an unbounded channel
pub struct ChannelObserver {
    tx: UnboundedSender<PlaybackEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its channel
    pub fn new() -> (Arc<Self>, UnboundedReceiver<PlaybackEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }

    fn send(&self, event: PlaybackEvent) -> ObserverResult {
        self.tx
            .send(event)
            .map_err(|_| ObserverError("event receiver dropped".to_string()))
    }
}

impl PlaybackObserver for ChannelObserver {
    fn on_state(&self, state: PlayerState) -> ObserverResult {
        self.send(PlaybackEvent::StateChanged { state })
    }

    fn on_progress(&self, progress: f64) -> ObserverResult {
        self.send(PlaybackEvent::ProgressUpdated { progress })
    }

    fn on_track(&self, track: Option<&Track>) -> ObserverResult {
        self.send(PlaybackEvent::TrackChanged {
            track: track.cloned(),
        })
    }

    fn on_error(&self, error: &PlaybackError) -> ObserverResult {
        self.send(PlaybackEvent::Error {
            message: error.to_string(),
        })
    }
}
