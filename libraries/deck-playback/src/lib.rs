//! Deck - Playback Control
//!
//! Single-track playback controller with periodic progress reporting and
//! observer synchronization.
//!
//! This crate provides:
//! - A four-state player lifecycle (Stopped, Playing, Paused, Error)
//! - A thin engine over a pluggable audio backend
//! - Progress polling on a cancellable tokio timer (500ms by default)
//! - Weakly held observers, with the current snapshot replayed on subscribe
//!
//! # Architecture
//!
//! `deck-playback` does no decoding or output of its own. Platform code
//! implements [`AudioBackend`]; UI code implements [`PlaybackObserver`] or
//! consumes [`PlaybackEvent`]s from a [`ChannelObserver`].
//!
//! Every controller operation and every progress tick runs under one lock,
//! so observers see transitions in the order they happened and never see a
//! progress sample from a track that has already been replaced.
//!
//! # Example
//!
//! ```rust,no_run
//! use deck_playback::{
//!     AudioBackend, BackendError, ChannelObserver, ControllerConfig, PlaybackController, Track,
//! };
//! use std::time::Duration;
//!
//! struct SilentBackend;
//!
//! impl AudioBackend for SilentBackend {
//!     fn load(&mut self, _uri: &str) -> Result<(), BackendError> {
//!         Ok(())
//!     }
//!
//!     fn play(&mut self) -> Result<(), BackendError> {
//!         Ok(())
//!     }
//!
//!     fn pause(&mut self) {}
//!
//!     fn stop(&mut self) {}
//!
//!     fn position(&self) -> Result<Duration, BackendError> {
//!         Ok(Duration::ZERO)
//!     }
//!
//!     fn duration(&self) -> Result<Duration, BackendError> {
//!         Ok(Duration::from_secs(180))
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> deck_playback::Result<()> {
//! let controller = PlaybackController::new(SilentBackend, ControllerConfig::default())?;
//!
//! let (observer, mut events) = ChannelObserver::new();
//! let subscription = controller.subscribe(&observer);
//!
//! controller.play(Some(Track::new("Song", "/music/song.flac")))?;
//! controller.pause();
//!
//! while let Ok(event) = events.try_recv() {
//!     println!("{event:?}");
//! }
//!
//! controller.unsubscribe(subscription);
//! controller.stop();
//! # Ok(())
//! # }
//! ```

mod backend;
mod controller;
mod engine;
mod error;
mod events;
mod hub;
mod scheduler;
mod state;
pub mod types;

// Public exports
pub use backend::AudioBackend;
pub use controller::PlaybackController;
pub use engine::PlaybackEngine;
pub use error::{BackendError, ObserverError, ObserverResult, PlaybackError, Result};
pub use events::{ChannelObserver, PlaybackEvent};
pub use hub::{ObserverHub, PlaybackObserver, SubscriptionId};
pub use scheduler::ProgressScheduler;
pub use state::{next_state, PlayerStateMachine, Transition};
pub use types::{progress_percent, ControllerConfig, PlaybackSnapshot, PlayerState, Track};
