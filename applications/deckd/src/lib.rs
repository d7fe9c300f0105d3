//! Deck daemon
//!
//! Hosts a single [`PlaybackController`](deck_playback::PlaybackController)
//! for the lifetime of the process, lists a local music library and drives
//! playback from a console front end. Audio is not rendered; the headless
//! backend probes files for their duration and advances position in real
//! time.

pub mod backend;
pub mod config;
pub mod console;
pub mod error;
pub mod library;
pub mod service;

pub use backend::HeadlessBackend;
pub use config::{DaemonConfig, Overrides};
pub use console::{read_lines, Command, Console, ConsoleObserver, Flow};
pub use error::{DaemonError, Result};
pub use library::MediaLibrary;
pub use service::PlaybackService;
