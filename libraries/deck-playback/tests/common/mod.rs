//! Shared test infrastructure: a scripted backend and a recording observer

#![allow(dead_code)]

use deck_playback::{
    AudioBackend, BackendError, ObserverResult, PlaybackError, PlaybackObserver, PlayerState,
    Track,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Backend command, in the order the backend received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Load(String),
    Play,
    Pause,
    Stop,
}

#[derive(Default)]
struct ControlState {
    calls: Vec<Call>,
    loaded: Option<String>,
    failing_loads: HashSet<String>,
    failing_plays: HashSet<String>,
    positions: HashMap<String, VecDeque<Duration>>,
    durations: HashMap<String, Duration>,
    sampling_failures: usize,
}

/// Script and inspect a [`ScriptedBackend`] after handing it to a controller
#[derive(Clone, Default)]
pub struct BackendControl {
    state: Arc<Mutex<ControlState>>,
}

impl BackendControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(&self) -> ScriptedBackend {
        ScriptedBackend {
            state: Arc::clone(&self.state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap()
    }

    pub fn fail_load(&self, uri: &str) {
        self.lock().failing_loads.insert(uri.to_string());
    }

    pub fn fail_play(&self, uri: &str) {
        self.lock().failing_plays.insert(uri.to_string());
    }

    pub fn heal(&self, uri: &str) {
        let mut state = self.lock();
        state.failing_loads.remove(uri);
        state.failing_plays.remove(uri);
    }

    /// Positions returned by successive samples; the last one repeats
    pub fn script_positions(&self, uri: &str, millis: &[u64]) {
        let positions = millis.iter().copied().map(Duration::from_millis).collect();
        self.lock().positions.insert(uri.to_string(), positions);
    }

    pub fn set_duration(&self, uri: &str, duration: Duration) {
        self.lock().durations.insert(uri.to_string(), duration);
    }

    /// Make the next `count` position samples fail
    pub fn fail_samples(&self, count: usize) {
        self.lock().sampling_failures = count;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn loaded(&self) -> Option<String> {
        self.lock().loaded.clone()
    }
}

/// Backend driven by a [`BackendControl`]
pub struct ScriptedBackend {
    state: Arc<Mutex<ControlState>>,
}

impl ScriptedBackend {
    fn lock(&self) -> MutexGuard<'_, ControlState> {
        self.state.lock().unwrap()
    }
}

impl AudioBackend for ScriptedBackend {
    fn load(&mut self, uri: &str) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.calls.push(Call::Load(uri.to_string()));

        if state.failing_loads.contains(uri) {
            return Err(BackendError::NotFound(uri.to_string()));
        }
        state.loaded = Some(uri.to_string());
        Ok(())
    }

    fn play(&mut self) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.calls.push(Call::Play);

        match &state.loaded {
            None => Err(BackendError::NothingLoaded),
            Some(uri) if state.failing_plays.contains(uri) => {
                Err(BackendError::Other("output device unavailable".to_string()))
            }
            Some(_) => Ok(()),
        }
    }

    fn pause(&mut self) {
        self.lock().calls.push(Call::Pause);
    }

    fn stop(&mut self) {
        let mut state = self.lock();
        state.calls.push(Call::Stop);
        state.loaded = None;
    }

    fn position(&self) -> Result<Duration, BackendError> {
        let mut state = self.lock();

        if state.sampling_failures > 0 {
            state.sampling_failures -= 1;
            return Err(BackendError::Other("position unavailable".to_string()));
        }

        let Some(uri) = state.loaded.clone() else {
            return Err(BackendError::NothingLoaded);
        };
        let Some(script) = state.positions.get_mut(&uri) else {
            return Ok(Duration::ZERO);
        };

        let position = script.front().copied().unwrap_or(Duration::ZERO);
        if script.len() > 1 {
            script.pop_front();
        }
        Ok(position)
    }

    fn duration(&self) -> Result<Duration, BackendError> {
        let state = self.lock();
        let Some(uri) = &state.loaded else {
            return Err(BackendError::NothingLoaded);
        };
        Ok(state.durations.get(uri).copied().unwrap_or(Duration::ZERO))
    }
}

/// Notification as seen by an observer
#[derive(Debug, Clone, PartialEq)]
pub enum Seen {
    State(PlayerState),
    Progress(f64),
    Track(Option<String>),
    Error(String),
}

/// Observer that records every notification with the tokio time it arrived
#[derive(Default)]
pub struct RecordingObserver {
    seen: Mutex<Vec<(tokio::time::Instant, Seen)>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, seen: Seen) -> ObserverResult {
        self.seen
            .lock()
            .unwrap()
            .push((tokio::time::Instant::now(), seen));
        Ok(())
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().iter().map(|(_, s)| s.clone()).collect()
    }

    pub fn timed(&self) -> Vec<(tokio::time::Instant, Seen)> {
        self.seen.lock().unwrap().clone()
    }

    pub fn states(&self) -> Vec<PlayerState> {
        self.seen()
            .into_iter()
            .filter_map(|s| match s {
                Seen::State(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn progress(&self) -> Vec<f64> {
        self.seen()
            .into_iter()
            .filter_map(|s| match s {
                Seen::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.seen()
            .into_iter()
            .filter_map(|s| match s {
                Seen::Error(e) => Some(e),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.seen.lock().unwrap().clear();
    }
}

impl PlaybackObserver for RecordingObserver {
    fn on_state(&self, state: PlayerState) -> ObserverResult {
        self.push(Seen::State(state))
    }

    fn on_progress(&self, progress: f64) -> ObserverResult {
        self.push(Seen::Progress(progress))
    }

    fn on_track(&self, track: Option<&Track>) -> ObserverResult {
        self.push(Seen::Track(track.map(|t| t.uri().to_string())))
    }

    fn on_error(&self, error: &PlaybackError) -> ObserverResult {
        self.push(Seen::Error(error.to_string()))
    }
}

pub fn track(name: &str) -> Track {
    Track::new(name, format!("file:///music/{}.flac", name.to_lowercase()))
}

pub fn uri(name: &str) -> String {
    format!("file:///music/{}.flac", name.to_lowercase())
}
