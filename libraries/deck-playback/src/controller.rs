//! Playback controller - the façade callers talk to
//!
//! Composes the state machine, engine, progress scheduler and observer hub
//! behind one mutex. Every mutating call and every scheduler tick runs under
//! that lock, so two concurrent `play` calls cannot interleave their engine
//! commands and no observer ever sees a half-applied transition.

use crate::{
    backend::AudioBackend,
    engine::PlaybackEngine,
    error::{PlaybackError, Result},
    hub::{ObserverHub, PlaybackObserver, SubscriptionId},
    scheduler::ProgressScheduler,
    state::{PlayerStateMachine, Transition},
    types::{progress_percent, ControllerConfig, PlaybackSnapshot, PlayerState, Track},
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Single-track playback controller
///
/// Cheap to clone; clones share the same player. Dropping the last clone
/// cancels progress polling and drops the backend, but hosts should still
/// call [`stop`](Self::stop) on teardown to release the loaded resource
/// explicitly.
#[derive(Clone)]
pub struct PlaybackController {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    machine: PlayerStateMachine,
    engine: PlaybackEngine,
    selected: Option<Track>,
    progress: f64,
    scheduler: ProgressScheduler,
    // Bumped whenever polling stops; ticks from older timelines are ignored
    timeline: u64,
    hub: ObserverHub,
}

impl PlaybackController {
    /// Create a controller on the current tokio runtime
    pub fn new(backend: impl AudioBackend + 'static, config: ControllerConfig) -> Result<Self> {
        let runtime =
            Handle::try_current().map_err(|e| PlaybackError::NoRuntime(e.to_string()))?;
        Self::with_runtime(backend, config, runtime)
    }

    /// Create a controller whose progress polling runs on `runtime`
    pub fn with_runtime(
        backend: impl AudioBackend + 'static,
        config: ControllerConfig,
        runtime: Handle,
    ) -> Result<Self> {
        config.validate()?;

        let inner = Inner {
            machine: PlayerStateMachine::new(),
            engine: PlaybackEngine::new(Box::new(backend)),
            selected: None,
            progress: 0.0,
            scheduler: ProgressScheduler::new(config.progress_interval(), runtime),
            timeline: 0,
            hub: ObserverHub::new(),
        };

        Ok(Self {
            inner: Arc::new(Mutex::new(inner)),
        })
    }

    /// Play `track`, or resume/retry the selected track when `None`
    ///
    /// A different track replaces the current one (the previous resource is
    /// released first). The same track while playing is a no-op; while
    /// paused it resumes. Failures move the player to
    /// [`PlayerState::Error`], are published to observers and returned.
    pub fn play(&self, track: Option<Track>) -> Result<()> {
        let handle = Arc::downgrade(&self.inner);
        self.lock().play(track, handle)
    }

    /// Pause playback; no-op unless playing
    pub fn pause(&self) {
        self.lock().pause();
    }

    /// Stop playback, release the backend resource and clear the selection
    ///
    /// From [`PlayerState::Error`] only the backend resource is released.
    pub fn stop(&self) {
        self.lock().stop();
    }

    /// Pause when playing, otherwise play the selected track
    pub fn toggle(&self) -> Result<()> {
        let handle = Arc::downgrade(&self.inner);
        let mut inner = self.lock();

        if inner.machine.state() == PlayerState::Playing {
            inner.pause();
            Ok(())
        } else {
            inner.play(None, handle)
        }
    }

    /// Register `observer` and immediately replay the current snapshot to it
    ///
    /// The controller keeps only a weak reference; the caller owns the
    /// observer and should [`unsubscribe`](Self::unsubscribe) on detach.
    pub fn subscribe<O>(&self, observer: &Arc<O>) -> SubscriptionId
    where
        O: PlaybackObserver + 'static,
    {
        let mut inner = self.lock();
        let id = inner.hub.subscribe(observer);
        let snapshot = inner.snapshot();
        inner.hub.replay(id, &snapshot);
        debug!(subscription = %id, state = %snapshot.state, "Observer attached");
        id
    }

    /// Remove a subscription; returns `false` if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.lock().hub.unsubscribe(id);
        if removed {
            debug!(subscription = %id, "Observer detached");
        }
        removed
    }

    /// Current player state
    pub fn state(&self) -> PlayerState {
        self.lock().machine.state()
    }

    /// Last sampled progress, 0.0 unless playing
    pub fn progress(&self) -> f64 {
        self.lock().progress
    }

    /// Currently selected track
    pub fn selected_track(&self) -> Option<Track> {
        self.lock().selected.clone()
    }

    /// State, selected track and progress, read atomically
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.lock().snapshot()
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        self.lock().hub.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Inner {
    fn play(&mut self, track: Option<Track>, handle: Weak<Mutex<Inner>>) -> Result<()> {
        let state = self.machine.state();
        let same = track.is_some() && track == self.selected;

        match (track, state) {
            (Some(_), PlayerState::Playing) if same => {
                debug!("Track already playing");
                Ok(())
            }
            (Some(_), PlayerState::Paused) if same => self.resume(handle),
            (Some(track), _) => self.start(track, handle),
            (None, PlayerState::Playing) => Ok(()),
            (None, PlayerState::Paused) => self.resume(handle),
            (None, _) => match self.selected.clone() {
                Some(track) => self.start(track, handle),
                None => self.fail(PlaybackError::NoTrackSelected),
            },
        }
    }

    fn start(&mut self, track: Track, handle: Weak<Mutex<Inner>>) -> Result<()> {
        self.halt_progress();
        if let Some(previous) = self.engine.loaded_uri() {
            debug!(previous, next = track.uri(), "Replacing loaded track");
        }

        self.select(Some(track.clone()));
        info!(track = track.name(), uri = track.uri(), "Starting playback");

        if let Err(e) = self
            .engine
            .load(track.uri())
            .and_then(|()| self.engine.play())
        {
            return self.fail(e);
        }

        self.apply(Transition::Started);
        self.poll_progress(handle);
        Ok(())
    }

    fn resume(&mut self, handle: Weak<Mutex<Inner>>) -> Result<()> {
        if let Err(e) = self.engine.play() {
            return self.fail(e);
        }

        info!("Resuming playback");
        self.apply(Transition::Resumed);
        self.poll_progress(handle);
        Ok(())
    }

    fn pause(&mut self) {
        if self.machine.state() != PlayerState::Playing {
            return;
        }

        self.halt_progress();
        self.engine.pause();
        self.apply(Transition::Paused);
    }

    fn stop(&mut self) {
        self.halt_progress();
        self.engine.stop();
        self.apply(Transition::Stopped);

        // Error keeps the failed track so `play(None)` can retry it
        if self.machine.state() == PlayerState::Stopped {
            self.select(None);
        }
    }

    fn fail(&mut self, error: PlaybackError) -> Result<()> {
        warn!(error = %error, "Playback operation failed");
        self.halt_progress();
        self.apply(Transition::Failed);
        self.hub.publish_error(&error);
        Err(error)
    }

    fn apply(&mut self, transition: Transition) {
        if let Some(state) = self.machine.apply(transition) {
            self.hub.publish_state(state);
        }
    }

    fn select(&mut self, track: Option<Track>) {
        if self.selected != track {
            self.selected = track;
            self.hub.publish_track(self.selected.as_ref());
        }
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.machine.state(),
            track: self.selected.clone(),
            progress: self.progress,
        }
    }

    fn halt_progress(&mut self) {
        self.scheduler.stop();
        self.timeline = self.timeline.wrapping_add(1);
        self.progress = 0.0;
    }

    fn poll_progress(&mut self, handle: Weak<Mutex<Inner>>) {
        self.timeline = self.timeline.wrapping_add(1);
        let timeline = self.timeline;

        self.scheduler.start(move || {
            let Some(shared) = handle.upgrade() else {
                return Ok(());
            };
            let mut inner = lock(&shared);
            inner.tick(timeline)
        });
    }

    fn tick(&mut self, timeline: u64) -> Result<()> {
        // A pause, stop or track switch since this timer started
        if timeline != self.timeline || self.machine.state() != PlayerState::Playing {
            return Ok(());
        }

        let position = self.engine.position()?;
        let duration = self.engine.duration()?;
        self.progress = progress_percent(position, duration);
        self.hub.publish_progress(self.progress);
        Ok(())
    }
}
