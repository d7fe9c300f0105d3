//! Observer hub
//!
//! Registry of playback observers. The hub keeps only weak references: it
//! never decides how long an observer lives, and observers that have been
//! dropped are pruned on the next publish.

use crate::{
    error::{ObserverResult, PlaybackError},
    types::{PlaybackSnapshot, PlayerState, Track},
};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use tracing::{error, warn};

/// Receiver of playback notifications
///
/// Callbacks run synchronously on the thread that changed the state, while
/// the controller is locked. They must return quickly and must not call back
/// into the controller; consumers that need either should subscribe through
/// [`ChannelObserver`](crate::ChannelObserver) instead.
pub trait PlaybackObserver: Send + Sync {
    /// Player state changed
    fn on_state(&self, state: PlayerState) -> ObserverResult;

    /// Progress sampled, percent complete
    fn on_progress(&self, progress: f64) -> ObserverResult;

    /// Selected track changed
    fn on_track(&self, _track: Option<&Track>) -> ObserverResult {
        Ok(())
    }

    /// A playback operation failed
    fn on_error(&self, _error: &PlaybackError) -> ObserverResult {
        Ok(())
    }
}

/// Handle returned by [`ObserverHub::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Subscriber {
    id: SubscriptionId,
    observer: Weak<dyn PlaybackObserver>,
}

/// Ordered set of weakly held observers
#[derive(Default)]
pub struct ObserverHub {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl ObserverHub {
    /// Create an empty hub
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer` after all existing subscribers
    ///
    /// The hub does not replay any state to the new subscriber.
    pub fn subscribe<O>(&mut self, observer: &Arc<O>) -> SubscriptionId
    where
        O: PlaybackObserver + 'static,
    {
        let weak = Arc::downgrade(observer);
        let weak: Weak<dyn PlaybackObserver> = weak;
        self.register(weak)
    }

    /// Remove a subscription; returns `false` if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|sub| sub.id != id);
        self.subscribers.len() != before
    }

    /// Number of live subscribers
    pub fn len(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|sub| sub.observer.strong_count() > 0)
            .count()
    }

    /// Whether no live subscriber is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a state change to every subscriber
    pub fn publish_state(&mut self, state: PlayerState) {
        self.dispatch("state", |observer| observer.on_state(state));
    }

    /// Deliver a progress sample to every subscriber
    pub fn publish_progress(&mut self, progress: f64) {
        self.dispatch("progress", |observer| observer.on_progress(progress));
    }

    /// Deliver a selected-track change to every subscriber
    pub fn publish_track(&mut self, track: Option<&Track>) {
        self.dispatch("track", |observer| observer.on_track(track));
    }

    /// Deliver a failed operation to every subscriber
    pub fn publish_error(&mut self, error: &PlaybackError) {
        self.dispatch("error", |observer| observer.on_error(error));
    }

    /// Deliver `snapshot` to a single subscriber
    ///
    /// Sends state, then track, then progress. Returns `false` if the
    /// subscription is unknown or its observer is gone.
    pub fn replay(&self, id: SubscriptionId, snapshot: &PlaybackSnapshot) -> bool {
        let Some(observer) = self
            .subscribers
            .iter()
            .find(|sub| sub.id == id)
            .and_then(|sub| sub.observer.upgrade())
        else {
            return false;
        };

        deliver(id, "state", || observer.on_state(snapshot.state));
        deliver(id, "track", || observer.on_track(snapshot.track.as_ref()));
        deliver(id, "progress", || observer.on_progress(snapshot.progress));
        true
    }

    fn register(&mut self, observer: Weak<dyn PlaybackObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber { id, observer });
        id
    }

    fn dispatch<F>(&mut self, kind: &'static str, mut notify: F)
    where
        F: FnMut(&dyn PlaybackObserver) -> ObserverResult,
    {
        self.subscribers
            .retain(|sub| sub.observer.strong_count() > 0);

        for sub in &self.subscribers {
            if let Some(observer) = sub.observer.upgrade() {
                deliver(sub.id, kind, || notify(observer.as_ref()));
            }
        }
    }
}

/// Run one observer callback, isolating errors and panics
fn deliver<F>(id: SubscriptionId, kind: &'static str, notify: F)
where
    F: FnOnce() -> ObserverResult,
{
    match panic::catch_unwind(AssertUnwindSafe(notify)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(subscription = %id, notification = kind, error = %e, "Observer failed"),
        Err(_) => error!(subscription = %id, notification = kind, "Observer panicked"),
    }
}
