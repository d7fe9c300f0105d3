//! Player state machine
//!
//! Holds the current [`PlayerState`] and applies transitions. Illegal
//! transitions leave the state unchanged; callers learn whether anything
//! changed from the return value of [`PlayerStateMachine::apply`].

use crate::types::PlayerState;
use tracing::debug;

/// Events that drive the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// A track was loaded and playback started
    Started,

    /// Playback of the loaded track resumed
    Resumed,

    /// Playback paused
    Paused,

    /// Playback stopped and the resource released
    Stopped,

    /// Load or play failed in the backend
    Failed,
}

impl Transition {
    /// All transitions, in declaration order
    pub const ALL: [Transition; 5] = [
        Transition::Started,
        Transition::Resumed,
        Transition::Paused,
        Transition::Stopped,
        Transition::Failed,
    ];
}

/// Resulting state of applying `transition` in state `from`
///
/// Returns `from` unchanged for no-op combinations.
pub fn next_state(from: PlayerState, transition: Transition) -> PlayerState {
    use PlayerState::{Error, Paused, Playing, Stopped};

    match (from, transition) {
        (_, Transition::Started) => Playing,
        (Paused, Transition::Resumed) => Playing,
        (Playing, Transition::Paused) => Paused,
        (Playing | Paused, Transition::Stopped) => Stopped,
        (_, Transition::Failed) => Error,
        (state, _) => state,
    }
}

/// Current lifecycle state and its transition function
#[derive(Debug, Default)]
pub struct PlayerStateMachine {
    state: PlayerState,
}

impl PlayerStateMachine {
    /// Create a state machine in [`PlayerState::Stopped`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Apply `transition`
    ///
    /// Returns the new state if it differs from the previous one, `None`
    /// when the transition was a no-op.
    pub fn apply(&mut self, transition: Transition) -> Option<PlayerState> {
        let next = next_state(self.state, transition);
        if next == self.state {
            return None;
        }

        debug!(from = %self.state, to = %next, ?transition, "State transition");
        self.state = next;
        Some(next)
    }
}
