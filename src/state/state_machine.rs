use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Phases a room cycles through within one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomPhase {
    /// Members are casting hidden votes.
    Voting,
    /// Votes and statistics are visible.
    Revealed,
    /// The lowest and highest voters are highlighted against each other.
    Versus,
}

/// Events the host can apply to a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEvent {
    /// Show the votes of the current round.
    Reveal,
    /// Compare the extreme voters once votes are visible.
    TriggerVersus,
    /// Close the current round and start voting on the next one.
    NextRound,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the room was in when the invalid event was received.
    pub from: RoomPhase,
    /// The event that cannot be applied from this phase.
    pub event: RoomEvent,
}

/// Outcome of a successfully applied event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Phase before the event.
    pub from: RoomPhase,
    /// Phase after the event.
    pub to: RoomPhase,
    /// Round counter after the event.
    pub round: u32,
    /// Whether the topic must be cleared as part of this transition.
    pub clears_topic: bool,
}

/// Phase and round counter of a single room.
///
/// Every path back to [`RoomPhase::Voting`] goes through [`RoomEvent::NextRound`],
/// which is also the only event that touches the round counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomStateMachine {
    phase: RoomPhase,
    round: u32,
}

impl Default for RoomStateMachine {
    fn default() -> Self {
        Self {
            phase: RoomPhase::Voting,
            round: 1,
        }
    }
}

impl RoomStateMachine {
    /// Create a state machine for a freshly created room: voting, round 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the state machine from persisted room fields.
    pub fn from_parts(phase: RoomPhase, round: u32) -> Self {
        Self { phase, round }
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    /// Inspect the current round.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Validate and apply `event`, returning the resulting transition.
    pub fn apply(&mut self, event: RoomEvent) -> Result<Transition, InvalidTransition> {
        let from = self.phase;
        let (to, round) = self.compute_transition(event)?;

        self.phase = to;
        self.round = round;

        Ok(Transition {
            from,
            to,
            round,
            clears_topic: matches!(event, RoomEvent::NextRound),
        })
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: RoomEvent) -> Result<(RoomPhase, u32), InvalidTransition> {
        let next = match (self.phase, event) {
            (RoomPhase::Voting, RoomEvent::Reveal) => (RoomPhase::Revealed, self.round),
            (RoomPhase::Revealed, RoomEvent::TriggerVersus) => (RoomPhase::Versus, self.round),
            (_, RoomEvent::NextRound) => (RoomPhase::Voting, self.round.saturating_add(1)),
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}
