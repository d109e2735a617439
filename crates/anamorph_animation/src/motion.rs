//! Motion state machine
//!
//! Two states track whether a spring has a frame loop running:
//!
//! - `Idle --Retarget--> Animating`
//! - `Animating --Retarget--> Animating`
//! - `Animating --Settle--> Idle`
//! - `Animating --Halt--> Idle`
//!
//! Events with no matching transition leave the state unchanged.

use std::collections::VecDeque;

/// Whether a frame loop is driving the spring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MotionState {
    #[default]
    Idle,
    Animating,
}

/// Inputs to the motion state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionEvent {
    /// A new target was set
    Retarget,
    /// The spring snapped onto its target
    Settle,
    /// The loop was stopped without settling
    Halt,
}

const HISTORY_LIMIT: usize = 32;

/// A transition record: (from, event, to)
pub type TransitionRecord = (MotionState, MotionEvent, MotionState);

/// Idle/Animating state machine
#[derive(Clone, Debug, Default)]
pub struct MotionMachine {
    state: MotionState,
    /// Most recent transitions (for debugging)
    history: VecDeque<TransitionRecord>,
}

impl MotionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state
    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.state == MotionState::Animating
    }

    fn next(state: MotionState, event: MotionEvent) -> Option<MotionState> {
        use MotionEvent::*;
        use MotionState::*;

        match (state, event) {
            (Idle, Retarget) | (Animating, Retarget) => Some(Animating),
            (Animating, Settle) | (Animating, Halt) => Some(Idle),
            (Idle, Settle) | (Idle, Halt) => None,
        }
    }

    /// Check if an event triggers a transition from the current state
    pub fn can_send(&self, event: MotionEvent) -> bool {
        Self::next(self.state, event).is_some()
    }

    /// Send an event, returning the resulting state
    pub fn send(&mut self, event: MotionEvent) -> MotionState {
        let from = self.state;
        let Some(to) = Self::next(from, event) else {
            return from;
        };

        self.state = to;
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back((from, event, to));
        tracing::trace!(?from, ?event, ?to, "motion transition");

        to
    }

    /// Recent transitions, oldest first
    pub fn history(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.history.iter()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::MotionEvent::*;
    use super::MotionState::*;

    #[test]
    fn test_simple_transitions() {
        let mut fsm = MotionMachine::new();
        assert_eq!(fsm.state(), Idle);

        assert_eq!(fsm.send(Retarget), Animating);
        assert_eq!(fsm.send(Retarget), Animating);
        assert_eq!(fsm.send(Settle), Idle);

        fsm.send(Retarget);
        assert_eq!(fsm.send(Halt), Idle);
    }

    #[test]
    fn test_invalid_event_no_transition() {
        let mut fsm = MotionMachine::new();
        assert!(!fsm.can_send(Settle));
        assert_eq!(fsm.send(Settle), Idle);
        assert_eq!(fsm.send(Halt), Idle);
        assert_eq!(fsm.history().count(), 0);
    }

    #[test]
    fn test_history() {
        let mut fsm = MotionMachine::new();
        fsm.send(Retarget);
        fsm.send(Settle);

        let history: Vec<_> = fsm.history().copied().collect();
        assert_eq!(
            history,
            vec![(Idle, Retarget, Animating), (Animating, Settle, Idle)]
        );

        fsm.clear_history();
        assert_eq!(fsm.history().count(), 0);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut fsm = MotionMachine::new();
        for _ in 0..100 {
            fsm.send(Retarget);
        }
        assert_eq!(fsm.history().count(), HISTORY_LIMIT);
    }
}
