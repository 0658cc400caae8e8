//! State transitions - FSM transition logic
//!
//! Implements the state machine that handles event-driven state transitions.

use thiserror::Error;

use super::events::ExchangeEvent;
use super::states::ExchangeState;

/// Error type for invalid state transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} with event {event}")]
    InvalidTransition { from: ExchangeState, event: String },

    #[error("State machine is in terminal state: {0:?}")]
    TerminalState(ExchangeState),
}

/// Represents a state transition result.
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// The state before the transition.
    pub from: ExchangeState,
    /// The state after the transition.
    pub to: ExchangeState,
    /// The event that triggered the transition.
    pub event: ExchangeEvent,
}

/// State machine for a single exchange.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    current_state: ExchangeState,
    history: Vec<StateTransition>,
}

impl StateMachine {
    /// Create a new state machine in Idle state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ExchangeState {
        &self.current_state
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Handle an event and move to the next state.
    ///
    /// Terminal states reject every event; an event that does not apply to
    /// the current state is rejected without changing it.
    pub fn handle_event(
        &mut self,
        event: ExchangeEvent,
    ) -> Result<StateTransition, TransitionError> {
        if self.current_state.is_terminal() {
            return Err(TransitionError::TerminalState(self.current_state.clone()));
        }

        let next = Self::compute_next_state(&self.current_state, &event).ok_or_else(|| {
            TransitionError::InvalidTransition {
                from: self.current_state.clone(),
                event: event.name().to_string(),
            }
        })?;

        let transition = StateTransition {
            from: std::mem::replace(&mut self.current_state, next.clone()),
            to: next,
            event,
        };
        self.history.push(transition.clone());

        Ok(transition)
    }

    fn compute_next_state(state: &ExchangeState, event: &ExchangeEvent) -> Option<ExchangeState> {
        use ExchangeEvent::*;
        use ExchangeState::*;

        match (state, event) {
            (Idle, RequestSent) => Some(AwaitingResponse),
            (AwaitingResponse, ReplyReceived) => Some(Delivered),
            (AwaitingResponse, RequestFailed { error }) => Some(Failed {
                error_message: error.clone(),
                failed_at: chrono::Utc::now().to_rfc3339(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivered_flow() {
        let mut sm = StateMachine::new();
        assert_eq!(sm.state(), &ExchangeState::Idle);

        let t1 = sm.handle_event(ExchangeEvent::RequestSent).unwrap();
        assert_eq!(t1.from, ExchangeState::Idle);
        assert_eq!(t1.to, ExchangeState::AwaitingResponse);

        sm.handle_event(ExchangeEvent::ReplyReceived).unwrap();
        assert_eq!(sm.state(), &ExchangeState::Delivered);
        assert_eq!(sm.history().len(), 2);
    }

    #[test]
    fn test_failed_flow_keeps_message() {
        let mut sm = StateMachine::new();
        sm.handle_event(ExchangeEvent::RequestSent).unwrap();
        sm.handle_event(ExchangeEvent::RequestFailed {
            error: "Rate limit reached. Try again later.".to_string(),
        })
        .unwrap();

        match sm.state() {
            ExchangeState::Failed { error_message, .. } => {
                assert_eq!(error_message, "Rate limit reached. Try again later.");
            }
            other => panic!("expected failed state, got {other:?}"),
        }
    }

    #[test]
    fn test_terminal_states_reject_events() {
        let mut sm = StateMachine::new();
        sm.handle_event(ExchangeEvent::RequestSent).unwrap();
        sm.handle_event(ExchangeEvent::ReplyReceived).unwrap();

        let err = sm.handle_event(ExchangeEvent::RequestSent).unwrap_err();
        assert_eq!(err, TransitionError::TerminalState(ExchangeState::Delivered));
    }

    #[test]
    fn test_invalid_transition_leaves_state() {
        let mut sm = StateMachine::new();
        let err = sm.handle_event(ExchangeEvent::ReplyReceived).unwrap_err();

        assert!(matches!(err, TransitionError::InvalidTransition { .. }));
        assert_eq!(sm.state(), &ExchangeState::Idle);
        assert!(sm.history().is_empty());
    }
}
