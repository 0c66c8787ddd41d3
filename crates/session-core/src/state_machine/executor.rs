use std::sync::Arc;

use tracing::{debug, info};

use crate::session::CallSession;
use crate::state_table::{Action, EventTemplate, MasterStateTable, StateEvent, StateKey, Topology, Transition, MASTER_TABLE};
use crate::types::{CallState, ErrorInfo};

use super::guards::check_guards;

/// Result of feeding one event to a session
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessEventResult {
    pub old_state: CallState,
    pub next_state: CallState,
    /// The row that fired, if any
    pub transition: Option<Transition>,
}

impl ProcessEventResult {
    fn unchanged(state: CallState) -> Self {
        Self { old_state: state, next_state: state, transition: None }
    }

    pub fn fired(&self) -> bool {
        self.transition.is_some()
    }

    pub fn actions(&self) -> &[Action] {
        self.transition.as_ref().map(|t| t.actions.as_slice()).unwrap_or(&[])
    }

    pub fn publish_events(&self) -> &[EventTemplate] {
        self.transition.as_ref().map(|t| t.publish_events.as_slice()).unwrap_or(&[])
    }
}

/// Runs sessions through the state table.
///
/// The executor only touches the session it is given: state and
/// `last_error`. Everything else a transition asks for is returned as
/// actions for the dispatcher to carry out.
#[derive(Debug, Clone)]
pub struct StateMachine {
    table: Arc<MasterStateTable>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new(MASTER_TABLE.clone())
    }
}

impl StateMachine {
    pub fn new(table: Arc<MasterStateTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &MasterStateTable {
        &self.table
    }

    /// Feed `event` to `session`.
    ///
    /// `error` overrides the result code a terminal row records. Sessions in
    /// a terminal state, events without a row, failed guards and
    /// self-transitions all leave the session untouched.
    pub fn process_event(
        &self,
        session: &mut CallSession,
        event: StateEvent,
        error: Option<ErrorInfo>,
    ) -> ProcessEventResult {
        let old_state = session.state;
        if old_state.is_terminal() {
            debug!(session_key = %session.session_key, ?event, state = %old_state, "session already terminated");
            return ProcessEventResult::unchanged(old_state);
        }

        let key = StateKey::new(Topology::of(session.call_type), old_state, event);
        let Some(transition) = self.table.get(&key) else {
            debug!(session_key = %session.session_key, ?key, "no transition");
            return ProcessEventResult::unchanged(old_state);
        };

        if !check_guards(&transition.guards, session) {
            debug!(session_key = %session.session_key, ?key, "guards not satisfied");
            return ProcessEventResult::unchanged(old_state);
        }

        if transition.next_state == Some(old_state) {
            return ProcessEventResult::unchanged(old_state);
        }

        for action in &transition.actions {
            if let Action::RecordResult(code) = action {
                session.last_error = Some(error.clone().unwrap_or_else(|| (*code).into()));
            }
        }

        let next_state = transition.next_state.unwrap_or(old_state);
        if next_state != old_state {
            info!(
                session_key = %session.session_key,
                call_type = %session.call_type,
                "{} -> {} on {:?}",
                old_state, next_state, event
            );
            session.state = next_state;
        }

        ProcessEventResult {
            old_state,
            next_state,
            transition: Some(transition.clone()),
        }
    }
}
