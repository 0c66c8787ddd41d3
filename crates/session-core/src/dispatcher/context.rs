use serde::Serialize;
use tracing::{debug, warn};

use rdispatch_signal_core::{encode, Envelope, RequestEncoder};

use crate::adapters::MediaCommand;
use crate::events::{Event, EventEmitter};
use crate::session::CallSession;
use crate::session_store::SessionStore;
use crate::state_machine::{execute_action, StateMachine};
use crate::state_table::{Action, EventTemplate, StateEvent};
use crate::types::{CallOperation, ErrorInfo, SessionKey};

/// Everything a handler may touch during one dispatch step.
///
/// Handlers mutate the store through the context and queue outbound frames
/// and media commands. Nothing is sent until the engine drains the context.
pub struct DispatchContext<'a> {
    pub store: &'a mut SessionStore,
    pub emitter: &'a EventEmitter,
    pub encoder: &'a RequestEncoder,
    pub machine: &'a StateMachine,
    outbox: Vec<String>,
    media: Vec<MediaCommand>,
}

impl<'a> DispatchContext<'a> {
    pub fn new(
        store: &'a mut SessionStore,
        emitter: &'a EventEmitter,
        encoder: &'a RequestEncoder,
        machine: &'a StateMachine,
    ) -> Self {
        Self {
            store,
            emitter,
            encoder,
            machine,
            outbox: Vec::new(),
            media: Vec::new(),
        }
    }

    pub fn local_user_id(&self) -> &str {
        &self.encoder.identity().user_id
    }

    /// Queue a frame for the transport.
    pub fn queue<T: Serialize>(&mut self, message: &T) {
        match encode(message) {
            Ok(frame) => self.outbox.push(frame),
            Err(e) => warn!("dropping outbound frame: {}", e),
        }
    }

    pub fn queue_envelope(&mut self, envelope: Envelope) {
        self.queue(&envelope);
    }

    pub fn queue_media(&mut self, command: MediaCommand) {
        self.media.push(command);
    }

    pub fn outbox(&self) -> &[String] {
        &self.outbox
    }

    pub fn media_commands(&self) -> &[MediaCommand] {
        &self.media
    }

    /// Frames and media commands produced by this step.
    pub fn into_effects(self) -> (Vec<String>, Vec<MediaCommand>) {
        (self.outbox, self.media)
    }

    pub fn emit(&self, event: Event) {
        self.emitter.emit(event);
    }

    pub fn session(&self, key: &SessionKey) -> Option<CallSession> {
        self.store.get(key)
    }

    pub fn emit_state_changed(&self, key: &SessionKey) {
        if let Some(session) = self.store.get(key) {
            self.emit(Event::StateChanged(session));
        }
    }

    /// Emit the session's pending member diff, if it has one.
    pub fn emit_roster(&self, key: &SessionKey, operation: CallOperation) {
        let Some(diff) = self.store.with_session(key, |s| s.pending_member_diff()) else {
            return;
        };
        if diff.is_empty() {
            debug!(session_key = %key, ?operation, "empty roster diff");
            return;
        }
        self.emit(Event::RosterUpdated { session_key: key.clone(), diff, operation });
    }

    pub fn emit_operation(&self, key: &SessionKey, operation: CallOperation, result: Option<ErrorInfo>) {
        self.emit(Event::CallOperation { session_key: key.clone(), operation, result });
    }

    /// Feed a state event to the session under `key` and carry out the row.
    ///
    /// Actions run first (so a migrated key is visible in the events), then
    /// the row's events are published, then the session is deleted if the
    /// row asks for it. Returns the session's key afterwards, or `None` if
    /// it is gone or never existed.
    pub fn drive(&mut self, key: &SessionKey, event: StateEvent, error: Option<ErrorInfo>) -> Option<SessionKey> {
        let machine = self.machine;
        let result = self.store.with_session_mut(key, |session| machine.process_event(session, event, error))?;
        if !result.fired() {
            return Some(key.clone());
        }

        let mut current = key.clone();
        for action in result.actions() {
            if *action != Action::DeleteSession {
                execute_action(action, self, &mut current);
            }
        }

        for template in result.publish_events() {
            let Some(snapshot) = self.store.get(&current) else { break };
            match template {
                EventTemplate::StateChanged => self.emit(Event::StateChanged(snapshot)),
                EventTemplate::CallArrived => self.emit(Event::CallArrived(snapshot)),
                EventTemplate::RoomIdAssigned => self.emit(Event::RoomIdAssigned(snapshot)),
            }
        }

        if result.actions().contains(&Action::DeleteSession) {
            self.store.delete(&current);
            return None;
        }
        Some(current)
    }
}
