use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::{CallState, CallType, ResultCode};

/// Shape of a session as far as the call state machine is concerned
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topology {
    /// Voice and video calls between two parties
    Single,
    /// Force insert and force monitor
    Supervisory,
    /// Conferences, PTT groups and broadcast
    Group,
    /// The video monitoring room
    Monitor,
}

impl Topology {
    pub fn of(call_type: CallType) -> Topology {
        match call_type {
            CallType::Voice | CallType::Video => Topology::Single,
            CallType::ForceInsert | CallType::ForceMonitor => Topology::Supervisory,
            CallType::VideoMonitor => Topology::Monitor,
            CallType::VoiceConference
            | CallType::VideoConference
            | CallType::Ptt
            | CallType::TempPtt
            | CallType::Broadcast => Topology::Group,
        }
    }

    /// Topologies with a single remote party
    pub fn is_two_party(&self) -> bool {
        matches!(self, Topology::Single | Topology::Supervisory)
    }
}

/// Key for looking up transitions in the state table
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct StateKey {
    pub topology: Topology,
    pub state: CallState,
    pub event: StateEvent,
}

impl StateKey {
    pub fn new(topology: Topology, state: CallState, event: StateEvent) -> Self {
        Self { topology, state, event }
    }
}

/// Events that drive call state transitions
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum StateEvent {
    /// Local create request sent
    CreateSucceeded,
    /// Call offered by the server (`newpeer` on the receiving side)
    CallOffered,
    CreateFailed,
    /// Outgoing call acknowledged with a room id
    RoomAssigned,
    /// Remote media subscribed or room joined
    MediaSubscribed,
    /// Successful `answer` (PTT and broadcast)
    AnswerConfirmed,
    PeerAccepted,
    /// Monitoring room got a stream that is not yet receiving
    StreamAssigned,
    PeerRejected,
    PeerLeft,
    PeerDestroyed,
    NegotiationFailed,
    SubscribeFailed,
}

/// Conditions that must hold for a transition to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Guard {
    HasRoomId,
    IsOutgoing,
    IsIncoming,
}

/// Side effects of a transition, run by the dispatcher in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Store `ErrorInfo` on the session, preferring the one supplied with the event
    RecordResult(ResultCode),
    /// Re-file the session under the key derived from its current shape
    MigrateKey,
    /// Join the room (or group audio for PTT and broadcast)
    RequestMedia,
    QueueJoinFinish,
    QueueMemberQuery,
    /// Send `free` when the local user holds the floor
    ReleaseFloor,
    /// Reply to the peer's `leave` with our own
    SendLeaveEcho,
    LeaveMedia,
    /// Always runs after events are published
    DeleteSession,
}

/// Events published after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTemplate {
    StateChanged,
    CallArrived,
    RoomIdAssigned,
}

/// One row of the state table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Conditions that must be true for this transition
    pub guards: Vec<Guard>,
    /// Actions to execute
    pub actions: Vec<Action>,
    /// Next state (if changing)
    pub next_state: Option<CallState>,
    /// Events to publish after transition
    pub publish_events: Vec<EventTemplate>,
}

impl Transition {
    pub fn to_state(state: CallState) -> Self {
        Self {
            guards: vec![],
            actions: vec![],
            next_state: Some(state),
            publish_events: vec![EventTemplate::StateChanged],
        }
    }
}

/// States that must always have exit transitions if used
const STATES_REQUIRING_EXITS: &[CallState] = &[
    CallState::Idle,
    CallState::Ring,
    CallState::WaitRingBack,
    CallState::LineHold,
];

/// Master state table containing all transitions
#[derive(Debug, Default)]
pub struct MasterStateTable {
    transitions: HashMap<StateKey, Transition>,
    /// Transitions that apply in any non-terminal state
    wildcard_transitions: HashMap<(Topology, StateEvent), Transition>,
}

impl MasterStateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: StateKey, transition: Transition) {
        self.transitions.insert(key, transition);
    }

    pub fn insert_wildcard(&mut self, topology: Topology, event: StateEvent, transition: Transition) {
        self.wildcard_transitions.insert((topology, event), transition);
    }

    /// Exact match first, then the topology's wildcard row.
    pub fn get(&self, key: &StateKey) -> Option<&Transition> {
        self.transitions
            .get(key)
            .or_else(|| self.wildcard_transitions.get(&(key.topology, key.event)))
    }

    pub fn has_transition(&self, key: &StateKey) -> bool {
        self.get(key).is_some()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len() + self.wildcard_transitions.len()
    }

    /// Collect all states referenced in this state table
    pub fn collect_used_states(&self) -> HashSet<CallState> {
        let mut states = HashSet::new();
        for (key, transition) in &self.transitions {
            states.insert(key.state);
            if let Some(next) = transition.next_state {
                states.insert(next);
            }
        }
        for transition in self.wildcard_transitions.values() {
            if let Some(next) = transition.next_state {
                states.insert(next);
            }
        }
        states
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for state in self.collect_used_states() {
            if state.is_terminal() || !STATES_REQUIRING_EXITS.contains(&state) {
                continue;
            }
            let has_exit = self.transitions.keys().any(|k| k.state == state)
                || !self.wildcard_transitions.is_empty();
            if !has_exit {
                errors.push(format!("State {:?} has no exit transitions", state));
            }
        }

        for (key, transition) in self.transitions.iter() {
            if transition.next_state.is_some_and(|s| s.is_terminal())
                && !transition.actions.contains(&Action::DeleteSession)
            {
                errors.push(format!("Terminal transition {:?} does not delete the session", key));
            }
        }
        for ((topology, event), transition) in self.wildcard_transitions.iter() {
            if transition.next_state.is_some_and(|s| s.is_terminal())
                && !transition.actions.contains(&Action::DeleteSession)
            {
                errors.push(format!(
                    "Terminal wildcard transition ({:?}, {:?}) does not delete the session",
                    topology, event
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
