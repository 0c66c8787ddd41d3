use crate::state_table::{CallState, StateTableBuilder, StateEvent, Topology};

/// Add transitions for the video monitoring room
pub fn add_monitor_transitions(builder: &mut StateTableBuilder) {
    builder.add_state_change(Topology::Monitor, CallState::Ring, StateEvent::StreamAssigned, CallState::LineHold);
    builder.add_state_change(Topology::Monitor, CallState::Ring, StateEvent::MediaSubscribed, CallState::Talking);
    builder.add_state_change(Topology::Monitor, CallState::LineHold, StateEvent::MediaSubscribed, CallState::Talking);
}
