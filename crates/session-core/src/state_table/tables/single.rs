use crate::state_table::{Action, CallState, EventTemplate, StateTableBuilder, StateEvent, Topology, Transition};
use crate::types::ResultCode;

/// Add transitions for two-party calls (plain and supervisory)
pub fn add_two_party_transitions(builder: &mut StateTableBuilder) {
    for topology in [Topology::Single, Topology::Supervisory] {
        builder.add_wildcard(
            topology,
            StateEvent::PeerRejected,
            Transition {
                guards: vec![],
                actions: vec![
                    Action::RecordResult(ResultCode::PeerRejected),
                    Action::LeaveMedia,
                    Action::DeleteSession,
                ],
                next_state: Some(CallState::Rejected),
                publish_events: vec![EventTemplate::StateChanged],
            },
        );

        builder.add_wildcard(
            topology,
            StateEvent::PeerLeft,
            Transition {
                guards: vec![],
                actions: vec![
                    Action::RecordResult(ResultCode::PeerTerminated),
                    Action::SendLeaveEcho,
                    Action::LeaveMedia,
                    Action::DeleteSession,
                ],
                next_state: Some(CallState::Bye),
                publish_events: vec![EventTemplate::StateChanged],
            },
        );

        builder.add_wildcard(
            topology,
            StateEvent::SubscribeFailed,
            Transition {
                guards: vec![],
                actions: vec![
                    Action::RecordResult(ResultCode::SubscribeFailed),
                    Action::LeaveMedia,
                    Action::DeleteSession,
                ],
                next_state: Some(CallState::Failed),
                publish_events: vec![EventTemplate::StateChanged],
            },
        );
    }
}
