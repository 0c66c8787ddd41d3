use crate::state_table::{
    Action, CallState, EventTemplate, Guard, StateEvent, StateTableBuilder, Topology, Transition,
};
use crate::types::ResultCode;

/// Topologies whose calls are set up with `create`/`newpeer`
const SIGNALED: [Topology; 3] = [Topology::Single, Topology::Supervisory, Topology::Group];

/// Add transitions shared by every topology
pub fn add_common_transitions(builder: &mut StateTableBuilder) {
    for topology in [Topology::Single, Topology::Supervisory, Topology::Group, Topology::Monitor] {
        builder.add_state_change(topology, CallState::Idle, StateEvent::CreateSucceeded, CallState::Ring);

        // Any state -> Failed: server refused the create
        builder.add_wildcard(
            topology,
            StateEvent::CreateFailed,
            Transition {
                guards: vec![],
                actions: vec![
                    Action::RecordResult(ResultCode::CreateFailed),
                    Action::LeaveMedia,
                    Action::DeleteSession,
                ],
                next_state: Some(CallState::Failed),
                publish_events: vec![EventTemplate::StateChanged],
            },
        );

        // Any state -> Failed: offer rejected by the media server
        builder.add_wildcard(
            topology,
            StateEvent::NegotiationFailed,
            Transition {
                guards: vec![],
                actions: vec![
                    Action::RecordResult(ResultCode::SdpFailed),
                    Action::LeaveMedia,
                    Action::DeleteSession,
                ],
                next_state: Some(CallState::Failed),
                publish_events: vec![EventTemplate::StateChanged],
            },
        );

        // Any state -> Bye: the room was torn down
        builder.add_wildcard(
            topology,
            StateEvent::PeerDestroyed,
            Transition {
                guards: vec![],
                actions: vec![
                    Action::ReleaseFloor,
                    Action::RecordResult(ResultCode::PeerTerminated),
                    Action::LeaveMedia,
                    Action::DeleteSession,
                ],
                next_state: Some(CallState::Bye),
                publish_events: vec![EventTemplate::StateChanged],
            },
        );
    }

    for topology in SIGNALED {
        // Idle -> Ring: offered by the server
        builder.add_transition(
            topology,
            CallState::Idle,
            StateEvent::CallOffered,
            Transition {
                guards: vec![Guard::IsIncoming, Guard::HasRoomId],
                actions: vec![],
                next_state: Some(CallState::Ring),
                publish_events: vec![EventTemplate::CallArrived],
            },
        );

        // Ring -> WaitRingBack: create acknowledged with a room id
        builder.add_transition(
            topology,
            CallState::Ring,
            StateEvent::RoomAssigned,
            Transition {
                guards: vec![Guard::IsOutgoing, Guard::HasRoomId],
                actions: vec![Action::MigrateKey, Action::RequestMedia],
                next_state: Some(CallState::WaitRingBack),
                publish_events: vec![EventTemplate::RoomIdAssigned, EventTemplate::StateChanged],
            },
        );

        for state in [CallState::Ring, CallState::WaitRingBack, CallState::RingBack] {
            builder.add_state_change(topology, state, StateEvent::MediaSubscribed, CallState::Talking);
            builder.add_state_change(topology, state, StateEvent::PeerAccepted, CallState::Talking);
        }
    }
}
