use crate::state_table::{Action, CallState, EventTemplate, StateTableBuilder, StateEvent, Topology, Transition};

/// Add transitions for conferences, PTT groups and broadcast.
///
/// Rejections, departures and subscription failures of individual members
/// are roster changes and never move the group itself.
pub fn add_group_transitions(builder: &mut StateTableBuilder) {
    for state in [CallState::Ring, CallState::WaitRingBack, CallState::RingBack] {
        builder.add_transition(
            Topology::Group,
            state,
            StateEvent::AnswerConfirmed,
            Transition {
                guards: vec![],
                actions: vec![Action::QueueJoinFinish, Action::QueueMemberQuery],
                next_state: Some(CallState::Talking),
                publish_events: vec![EventTemplate::StateChanged],
            },
        );
    }

    // Talking: late answer, finish the join without a state change
    builder.add_transition(
        Topology::Group,
        CallState::Talking,
        StateEvent::AnswerConfirmed,
        Transition {
            guards: vec![],
            actions: vec![Action::QueueJoinFinish, Action::QueueMemberQuery],
            next_state: None,
            publish_events: vec![],
        },
    );
}
