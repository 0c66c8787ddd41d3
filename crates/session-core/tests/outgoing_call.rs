//! Two-party call flows driven through the engine: placing, answering,
//! refusing and ending voice calls, plus transport failures.

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;

use common::{harness, harness_with, state_changes, Harness, SELF_ID, SELF_NAME};
use rdispatch_session_core::{
    CallOperation, CallRequest, CallState, CallType, Direction, Event, MediaCommand, SessionConfig, SessionError,
    SessionKey, TransportEvent,
};

/// Places a voice call to 2002 and lets the server assign room R1.
fn voice_call_in_room(h: &mut Harness) {
    h.engine.create(CallRequest::new(CallType::Voice, "2002", "Unit 2")).unwrap();
    h.inject(json!({
        "sig": "newpeer",
        "callOut": "1",
        "code": "000000",
        "roomId": "R1",
        "callType": "voice",
        "audioOnly": "1",
        "fromUserId": "1001",
        "toUserId": "2002"
    }));
    h.reset();
}

#[test]
fn test_outgoing_voice_call_reaches_talking() {
    let mut h = harness();

    let key = h.engine.create(CallRequest::new(CallType::Voice, "2002", "Unit 2")).unwrap();
    assert_eq!(key.as_str(), "1001@2002");
    assert_eq!(h.state("1001@2002"), Some(CallState::Ring));
    assert_eq!(h.sent_signals(), vec!["create"]);
    assert_eq!(state_changes(&h.take_events()), vec![CallState::Ring]);

    h.inject(json!({
        "sig": "newpeer",
        "callOut": "1",
        "code": "000000",
        "roomId": "R1",
        "callType": "voice",
        "audioOnly": "1",
        "fromUserId": "1001",
        "toUserId": "2002"
    }));

    assert!(h.session("1001@2002").is_none());
    let session = h.session("R1").unwrap();
    assert_eq!(session.state, CallState::WaitRingBack);
    assert_eq!(session.session_key.as_str(), "R1");
    assert_eq!(session.room_id.as_deref(), Some("R1"));

    let events = h.take_events();
    assert!(matches!(&events[0], Event::RoomIdAssigned(s) if s.session_key.as_str() == "R1"));
    assert_eq!(state_changes(&events), vec![CallState::WaitRingBack]);
    assert_eq!(
        h.media.take(),
        vec![MediaCommand::JoinRoom { session_key: SessionKey::new("R1"), room_id: "R1".into() }]
    );

    h.inject(json!({"sig": "accept", "roomId": "R1", "fromUserId": "2002"}));
    assert_eq!(h.state("R1"), Some(CallState::Talking));
    assert_eq!(state_changes(&h.take_events()), vec![CallState::Talking]);
}

#[test]
fn test_create_refused_by_server() {
    let mut h = harness();
    h.engine.create(CallRequest::new(CallType::Voice, "2002", "Unit 2")).unwrap();
    h.reset();

    h.inject(json!({
        "sig": "createack",
        "code": "100015",
        "callType": "voice",
        "audioOnly": "1",
        "fromUserId": "1001",
        "toUserId": "2002"
    }));

    assert!(h.engine.sessions().is_empty());
    let events = h.take_events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::StateChanged(session) => {
            assert_eq!(session.state, CallState::Failed);
            let error = session.last_error.as_ref().unwrap();
            assert_eq!(error.code, "100015");
            assert_eq!(error.message, "Target is not online");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_successful_createack_changes_nothing() {
    let mut h = harness();
    h.engine.create(CallRequest::new(CallType::Voice, "2002", "Unit 2")).unwrap();
    h.reset();

    h.inject(json!({"sig": "createack", "code": "000000", "callType": "voice", "fromUserId": "1001", "toUserId": "2002"}));
    assert_eq!(h.state("1001@2002"), Some(CallState::Ring));
    assert!(h.take_events().is_empty());
}

#[test]
fn test_failed_newpeer_fails_the_call() {
    let mut h = harness();
    h.engine.create(CallRequest::new(CallType::Voice, "2002", "Unit 2")).unwrap();
    h.reset();

    h.inject(json!({
        "sig": "newpeer",
        "callOut": "1",
        "code": "100002",
        "callType": "voice",
        "audioOnly": "1",
        "fromUserId": "1001",
        "toUserId": "2002"
    }));

    assert!(h.engine.sessions().is_empty());
    assert_eq!(state_changes(&h.take_events()), vec![CallState::Failed]);
}

#[test]
fn test_peer_hangup_ends_call() {
    let mut h = harness();
    voice_call_in_room(&mut h);
    h.inject(json!({"sig": "accept", "roomId": "R1", "fromUserId": "2002"}));
    h.reset();

    h.inject(json!({"sig": "leave", "roomId": "R1", "fromUserId": "2002"}));

    assert!(h.session("R1").is_none());
    let events = h.take_events();
    assert_eq!(state_changes(&events), vec![CallState::Bye]);
    if let Event::StateChanged(session) = &events[0] {
        assert_eq!(session.last_error.as_ref().unwrap().code, "013");
    }
    assert_eq!(h.sent_signals(), vec!["leave"]);
    assert_eq!(h.media.take(), vec![MediaCommand::Leave { session_key: SessionKey::new("R1") }]);
}

#[test]
fn test_peer_rejects_call() {
    let mut h = harness();
    voice_call_in_room(&mut h);

    h.inject(json!({"sig": "reject", "roomId": "R1", "fromUserId": "2002", "reason": 1}));

    assert!(h.session("R1").is_none());
    let events = h.take_events();
    assert_eq!(state_changes(&events), vec![CallState::Rejected]);
    if let Event::StateChanged(session) = &events[0] {
        assert_eq!(session.last_error.as_ref().unwrap().code, "012");
    }
}

#[test]
fn test_sdp_failure() {
    let mut h = harness();
    voice_call_in_room(&mut h);

    h.inject(json!({"sig": "offerack", "roomId": "R1", "code": "100014"}));

    assert!(h.session("R1").is_none());
    let events = h.take_events();
    assert!(matches!(
        &events[0],
        Event::CallOperation { operation: CallOperation::SdpFailed, result: Some(e), .. } if e.code == "100014"
    ));
    assert_eq!(state_changes(&events), vec![CallState::Failed]);
}

#[test]
fn test_incoming_call_accept_and_reject() {
    let mut h = harness();

    h.inject(json!({
        "sig": "newpeer",
        "callOut": "0",
        "roomId": "R9",
        "callType": "voice",
        "audioOnly": "0",
        "fromUserId": "2002",
        "fromUserName": "Unit 2",
        "toUserId": "1001",
        "toUserName": "Dispatcher"
    }));

    let session = h.session("R9").unwrap();
    assert_eq!(session.call_type, CallType::Video);
    assert_eq!(session.direction, Direction::Incoming);
    assert_eq!(session.state, CallState::Ring);
    let events = h.take_events();
    assert!(matches!(&events[..], [Event::CallArrived(s)] if s.from_id == "2002"));

    // The same offer again is ignored
    h.inject(json!({"sig": "newpeer", "callOut": "0", "roomId": "R9", "callType": "voice", "fromUserId": "2002"}));
    assert!(h.take_events().is_empty());

    h.engine.accept_call(&SessionKey::new("R9")).unwrap();
    let sent = h.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["sig"], "accept");
    assert_eq!(sent[0]["toUserId"], "2002");
    assert_eq!(
        h.media.take(),
        vec![MediaCommand::JoinRoom { session_key: SessionKey::new("R9"), room_id: "R9".into() }]
    );

    h.engine.reject_call(&SessionKey::new("R9")).unwrap();
    assert_eq!(h.sent_signals(), vec!["reject"]);
    assert!(h.session("R9").is_none());
    assert!(h.take_events().is_empty());
}

#[test]
fn test_supervisory_call_is_keyed_like_a_voice_call() {
    let mut h = harness();
    let key = h.engine.create(CallRequest::new(CallType::ForceInsert, "2002", "Unit 2")).unwrap();
    assert_eq!(key.as_str(), "1001@2002");
    let sent = h.sent();
    assert_eq!(sent[0]["sig"], "callopt");
    assert_eq!(sent[0]["type"], "forceinterposecall");

    h.inject(json!({
        "sig": "newpeer",
        "callOut": "1",
        "code": "000000",
        "roomId": "R4",
        "callType": "voice",
        "audioOnly": "1",
        "fromUserId": "1001",
        "toUserId": "2002"
    }));
    let session = h.session("R4").unwrap();
    assert_eq!(session.call_type, CallType::ForceInsert);
    assert_eq!(session.state, CallState::WaitRingBack);
}

#[test]
fn test_duplicate_create_is_refused() {
    let mut h = harness();
    h.engine.create(CallRequest::new(CallType::Voice, "2002", "Unit 2")).unwrap();
    let again = h.engine.create(CallRequest::new(CallType::Voice, "2002", "Unit 2"));
    assert!(matches!(again, Err(SessionError::InvalidState { .. })));
    assert_eq!(h.engine.sessions().len(), 1);
}

#[test]
fn test_send_failure_drops_new_session() {
    let mut h = harness();
    h.transport.set_fail_sends(true);

    let result = h.engine.create(CallRequest::new(CallType::Voice, "2002", "Unit 2"));
    assert!(matches!(result, Err(SessionError::Transport(_))));
    assert!(h.engine.sessions().is_empty());
    assert!(h
        .take_events()
        .iter()
        .any(|e| matches!(e, Event::CallOperation { operation: CallOperation::SocketError, .. })));
}

#[test]
fn test_local_hangup() {
    let mut h = harness();
    voice_call_in_room(&mut h);

    h.engine.leave_call(&SessionKey::new("R1")).unwrap();
    assert_eq!(h.sent_signals(), vec!["leave"]);
    assert!(h.session("R1").is_none());
    h.reset();

    assert!(h.engine.leave_call(&SessionKey::new("R1")).is_ok());
    assert!(h.sent().is_empty());
    assert!(h.media.take().is_empty());
}

#[test]
fn test_hangup_after_server_destroy_is_a_no_op() {
    let mut h = harness();
    voice_call_in_room(&mut h);
    h.inject(json!({"sig": "accept", "roomId": "R1", "fromUserId": "2002"}));
    h.inject(json!({"sig": "destroy", "roomId": "R1", "fromUserId": "2002"}));
    assert!(h.session("R1").is_none());
    h.reset();

    let key = SessionKey::new("R1");
    assert!(h.engine.leave_call(&key).is_ok());
    assert!(h.engine.destroy_call(&key).is_ok());
    assert!(h.engine.reject_call(&key).is_ok());

    assert!(h.sent().is_empty());
    assert!(h.media.take().is_empty());
    assert!(h.take_events().is_empty());
}

#[test]
fn test_configured_placeholder_room_id() {
    let mut h = harness_with(SessionConfig::new(SELF_ID, SELF_NAME).with_placeholder_room_id("PENDING"));
    h.engine.create(CallRequest::new(CallType::Voice, "2002", "Unit 2")).unwrap();
    let sent = h.sent();
    assert_eq!(sent[0]["roomId"], "PENDING");

    // A room id equal to the placeholder is not an assignment
    h.inject(json!({
        "sig": "newpeer",
        "callOut": "1",
        "code": "000000",
        "roomId": "PENDING",
        "callType": "voice",
        "audioOnly": "1",
        "fromUserId": "1001",
        "toUserId": "2002"
    }));
    assert_eq!(h.state("1001@2002"), Some(CallState::Ring));
    assert!(h.session("PENDING").is_none());
}

#[test]
fn test_frames_for_unknown_rooms_are_ignored() {
    let mut h = harness();
    h.inject(json!({"sig": "leave", "roomId": "NOPE", "fromUserId": "2002"}));
    h.inject(json!({"sig": "destroy", "roomId": "NOPE"}));
    h.inject(json!({"sig": "ring", "roomId": "NOPE"}));
    assert!(h.take_events().is_empty());
    assert!(h.sent().is_empty());
}

#[test]
fn test_transport_events() {
    let mut h = harness();
    h.engine.handle_transport_event(TransportEvent::Opened);
    h.engine.handle_transport_event(TransportEvent::Error("reset by peer".into()));
    h.engine.handle_transport_event(TransportEvent::Message("{\"roomId\":\"R1\"}".into()));

    let events = h.take_events();
    assert_eq!(events[0], Event::Connected);
    assert_eq!(events[1], Event::Disconnected { reason: Some("reset by peer".into()) });
    assert!(matches!(events[2], Event::ErrorOccurred { .. }));
    assert!(h.engine.handle_frame("not json").is_err());
}

#[test]
fn test_statistics() {
    let mut h = harness();
    assert!(!h.engine.is_call_exist());
    h.engine.create(CallRequest::new(CallType::Voice, "2002", "Unit 2")).unwrap();
    h.engine.create(CallRequest::new(CallType::Video, "2003", "Unit 3")).unwrap();

    let stats = h.engine.statistics();
    assert_eq!(stats.voice, 1);
    assert_eq!(stats.video, 1);
    assert_eq!(stats.total(), 2);
    assert!(h.engine.is_call_exist());
}
