//! The video monitoring room, terminal presence and relayed messages.

mod common;

use pretty_assertions::assert_eq;
use serde_json::{json, Map};

use common::{harness, state_changes, Harness};
use rdispatch_session_core::signal::{ChildMessageType, MonitorTransport, OnlineState};
use rdispatch_session_core::{
    CallOperation, CallState, Event, ForwardTarget, MediaCommand, MediaEvent, MemberStatus, MonitorTarget,
    SessionError, SessionKey,
};

const MONITOR_ROOM: &str = "999999101100";

fn monitor() -> SessionKey {
    SessionKey::new(MONITOR_ROOM)
}

fn camera(n: u32) -> MonitorTarget {
    MonitorTarget::new(format!("300{}", n), format!("Camera {}", n), format!("dev-{}", n))
}

/// Opens the monitoring room with cameras 1 and 2.
fn open_room(h: &mut Harness) {
    h.engine.add_monitor_members(vec![camera(1), camera(2)], false).unwrap();
    h.reset();
}

fn member_status(h: &Harness, id: &str) -> Option<MemberStatus> {
    h.session(MONITOR_ROOM)?.roster.member(id).map(|m| m.status)
}

#[test]
fn test_first_add_opens_the_room() {
    let mut h = harness();

    let key = h.engine.add_monitor_members(vec![camera(1)], false).unwrap();
    assert_eq!(key, monitor());

    let session = h.session(MONITOR_ROOM).unwrap();
    assert_eq!(session.state, CallState::LineHold);
    assert_eq!(session.room_id.as_deref(), Some(MONITOR_ROOM));
    assert_eq!(member_status(&h, "3001"), Some(MemberStatus::Calling));

    let sent = h.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["sig"], "message");
    assert_eq!(sent[0]["childMsgType"], "DaRtmpS");
    assert_eq!(sent[0]["destId"], "3001");
    assert_eq!(sent[0]["devid"], "dev-1");
    assert_eq!(sent[0]["srcId"], "1001");
    assert_eq!(
        h.media.take(),
        vec![MediaCommand::JoinRoom { session_key: monitor(), room_id: MONITOR_ROOM.into() }]
    );

    let events = h.take_events();
    assert_eq!(state_changes(&events), vec![CallState::Ring, CallState::LineHold]);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::RosterUpdated { operation: CallOperation::AddSucceeded, .. })));

    // Adding to an open room only sends the start request
    h.engine.add_monitor_members(vec![camera(2)], true).unwrap();
    assert_eq!(h.sent()[0]["childMsgType"], "DaRecordAndMonitor");
    assert!(h.media.take().is_empty());
    assert!(state_changes(&h.take_events()).is_empty());
    assert_eq!(h.session(MONITOR_ROOM).unwrap().roster.len(), 2);
}

#[test]
fn test_streams_bring_the_room_to_talking() {
    let mut h = harness();
    open_room(&mut h);

    h.engine.handle_media_event(&monitor(), MediaEvent::StreamAdded { member_id: "3001".into() });
    assert_eq!(member_status(&h, "3001"), Some(MemberStatus::Joined));

    h.engine.handle_media_event(&monitor(), MediaEvent::StreamAdded { member_id: "3009".into() });
    assert_eq!(member_status(&h, "3009"), Some(MemberStatus::Joined));
    h.reset();

    h.engine.handle_media_event(
        &monitor(),
        MediaEvent::Subscribed { member_id: Some("3001".into()), subscription_id: "sub-9".into() },
    );
    assert_eq!(h.state(MONITOR_ROOM), Some(CallState::Talking));
    assert_eq!(state_changes(&h.take_events()), vec![CallState::Talking]);

    h.engine.handle_media_event(&monitor(), MediaEvent::PeerLeft { member_id: Some("3009".into()) });
    assert_eq!(member_status(&h, "3009"), Some(MemberStatus::Quit));
    assert_eq!(h.state(MONITOR_ROOM), Some(CallState::Talking));
}

#[test]
fn test_terminal_refusing_to_stream() {
    let mut h = harness();
    open_room(&mut h);

    h.inject(json!({
        "sig": "message",
        "msgType": "WsOpServerToClient",
        "childMsgType": "DaRtmpSResp",
        "srcId": "3002",
        "result": "0"
    }));
    assert_eq!(member_status(&h, "3002"), Some(MemberStatus::Calling));
    assert!(h.take_events().is_empty());

    h.inject(json!({
        "sig": "message",
        "msgType": "WsOpServerToClient",
        "childMsgType": "DaRtmpSResp",
        "srcId": "3002",
        "result": "1"
    }));
    assert_eq!(member_status(&h, "3002"), Some(MemberStatus::Quit));
    let events = h.take_events();
    assert!(matches!(
        &events[..],
        [Event::RosterUpdated { operation: CallOperation::MemberUpdated, .. }]
    ));
}

#[test]
fn test_terminal_presence() {
    let mut h = harness();
    open_room(&mut h);

    h.inject(json!({"sig": "notifyweb", "type": "onlinestate", "uid": "3001", "onlineState": "offline"}));
    let events = h.take_events();
    assert_eq!(events[0], Event::TerminalStatus { user_id: "3001".into(), state: OnlineState::Offline });
    assert_eq!(events.len(), 2);
    assert_eq!(member_status(&h, "3001"), Some(MemberStatus::Quit));

    // Terminals outside the room only produce the status event
    h.inject(json!({"sig": "notifyweb", "type": "onlinestate", "uid": "4004", "onlineState": "online"}));
    assert_eq!(
        h.take_events(),
        vec![Event::TerminalStatus { user_id: "4004".into(), state: OnlineState::Online }]
    );

    h.inject(json!({"sig": "notifyweb", "type": "groupactive", "roomId": "G9"}));
    assert_eq!(h.take_events(), vec![Event::GroupActivity { room_id: "G9".into() }]);
}

#[test]
fn test_talking_to_a_terminal() {
    let mut h = harness();
    open_room(&mut h);

    h.engine.start_monitor_voice("3001").unwrap();
    let sent = h.sent();
    assert_eq!(sent[0]["sig"], "monitor");
    assert_eq!(sent[0]["type"], "publishvoice");
    assert_eq!(sent[0]["toUserId"], "3001");
    assert_eq!(
        h.media.take(),
        vec![MediaCommand::SetLocalAudioMuted { session_key: monitor(), muted: false }]
    );

    h.inject(json!({"sig": "monitorack", "type": "publishvoice", "code": "000000"}));
    assert_eq!(
        h.media.take(),
        vec![MediaCommand::SetLocalAudioMuted { session_key: monitor(), muted: false }]
    );

    h.inject(json!({"sig": "monitorack", "type": "publishvoice", "code": "100015"}));
    assert!(h.media.take().is_empty());

    h.engine.stop_monitor_voice("3001").unwrap();
    assert_eq!(h.sent()[0]["type"], "unpublishvoice");
}

#[test]
fn test_forward_stream() {
    let mut h = harness();
    let forward = ForwardTarget {
        target_id: "3001".into(),
        call_no: "5005".into(),
        transport: MonitorTransport::Rtmp,
        url: Some("rtmp://relay.example/live/3001".into()),
    };

    h.engine.forward_monitor(&forward).unwrap();

    let sent = h.sent();
    assert_eq!(sent[0]["childMsgType"], "DaRtmpP");
    assert_eq!(sent[0]["destId"], "3001");
    assert_eq!(sent[0]["devid"], "3001");
    assert_eq!(sent[0]["rtmpDest"], "5005");
    assert_eq!(sent[0]["type"], "rtmp");
    assert_eq!(sent[0]["url"], "rtmp://relay.example/live/3001");
}

#[test]
fn test_removing_every_member_closes_the_room() {
    let mut h = harness();
    open_room(&mut h);

    h.engine.remove_monitor_members(&[camera(1)]).unwrap();
    assert_eq!(h.sent()[0]["childMsgType"], "DaRtmpE");
    assert!(h.session(MONITOR_ROOM).is_some());
    let events = h.take_events();
    assert!(matches!(
        &events[..],
        [Event::RosterUpdated { operation: CallOperation::KickSucceeded, .. }]
    ));

    h.engine.remove_monitor_members(&[camera(2)]).unwrap();
    assert!(h.session(MONITOR_ROOM).is_none());
    assert_eq!(h.media.take(), vec![MediaCommand::Leave { session_key: monitor() }]);
    assert!(state_changes(&h.take_events()).is_empty());

    assert!(matches!(
        h.engine.remove_monitor_members(&[camera(2)]),
        Err(SessionError::SessionNotFound { .. })
    ));
}

#[test]
fn test_monitor_requests_need_targets_and_a_room() {
    let mut h = harness();
    assert!(matches!(
        h.engine.add_monitor_members(Vec::new(), false),
        Err(SessionError::InvalidRequest { .. })
    ));
    assert!(matches!(h.engine.start_monitor_voice("3001"), Err(SessionError::SessionNotFound { .. })));
    assert!(matches!(
        h.engine.retry_monitor_member(&camera(1), false),
        Err(SessionError::SessionNotFound { .. })
    ));
    assert!(h.sent().is_empty());

    open_room(&mut h);
    h.engine.retry_monitor_member(&camera(1), true).unwrap();
    assert_eq!(h.sent()[0]["childMsgType"], "DaRecordAndMonitor");
}

#[test]
fn test_custom_messages() {
    let mut h = harness();
    open_room(&mut h);

    let frame = json!({"sig": "message", "msgType": "WsOpServerDoToClient", "srcId": "3001", "content": {"text": "hi"}});
    h.inject(frame.clone());
    assert_eq!(h.take_events(), vec![Event::CustomMessage { content: frame }]);

    h.engine.send_custom_message("3001", json!({"text": "hello"})).unwrap();
    let sent = h.sent();
    assert_eq!(sent[0]["destId"], "3001");
    assert_eq!(sent[0]["content"]["text"], "hello");

    let count = h.engine.send_custom_message_to_room(&monitor(), json!({"text": "all"})).unwrap();
    assert_eq!(count, 2);
    assert_eq!(h.sent().len(), 2);
}

#[test]
fn test_remote_control_merges_extra_fields() {
    let mut h = harness();
    let mut extra = Map::new();
    extra.insert("scale".into(), json!(2));

    h.engine
        .remote_control(ChildMessageType::RemoteZoomScale, "3001", "dev-1", extra)
        .unwrap();

    let sent = h.sent();
    assert_eq!(sent[0]["childMsgType"], "DaRemoteZoomScale");
    assert_eq!(sent[0]["msgType"], "WsOpServerToClient");
    assert_eq!(sent[0]["scale"], 2);
}
