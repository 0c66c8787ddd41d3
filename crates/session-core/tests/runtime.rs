//! The engine running on its own task behind an `EngineHandle`.

mod common;

use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::json;

use rdispatch_session_core::prelude::*;
use rdispatch_session_core::{MediaEvent, NoopMedia};

fn spawn_engine() -> (EngineHandle, tokio::task::JoinHandle<()>, MemoryTransport, Arc<Mutex<Vec<Event>>>) {
    let transport = MemoryTransport::new();
    let engine = SessionEngine::new(
        SessionConfig::new(common::SELF_ID, common::SELF_NAME),
        Arc::new(transport.clone()),
        Arc::new(NoopMedia),
    )
    .unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    for category in common::ALL_CATEGORIES {
        let sink = events.clone();
        engine.on(category, move |event| sink.lock().push(event.clone()));
    }

    let (handle, task) = EngineRuntime::spawn(engine, 16);
    (handle, task, transport, events)
}

#[tokio::test]
async fn test_call_lifecycle_through_handle() {
    let (handle, task, transport, events) = spawn_engine();

    let key = handle.create(CallRequest::new(CallType::Voice, "2002", "Unit 2")).await.unwrap();
    assert_eq!(key.as_str(), "1001@2002");

    let newpeer = json!({
        "sig": "newpeer",
        "callOut": "1",
        "code": "000000",
        "roomId": "R1",
        "callType": "voice",
        "audioOnly": "1",
        "fromUserId": "1001",
        "toUserId": "2002"
    });
    handle.transport_event(TransportEvent::Message(newpeer.to_string())).await.unwrap();
    handle
        .media_event(
            SessionKey::new("R1"),
            MediaEvent::Subscribed { member_id: None, subscription_id: "sub-1".into() },
        )
        .await
        .unwrap();

    // Commands are processed in order, so the read sees both events applied
    let session = handle.session(SessionKey::new("R1")).await.unwrap().unwrap();
    assert_eq!(session.state, CallState::Talking);
    assert_eq!(session.subscription_id.as_deref(), Some("sub-1"));
    assert_eq!(handle.statistics().await.unwrap().voice, 1);

    handle.leave_call(SessionKey::new("R1")).await.unwrap();
    assert!(handle.sessions().await.unwrap().is_empty());

    let signals: Vec<String> = transport
        .frames()
        .iter()
        .map(|f| serde_json::from_str::<serde_json::Value>(f).unwrap()["sig"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(signals, vec!["create", "leave"]);
    assert!(events.lock().iter().any(|e| matches!(e, Event::RoomIdAssigned(_))));

    handle.shutdown().await;
    task.await.unwrap();
    assert!(handle.is_closed());
}

#[tokio::test]
async fn test_errors_cross_the_task_boundary() {
    let (handle, task, _transport, _events) = spawn_engine();

    let missing = handle.accept_call(SessionKey::new("nope")).await;
    assert!(matches!(missing, Err(SessionError::SessionNotFound { .. })));

    let count = handle.execute(|engine| engine.sessions().len()).await.unwrap();
    assert_eq!(count, 0);

    handle.shutdown().await;
    task.await.unwrap();

    let closed = handle.sessions().await;
    assert!(matches!(closed, Err(SessionError::RuntimeClosed)));
}

#[tokio::test]
async fn test_dropping_every_handle_stops_the_task() {
    let (handle, task, _transport, events) = spawn_engine();
    handle.transport_event(TransportEvent::Opened).await.unwrap();
    drop(handle);
    task.await.unwrap();
    assert_eq!(events.lock().as_slice(), &[Event::Connected]);
}
