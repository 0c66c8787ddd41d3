//! Shared harness for engine scenario tests
#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use rdispatch_session_core::{
    CallSession, CallState, Event, EventCategory, MediaCommand, MediaTransport, MemoryTransport,
    SessionConfig, SessionEngine, SessionKey,
};

pub const SELF_ID: &str = "1001";
pub const SELF_NAME: &str = "Dispatcher";

pub const ALL_CATEGORIES: [EventCategory; 12] = [
    EventCategory::Connected,
    EventCategory::Disconnected,
    EventCategory::CallArrived,
    EventCategory::StateChanged,
    EventCategory::RosterUpdated,
    EventCategory::VideoStats,
    EventCategory::CallOperation,
    EventCategory::TerminalStatus,
    EventCategory::RoomIdAssigned,
    EventCategory::GroupActivity,
    EventCategory::CustomMessage,
    EventCategory::ErrorOccurred,
];

/// Media layer that records every call as the matching command
#[derive(Debug, Default)]
pub struct RecordingMedia {
    commands: Mutex<Vec<MediaCommand>>,
}

impl RecordingMedia {
    pub fn take(&self) -> Vec<MediaCommand> {
        std::mem::take(&mut *self.commands.lock())
    }

    fn push(&self, command: MediaCommand) {
        self.commands.lock().push(command);
    }
}

impl MediaTransport for RecordingMedia {
    fn set_remote_description(&self, session_key: &SessionKey, sdp: &str) {
        self.push(MediaCommand::SetRemoteDescription { session_key: session_key.clone(), sdp: sdp.to_string() });
    }

    fn subscribe(&self, session_key: &SessionKey, room_id: &str) {
        self.push(MediaCommand::Subscribe { session_key: session_key.clone(), room_id: room_id.to_string() });
    }

    fn publish(&self, session_key: &SessionKey, room_id: &str) {
        self.push(MediaCommand::Publish { session_key: session_key.clone(), room_id: room_id.to_string() });
    }

    fn join_room(&self, session_key: &SessionKey, room_id: &str) {
        self.push(MediaCommand::JoinRoom { session_key: session_key.clone(), room_id: room_id.to_string() });
    }

    fn leave(&self, session_key: &SessionKey) {
        self.push(MediaCommand::Leave { session_key: session_key.clone() });
    }

    fn close_send(&self, session_key: &SessionKey) {
        self.push(MediaCommand::CloseSend { session_key: session_key.clone() });
    }

    fn set_local_audio_muted(&self, session_key: &SessionKey, muted: bool) {
        self.push(MediaCommand::SetLocalAudioMuted { session_key: session_key.clone(), muted });
    }
}

pub struct Harness {
    pub engine: SessionEngine,
    pub transport: MemoryTransport,
    pub media: Arc<RecordingMedia>,
    events: Arc<Mutex<Vec<Event>>>,
}

pub fn harness() -> Harness {
    harness_with(SessionConfig::new(SELF_ID, SELF_NAME))
}

pub fn harness_with(config: SessionConfig) -> Harness {
    let transport = MemoryTransport::new();
    let media = Arc::new(RecordingMedia::default());
    let engine = SessionEngine::new(
        config,
        Arc::new(transport.clone()),
        media.clone(),
    )
    .expect("valid config");

    let events = Arc::new(Mutex::new(Vec::new()));
    for category in ALL_CATEGORIES {
        let sink = events.clone();
        engine.on(category, move |event| sink.lock().push(event.clone()));
    }

    Harness { engine, transport, media, events }
}

impl Harness {
    /// Feed one server frame.
    pub fn inject(&mut self, frame: Value) {
        self.engine.handle_frame(&frame.to_string()).expect("frame decodes");
    }

    pub fn take_events(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Frames sent since the last call, parsed back to JSON.
    pub fn sent(&self) -> Vec<Value> {
        self.transport
            .take_frames()
            .iter()
            .map(|frame| serde_json::from_str(frame).expect("sent frame is JSON"))
            .collect()
    }

    pub fn sent_signals(&self) -> Vec<String> {
        self.sent()
            .iter()
            .map(|frame| frame["sig"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn session(&self, key: &str) -> Option<CallSession> {
        self.engine.session(&SessionKey::new(key))
    }

    pub fn state(&self, key: &str) -> Option<CallState> {
        self.session(key).map(|s| s.state)
    }

    /// Clear everything recorded so far.
    pub fn reset(&self) {
        self.take_events();
        self.transport.take_frames();
        self.media.take();
    }
}

/// States carried by the `StateChanged` events in `events`.
pub fn state_changes(events: &[Event]) -> Vec<CallState> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::StateChanged(session) => Some(session.state),
            _ => None,
        })
        .collect()
}
