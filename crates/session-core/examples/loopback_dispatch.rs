//! Loopback dispatch example
//!
//! Runs the engine against a scripted in-process server: the server task
//! reads every frame the engine sends and answers the way a dispatch server
//! would, so a voice call goes from `create` to `Talking` and back down
//! without any network.
//!
//! ```sh
//! RUST_LOG=debug cargo run --example loopback_dispatch
//! ```

use std::sync::Arc;

use anyhow::Context;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::{info, Level};

use rdispatch_session_core::logging::{setup_logging, LoggingConfig};
use rdispatch_session_core::prelude::*;
use rdispatch_session_core::{MediaEvent, TransportError};

/// Hands outbound frames to the scripted server.
struct ChannelTransport {
    tx: mpsc::UnboundedSender<String>,
}

impl SignalTransport for ChannelTransport {
    fn send(&self, frame: &str) -> std::result::Result<(), TransportError> {
        self.tx
            .send(frame.to_string())
            .map_err(|e| TransportError::SendFailed { message: e.to_string() })
    }
}

/// Answers `create` with a room and has the callee pick up right away.
async fn scripted_server(mut rx: mpsc::UnboundedReceiver<String>, handle: EngineHandle) -> anyhow::Result<()> {
    while let Some(frame) = rx.recv().await {
        let request: Value = serde_json::from_str(&frame).context("engine sent invalid JSON")?;
        let sig = request["sig"].as_str().unwrap_or_default();
        info!(sig, "server received");

        let replies = match sig {
            "create" => vec![
                json!({
                    "sig": "newpeer",
                    "callOut": "1",
                    "code": "000000",
                    "roomId": "R100",
                    "callType": request["callType"],
                    "audioOnly": request["audioOnly"],
                    "fromUserId": request["fromUserId"],
                    "toUserId": request["toUserId"],
                }),
                json!({"sig": "accept", "roomId": "R100", "fromUserId": request["toUserId"]}),
            ],
            "leave" => vec![json!({"sig": "leaveack", "roomId": "R100"})],
            _ => Vec::new(),
        };

        for reply in replies {
            handle.transport_event(TransportEvent::Message(reply.to_string())).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging(LoggingConfig::new(Level::INFO, "loopback_dispatch"))?;

    let (tx, rx) = mpsc::unbounded_channel();
    let config = SessionConfig::new("1001", "Dispatcher");
    let engine = SessionEngine::new(config, Arc::new(ChannelTransport { tx }), Arc::new(NoopMedia))?;

    engine.on(EventCategory::StateChanged, |event| {
        if let Event::StateChanged(session) = event {
            println!("📞 {} is now {}", session.session_key, session.state);
        }
    });
    engine.on(EventCategory::RoomIdAssigned, |event| {
        if let Event::RoomIdAssigned(session) = event {
            println!("🏠 call moved to room {}", session.session_key);
        }
    });

    let (handle, task) = EngineRuntime::spawn(engine, 64);
    let server = tokio::spawn(scripted_server(rx, handle.clone()));

    handle.transport_event(TransportEvent::Opened).await?;
    let key = handle.create(CallRequest::new(CallType::Voice, "2002", "Unit 2")).await?;
    println!("✅ placed call {}", key);

    sleep(Duration::from_millis(50)).await;
    let room = SessionKey::new("R100");
    handle
        .media_event(room.clone(), MediaEvent::Subscribed { member_id: None, subscription_id: "audio-0".into() })
        .await?;

    if let Some(session) = handle.session(room.clone()).await? {
        println!("📊 {} {:?} in {}", session.call_type, session.direction, session.state);
    }

    handle.leave_call(room).await?;
    println!("👋 hung up, {} calls left", handle.sessions().await?.len());

    handle.shutdown().await;
    task.await?;
    server.abort();
    Ok(())
}
