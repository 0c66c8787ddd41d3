//! Video monitoring room
//!
//! The monitoring room is a single session kept under the configured
//! monitor room id. Terminals are pulled in with stream start control
//! messages rather than `create`, and the room lives as long as it has
//! members.

use serde_json::Value;
use tracing::info;

use rdispatch_signal_core::{ChildMessageType, MonitorOperation};

use crate::adapters::MediaCommand;
use crate::api::engine::SessionEngine;
use crate::api::request::{ForwardTarget, MonitorTarget};
use crate::errors::{Result, SessionError};
use crate::roster::Member;
use crate::session::CallSession;
use crate::state_table::StateEvent;
use crate::types::{CallOperation, CallType, MemberId, MemberStatus, SessionKey};

fn start_message(local_record: bool) -> ChildMessageType {
    if local_record {
        ChildMessageType::StartStreamAndRecord
    } else {
        ChildMessageType::StartStream
    }
}

impl SessionEngine {
    pub fn monitor_key(&self) -> SessionKey {
        SessionKey::new(self.config.monitor_room_id.as_str())
    }

    /// Ask terminals to stream into the monitoring room, opening the room
    /// on first use.
    pub fn add_monitor_members(&mut self, targets: Vec<MonitorTarget>, local_record: bool) -> Result<SessionKey> {
        if targets.is_empty() {
            return Err(SessionError::invalid_request("no terminals to monitor"));
        }
        let key = self.monitor_key();
        let room_id = self.config.monitor_room_id.clone();
        let opening = !self.store.contains(&key);
        let identity = self.encoder.identity().clone();
        let child = start_message(local_record);

        let ((), effects) = self.step(|ctx| {
            if opening {
                info!(session_key = %key, "opening monitoring room");
                let session = CallSession::outgoing(
                    CallType::VideoMonitor,
                    (identity.user_id.as_str(), identity.user_name.as_str()),
                    "",
                    "",
                )
                .with_room_id(room_id.clone());
                ctx.store.insert(session);
                ctx.drive(&key, StateEvent::CreateSucceeded, None);
                ctx.drive(&key, StateEvent::StreamAssigned, None);
            }

            for target in &targets {
                let start = ctx.encoder.control(child.clone(), &target.id, &target.devid);
                ctx.queue(&start);
            }
            let members = targets
                .iter()
                .map(|t| Member::new(t.id.as_str(), t.name.as_str(), MemberStatus::Calling))
                .collect();
            ctx.store.with_session_mut(&key, |s| s.roster.reinvite(members));
            ctx.emit_roster(&key, CallOperation::AddSucceeded);

            if opening {
                ctx.queue_media(MediaCommand::JoinRoom { session_key: key.clone(), room_id });
            }
        });
        self.flush_for(&key, effects)?;
        Ok(key)
    }

    /// Stop terminals streaming. Removing the last one closes the room
    /// without an event.
    pub fn remove_monitor_members(&mut self, targets: &[MonitorTarget]) -> Result<()> {
        let key = self.monitor_key();
        self.require(&key)?;
        let ids: Vec<MemberId> = targets.iter().map(|t| t.id.clone()).collect();

        let ((), effects) = self.step(|ctx| {
            for target in targets {
                let stop = ctx.encoder.control(ChildMessageType::StopStream, &target.id, &target.devid);
                ctx.queue(&stop);
            }
            ctx.store.with_session_mut(&key, |s| s.roster.remove_members(&ids));
            ctx.emit_roster(&key, CallOperation::KickSucceeded);

            let empty = ctx.store.with_session(&key, |s| s.roster.is_empty()).unwrap_or(true);
            if empty {
                info!(session_key = %key, "monitoring room empty, closing");
                ctx.queue_media(MediaCommand::Leave { session_key: key.clone() });
                ctx.store.delete(&key);
            }
        });
        self.flush_for(&key, effects)
    }

    /// Resend the stream start request to one terminal.
    pub fn retry_monitor_member(&mut self, target: &MonitorTarget, local_record: bool) -> Result<()> {
        let key = self.monitor_key();
        self.require(&key)?;
        let start = self.encoder.control(start_message(local_record), &target.id, &target.devid);
        self.send(&start)
    }

    /// Talk to a monitored terminal.
    pub fn start_monitor_voice(&mut self, target_id: &str) -> Result<()> {
        let key = self.monitor_key();
        self.require(&key)?;
        let ((), effects) = self.step(|ctx| {
            ctx.queue_media(MediaCommand::SetLocalAudioMuted { session_key: key.clone(), muted: false });
            let publish = ctx.encoder.monitor_voice(MonitorOperation::PublishVoice, target_id);
            ctx.queue_envelope(publish);
        });
        self.flush_for(&key, effects)
    }

    pub fn stop_monitor_voice(&mut self, target_id: &str) -> Result<()> {
        let key = self.monitor_key();
        self.require(&key)?;
        self.send(&self.encoder.monitor_voice(MonitorOperation::UnpublishVoice, target_id))
    }

    /// Forward a terminal's stream to another destination.
    pub fn forward_monitor(&mut self, forward: &ForwardTarget) -> Result<()> {
        let mut message = self.encoder.control(
            ChildMessageType::ForwardStream,
            &forward.target_id,
            &forward.target_id,
        );
        message.rtmp_dest = forward.call_no.clone();
        message.transport = forward.transport;
        if let Some(url) = &forward.url {
            message.extra.insert("url".to_string(), Value::String(url.clone()));
        }
        info!(target = %forward.target_id, call_no = %forward.call_no, "forwarding stream");
        self.send(&message)
    }
}
