//! The session engine
//!
//! [`SessionEngine`] owns the session store and is the only thing that
//! mutates it. Inbound frames, media results and host requests all go
//! through `&mut self`, so there is no locking around sessions. Every entry
//! point runs one dispatch step and then flushes the frames and media
//! commands the step queued.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use rdispatch_signal_core::{decode, encode, CallOperationKind, DecodedMessage, RequestEncoder};

use crate::adapters::{MediaCommand, MediaEvent, MediaTransport, SignalTransport, TransportEvent};
use crate::api::request::{CallRequest, MemberTarget};
use crate::config::SessionConfig;
use crate::dispatcher::{self, DispatchContext};
use crate::errors::{Result, SessionError};
use crate::events::{Event, EventCategory, EventEmitter};
use crate::roster::Member;
use crate::session::CallSession;
use crate::session_store::{SessionStore, StoreStats};
use crate::state_machine::StateMachine;
use crate::state_table::StateEvent;
use crate::types::{CallOperation, CallStatistics, CallType, MemberId, MemberStatus, SessionKey};

/// Frames and media commands produced by one dispatch step
pub(crate) type Effects = (Vec<String>, Vec<MediaCommand>);

/// Client-side core of the dispatch protocol
pub struct SessionEngine {
    pub(crate) config: SessionConfig,
    pub(crate) store: SessionStore,
    emitter: EventEmitter,
    pub(crate) encoder: RequestEncoder,
    machine: StateMachine,
    signal: Arc<dyn SignalTransport>,
    media: Arc<dyn MediaTransport>,
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("user_id", &self.config.user_id)
            .field("sessions", &self.store.len())
            .finish()
    }
}

impl SessionEngine {
    /// Create an engine for the configured user.
    pub fn new(
        config: SessionConfig,
        signal: Arc<dyn SignalTransport>,
        media: Arc<dyn MediaTransport>,
    ) -> Result<Self> {
        config.validate()?;
        info!(user_id = %config.user_id, monitor_room = %config.monitor_room_id, "creating session engine");
        Ok(Self {
            store: SessionStore::new(config.monitor_room_id.clone()),
            emitter: EventEmitter::new(),
            encoder: RequestEncoder::new(config.identity(), config.clock())
                .with_placeholder_room_id(config.placeholder_room_id.clone()),
            machine: StateMachine::default(),
            signal,
            media,
            config,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    /// Register the callback for a category, replacing any previous one.
    pub fn on<F>(&self, category: EventCategory, callback: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.emitter.on(category, callback);
    }

    pub fn off(&self, category: EventCategory) {
        self.emitter.off(category);
    }

    // ===== Dispatch plumbing =====

    pub(crate) fn step<R>(&mut self, f: impl FnOnce(&mut DispatchContext<'_>) -> R) -> (R, Effects) {
        let mut ctx = DispatchContext::new(&mut self.store, &self.emitter, &self.encoder, &self.machine);
        let out = f(&mut ctx);
        (out, ctx.into_effects())
    }

    /// Sends queued frames and runs queued media commands. Every frame is
    /// attempted; the first send failure is returned.
    pub(crate) fn flush(&self, (frames, commands): Effects) -> Result<()> {
        let mut first_error = None;
        for frame in &frames {
            debug!(frame = %frame, "sending frame");
            if let Err(e) = self.signal.send(frame) {
                error!("failed to send frame: {}", e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        for command in &commands {
            command.execute(self.media.as_ref());
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Flush on behalf of a session; a failed send is also reported as a
    /// `SocketError` operation.
    pub(crate) fn flush_for(&self, key: &SessionKey, effects: Effects) -> Result<()> {
        self.flush(effects).inspect_err(|e| {
            self.emitter.emit(Event::CallOperation {
                session_key: key.clone(),
                operation: CallOperation::SocketError,
                result: Some(crate::types::ErrorInfo::new("socket", e.to_string())),
            });
        })
    }

    fn flush_logged(&self, effects: Effects) {
        if let Err(e) = self.flush(effects) {
            self.emitter.emit(Event::ErrorOccurred { message: e.to_string() });
        }
    }

    /// Encode and send one frame outside any session.
    pub(crate) fn send<T: Serialize>(&self, message: &T) -> Result<()> {
        let frame = encode(message)?;
        debug!(frame = %frame, "sending frame");
        self.signal.send(&frame)?;
        Ok(())
    }

    pub(crate) fn require(&self, key: &SessionKey) -> Result<CallSession> {
        self.store
            .get(key)
            .ok_or_else(|| SessionError::session_not_found(key.as_str()))
    }

    /// Session for a local teardown. A missing session means the call
    /// already ended, so callers treat it as done.
    fn existing(&self, key: &SessionKey, operation: &str) -> Option<CallSession> {
        let session = self.store.get(key);
        if session.is_none() {
            debug!(session_key = %key, operation, "no session, nothing to tear down");
        }
        session
    }

    fn require_group(&self, key: &SessionKey) -> Result<CallSession> {
        let session = self.require(key)?;
        if !session.call_type.is_group() {
            return Err(SessionError::invalid_state(format!(
                "{} is a {} call, not a group",
                key, session.call_type
            )));
        }
        Ok(session)
    }

    fn require_ptt(&self, key: &SessionKey) -> Result<CallSession> {
        let session = self.require(key)?;
        if !session.call_type.is_ptt() {
            return Err(SessionError::invalid_state(format!("{} has no floor control", key)));
        }
        Ok(session)
    }

    // ===== Inbound =====

    /// Feed a connection event from the signaling transport.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => {
                info!("signaling connection opened");
                self.emitter.emit(Event::Connected);
            }
            TransportEvent::Closed => {
                info!("signaling connection closed");
                self.emitter.emit(Event::Disconnected { reason: None });
            }
            TransportEvent::Error(reason) => {
                warn!(reason = %reason, "signaling connection failed");
                self.emitter.emit(Event::Disconnected { reason: Some(reason) });
            }
            TransportEvent::Message(frame) => {
                if let Err(e) = self.handle_frame(&frame) {
                    warn!("dropping undecodable frame: {}", e);
                    self.emitter.emit(Event::ErrorOccurred { message: e.to_string() });
                }
            }
        }
    }

    /// Decode and dispatch one text frame. Only decoding can fail.
    pub fn handle_frame(&mut self, frame: &str) -> Result<()> {
        let msg = decode(frame)?;
        self.handle_message(&msg);
        Ok(())
    }

    pub fn handle_message(&mut self, msg: &DecodedMessage) {
        let ((), effects) = self.step(|ctx| dispatcher::dispatch(ctx, msg));
        self.flush_logged(effects);
    }

    /// Feed a result from the media layer.
    pub fn handle_media_event(&mut self, key: &SessionKey, event: MediaEvent) {
        let ((), effects) = self.step(|ctx| dispatcher::dispatch_media(ctx, key, event));
        self.flush_logged(effects);
    }

    // ===== Call lifecycle =====

    /// Start an outgoing call, conference, PTT or broadcast.
    ///
    /// The session is stored under its ringing key and moves to the room id
    /// once the server answers with `newpeer`.
    pub fn create(&mut self, request: CallRequest) -> Result<SessionKey> {
        if request.call_type == CallType::VideoMonitor {
            return Err(SessionError::invalid_request(
                "the monitoring room is opened with add_monitor_members",
            ));
        }

        let identity = self.encoder.identity().clone();
        let mut session = CallSession::outgoing(
            request.call_type,
            (identity.user_id.as_str(), identity.user_name.as_str()),
            request.to_id.clone(),
            request.to_name.clone(),
        )
        .with_conference_record(request.conference_record);
        if let Some(room_id) = &request.room_id {
            session = session.with_room_id(room_id.clone());
        }
        if request.call_type.is_group() {
            let mut members = vec![
                Member::new(identity.user_id.as_str(), identity.user_name.as_str(), MemberStatus::Joined)
                    .with_host(true),
            ];
            members.extend(
                request
                    .members
                    .iter()
                    .filter(|m| m.id != identity.user_id)
                    .map(MemberTarget::calling),
            );
            session = session.with_members(members);
        }

        let key = self.store.key_for(&session);
        if self.store.contains(&key) {
            return Err(SessionError::invalid_state(format!("a call is already in progress under {}", key)));
        }
        let envelope = self.encoder.create(&session.context(), &request.member_ids())?;

        info!(session_key = %key, call_type = %request.call_type, to = %request.to_id, "placing call");
        let (key, effects) = self.step(|ctx| {
            let (key, _) = ctx.store.insert(session);
            ctx.queue_envelope(envelope);
            ctx.drive(&key, StateEvent::CreateSucceeded, None);
            key
        });
        if let Err(e) = self.flush_for(&key, effects) {
            self.store.delete(&key);
            return Err(e);
        }
        Ok(key)
    }

    /// Answer an incoming call.
    pub fn accept_call(&mut self, key: &SessionKey) -> Result<()> {
        let session = self.require(key)?;
        if !session.is_incoming() {
            return Err(SessionError::invalid_state(format!("{} is not an incoming call", key)));
        }
        let room_id = session.room_id.clone().unwrap_or_default();
        let call = session.context();

        info!(session_key = %key, call_type = %session.call_type, "accepting call");
        let ((), effects) = self.step(|ctx| {
            let media = if session.call_type.is_ptt() {
                MediaCommand::Publish { session_key: key.clone(), room_id }
            } else {
                MediaCommand::JoinRoom { session_key: key.clone(), room_id }
            };
            ctx.queue_media(media);
            let accept = ctx.encoder.accept(&call);
            ctx.queue_envelope(accept);
            if session.call_type.is_conference() || session.call_type.is_ptt() {
                let query = ctx.encoder.query_members(&call);
                ctx.queue_envelope(query);
            }
        });
        self.flush_for(key, effects)
    }

    /// Decline an incoming call. The session is dropped without an event;
    /// declining a call that is already gone does nothing.
    pub fn reject_call(&mut self, key: &SessionKey) -> Result<()> {
        let Some(session) = self.existing(key, "reject") else {
            return Ok(());
        };
        info!(session_key = %key, "rejecting call");
        let ((), effects) = self.step(|ctx| {
            let reject = ctx.encoder.reject(&session.context());
            ctx.queue_envelope(reject);
            ctx.store.delete(key);
        });
        self.flush_for(key, effects)
    }

    /// Hang up our side. The session is dropped without an event. Hanging up
    /// a call the server already ended does nothing.
    pub fn leave_call(&mut self, key: &SessionKey) -> Result<()> {
        let Some(session) = self.existing(key, "leave") else {
            return Ok(());
        };
        info!(session_key = %key, "leaving call");
        let ((), effects) = self.step(|ctx| {
            let leave = ctx.encoder.leave(&session.context());
            ctx.queue_envelope(leave);
            ctx.queue_media(MediaCommand::Leave { session_key: key.clone() });
            if session.call_type.is_ptt() {
                ctx.queue_media(MediaCommand::CloseSend { session_key: key.clone() });
            }
            ctx.store.delete(key);
        });
        self.flush_for(key, effects)
    }

    /// Tear the room down for everyone. The session is dropped without an event.
    pub fn destroy_call(&mut self, key: &SessionKey) -> Result<()> {
        let Some(session) = self.existing(key, "destroy") else {
            return Ok(());
        };
        info!(session_key = %key, "destroying call");
        let call = session.context();
        let ((), effects) = self.step(|ctx| {
            if session.call_type.is_ptt() {
                let free = ctx.encoder.free(&call);
                ctx.queue_envelope(free);
            }
            let destroy = ctx.encoder.destroy(&call);
            ctx.queue_envelope(destroy);
            ctx.queue_media(MediaCommand::Leave { session_key: key.clone() });
            if session.call_type.is_ptt() || session.call_type == CallType::Broadcast {
                ctx.queue_media(MediaCommand::CloseSend { session_key: key.clone() });
            }
            ctx.store.delete(key);
        });
        self.flush_for(key, effects)
    }

    /// Send the local SDP offer for a session's outbound media.
    pub fn send_offer(&mut self, key: &SessionKey, sdp: &str, peer_id: &str) -> Result<()> {
        let session = self.require(key)?;
        self.send(&self.encoder.offer(&session.context(), sdp, peer_id))
    }

    /// Break into a user's ongoing call.
    pub fn force_break(&mut self, target_id: &str, target_name: &str) -> Result<()> {
        info!(target = target_id, "forcing call break");
        self.send(&self.encoder.force(CallOperationKind::ForceBreak, target_id, target_name))
    }

    /// Ask the server to close the signaling session.
    pub fn disconnect(&mut self) -> Result<()> {
        self.send(&self.encoder.disconnect())
    }

    // ===== Floor control =====

    /// Request the floor. Nothing changes until the server confirms.
    pub fn grab_speak(&mut self, key: &SessionKey) -> Result<()> {
        let session = self.require_ptt(key)?;
        debug!(session_key = %key, "requesting floor");
        self.send(&self.encoder.grab(&session.context()))
    }

    /// Release the floor. Nothing changes until the server confirms.
    pub fn free_speak(&mut self, key: &SessionKey) -> Result<()> {
        let session = self.require_ptt(key)?;
        debug!(session_key = %key, "releasing floor");
        self.send(&self.encoder.free(&session.context()))
    }

    // ===== Group members =====

    /// Invite members; they are listed as Calling right away.
    pub fn invite_members(&mut self, key: &SessionKey, targets: Vec<MemberTarget>) -> Result<()> {
        let session = self.require_group(key)?;
        let ids: Vec<MemberId> = targets.iter().map(|t| t.id.clone()).collect();
        let ((), effects) = self.step(|ctx| {
            let members = targets.iter().map(MemberTarget::calling).collect();
            ctx.store.with_session_mut(key, |s| s.roster.reinvite(members));
            ctx.emit_roster(key, CallOperation::AddSucceeded);
            let invite = ctx.encoder.invite(&session.context(), ids);
            ctx.queue_envelope(invite);
        });
        self.flush_for(key, effects)
    }

    /// Ask the server to remove members. The roster changes when it reports back.
    pub fn kick_members(&mut self, key: &SessionKey, member_ids: Vec<MemberId>) -> Result<()> {
        let session = self.require_group(key)?;
        self.send(&self.encoder.kick(&session.context(), member_ids))
    }

    pub fn mute_member(&mut self, key: &SessionKey, member_id: &str) -> Result<()> {
        self.set_member_muted(key, member_id, true)
    }

    pub fn unmute_member(&mut self, key: &SessionKey, member_id: &str) -> Result<()> {
        self.set_member_muted(key, member_id, false)
    }

    fn set_member_muted(&mut self, key: &SessionKey, member_id: &str, muted: bool) -> Result<()> {
        let session = self.require_group(key)?;
        let name = session
            .roster
            .member(member_id)
            .map(|m| m.name.clone())
            .unwrap_or_default();
        let ((), effects) = self.step(|ctx| {
            ctx.store.with_session_mut(key, |s| s.roster.update_mute(member_id, muted));
            ctx.emit_roster(key, CallOperation::MuteSucceeded);
            let envelope = if muted {
                ctx.encoder.mute_member(&session.context(), member_id, &name)
            } else {
                ctx.encoder.unmute_member(&session.context(), member_id, &name)
            };
            ctx.queue_envelope(envelope);
        });
        self.flush_for(key, effects)
    }

    pub fn query_members(&mut self, key: &SessionKey) -> Result<()> {
        let session = self.require_group(key)?;
        self.send(&self.encoder.query_members(&session.context()))
    }

    // ===== PTT groups =====

    /// Join an active PTT group by inviting ourselves into its room.
    pub fn join_ptt(&mut self, call_type: CallType, room_id: &str) -> Result<()> {
        let user_id = self.config.user_id.clone();
        self.invite_ptt_member(call_type, room_id, &user_id)
    }

    pub fn invite_ptt_member(&mut self, call_type: CallType, room_id: &str, target: &str) -> Result<()> {
        if !call_type.is_ptt() {
            return Err(SessionError::invalid_request(format!("{} is not a PTT call type", call_type)));
        }
        self.send(&self.encoder.invite_ptt(call_type, room_id, target))
    }

    pub fn kick_ptt_member(&mut self, call_type: CallType, room_id: &str, target: &str) -> Result<()> {
        if !call_type.is_ptt() {
            return Err(SessionError::invalid_request(format!("{} is not a PTT call type", call_type)));
        }
        self.send(&self.encoder.kick_ptt(call_type, room_id, target))
    }

    pub fn add_ptt_group(&mut self, key: &SessionKey, member_ids: Vec<MemberId>) -> Result<()> {
        let session = self.require_ptt(key)?;
        self.send(&self.encoder.add_group(&session.context(), member_ids))
    }

    pub fn delete_ptt_group(&mut self, key: &SessionKey, member_ids: Vec<MemberId>) -> Result<()> {
        let session = self.require_ptt(key)?;
        self.send(&self.encoder.delete_group(&session.context(), member_ids))
    }

    // ===== Reads =====

    /// Snapshot of one session.
    pub fn session(&self, key: &SessionKey) -> Option<CallSession> {
        self.store.get(key)
    }

    pub fn sessions(&self) -> Vec<CallSession> {
        self.store.snapshot_all()
    }

    pub fn statistics(&self) -> CallStatistics {
        self.store.statistics()
    }

    pub fn is_call_exist(&self) -> bool {
        self.store.is_call_exist()
    }

    pub fn store_stats(&self) -> StoreStats {
        self.store.stats()
    }
}
