//! # Outbound Requests
//!
//! One constructor per request the client sends. Each takes the identifiers of
//! the call it concerns ([`CallContext`]) and returns a fully populated frame,
//! so callers never assemble envelopes field by field.
//!
//! ## Routing
//!
//! - `create`, `grab`, `free`, `groupopt`, `callopt`, `joinfinish`, `offer`
//!   are handled by the server (`WsOpToServer`)
//! - `accept`, `reject`, `leave`, `destroy` and `monitor` are relayed to the
//!   peer (`WsOpServerDoToClient`)
//! - kicking and PTT membership changes are pushed to the affected client
//!   (`WsOpToClient`)

use serde_json::Value;

use crate::builder::{EnvelopeBuilder, LocalIdentity, ServerClock};
use crate::error::{CodecError, Result};
use crate::message::{ControlMessage, CustomMessage, Envelope, PLACEHOLDER_ROOM_ID};
use crate::types::{
    CallOperationKind, CallType, ChildMessageType, GroupOperation, HangupReason, MessageKind,
    MonitorOperation, RawCallType, SignalType,
};

/// Identifiers of the call a request refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub call_type: CallType,
    /// Server room id, once assigned
    pub room_id: Option<String>,
    pub from_id: String,
    pub from_name: String,
    pub to_id: String,
    pub to_name: String,
    /// Whether this client is the receiving side
    pub incoming: bool,
    pub conference_record: bool,
}

impl CallContext {
    pub fn new(call_type: CallType, to_id: impl Into<String>, to_name: impl Into<String>) -> Self {
        Self {
            call_type,
            room_id: None,
            from_id: String::new(),
            from_name: String::new(),
            to_id: to_id.into(),
            to_name: to_name.into(),
            incoming: false,
            conference_record: false,
        }
    }

    pub fn with_room_id(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn with_from(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.from_id = id.into();
        self.from_name = name.into();
        self
    }

    pub fn with_incoming(mut self, incoming: bool) -> Self {
        self.incoming = incoming;
        self
    }

    pub fn with_conference_record(mut self, record: bool) -> Self {
        self.conference_record = record;
        self
    }

    /// The party on the other end: the caller when receiving, the callee otherwise.
    pub fn remote_party(&self) -> (&str, &str) {
        if self.incoming {
            (&self.from_id, &self.from_name)
        } else {
            (&self.to_id, &self.to_name)
        }
    }
}

/// Builds outbound frames on behalf of the local user.
#[derive(Debug, Clone)]
pub struct RequestEncoder {
    identity: LocalIdentity,
    clock: ServerClock,
    placeholder_room_id: String,
}

impl RequestEncoder {
    pub fn new(identity: LocalIdentity, clock: ServerClock) -> Self {
        Self { identity, clock, placeholder_room_id: PLACEHOLDER_ROOM_ID.to_string() }
    }

    /// Room id written into frames for calls the server has not placed yet.
    pub fn with_placeholder_room_id(mut self, room_id: impl Into<String>) -> Self {
        self.placeholder_room_id = room_id.into();
        self
    }

    pub fn placeholder_room_id(&self) -> &str {
        &self.placeholder_room_id
    }

    /// Room id of an inbound frame, treating this encoder's placeholder as unassigned.
    pub fn assigned_room_id<'e>(&self, envelope: &'e Envelope) -> Option<&'e str> {
        envelope.room_id_unless(&self.placeholder_room_id)
    }

    pub fn identity(&self) -> &LocalIdentity {
        &self.identity
    }

    pub fn clock(&self) -> &ServerClock {
        &self.clock
    }

    fn builder(&self, sig: SignalType) -> EnvelopeBuilder {
        EnvelopeBuilder::new(sig, &self.identity).room_id(Some(self.placeholder_room_id.as_str()))
    }

    /// Call type, room and callee of `ctx` applied to a fresh builder.
    fn for_call(&self, sig: SignalType, ctx: &CallContext) -> EnvelopeBuilder {
        self.builder(sig)
            .call_type(ctx.call_type)
            .room_id(ctx.room_id.as_deref())
            .to(ctx.to_id.clone(), ctx.to_name.clone())
    }

    /// Member list with the local user appended when absent.
    fn with_self(&self, members: &[String]) -> Vec<String> {
        let mut list = members.to_vec();
        if !list.iter().any(|id| id == &self.identity.user_id) {
            list.push(self.identity.user_id.clone());
        }
        list
    }

    /// Request that starts a call.
    ///
    /// Supervisory calls are started with `callopt`. The monitoring room is
    /// started with control messages and is rejected here.
    pub fn create(&self, ctx: &CallContext, members: &[String]) -> Result<Envelope> {
        let env = match ctx.call_type {
            CallType::Voice | CallType::Video => self
                .builder(SignalType::Create)
                .call_type(ctx.call_type)
                .to(ctx.to_id.clone(), ctx.to_name.clone())
                .build(&self.clock),
            CallType::VoiceConference | CallType::VideoConference => self
                .builder(SignalType::Create)
                .call_type(ctx.call_type)
                .conference_record(ctx.conference_record)
                .members(self.with_self(members))
                .to(ctx.to_id.clone(), ctx.to_name.clone())
                .build(&self.clock),
            CallType::TempPtt | CallType::Broadcast => self
                .builder(SignalType::Create)
                .call_type(ctx.call_type)
                .members(self.with_self(members))
                .to(ctx.to_id.clone(), ctx.to_name.clone())
                .build(&self.clock),
            CallType::Ptt => {
                let group = ctx.room_id.clone().unwrap_or_else(|| ctx.to_id.clone());
                self.builder(SignalType::Create)
                    .call_type(CallType::Ptt)
                    .members(self.with_self(members))
                    .monitor_group(vec![group.clone()])
                    .room_id(Some(group.as_str()))
                    .to(group, ctx.to_name.clone())
                    .need_call()
                    .build(&self.clock)
            }
            CallType::ForceInsert => self.force(CallOperationKind::ForceInsert, &ctx.to_id, &ctx.to_name),
            CallType::ForceMonitor => self.force(CallOperationKind::ForceMonitor, &ctx.to_id, &ctx.to_name),
            CallType::VideoMonitor => {
                return Err(CodecError::invalid_value("create call type", ctx.call_type.as_str()));
            }
        };
        Ok(env)
    }

    /// Supervisory `callopt` against a user's ongoing call.
    pub fn force(&self, kind: CallOperationKind, target_id: &str, target_name: &str) -> Envelope {
        self.builder(SignalType::CallOpt)
            .raw_call_type(RawCallType::Voice)
            .to(target_id, target_name)
            .op(kind)
            .build(&self.clock)
    }

    pub fn accept(&self, ctx: &CallContext) -> Envelope {
        self.for_call(SignalType::Accept, ctx)
            .msg_type(MessageKind::RelayToClient)
            .to(ctx.from_id.clone(), ctx.from_name.clone())
            .build(&self.clock)
    }

    pub fn reject(&self, ctx: &CallContext) -> Envelope {
        self.for_call(SignalType::Reject, ctx)
            .msg_type(MessageKind::RelayToClient)
            .to(ctx.from_id.clone(), ctx.from_name.clone())
            .reason(HangupReason::Busy)
            .build(&self.clock)
    }

    pub fn leave(&self, ctx: &CallContext) -> Envelope {
        let (to_id, to_name) = ctx.remote_party();
        self.for_call(SignalType::Leave, ctx)
            .msg_type(MessageKind::RelayToClient)
            .to(to_id, to_name)
            .reason(HangupReason::HangUp)
            .build(&self.clock)
    }

    pub fn destroy(&self, ctx: &CallContext) -> Envelope {
        self.for_call(SignalType::Destroy, ctx)
            .msg_type(MessageKind::RelayToClient)
            .build(&self.clock)
    }

    pub fn join_finish(&self, ctx: &CallContext) -> Envelope {
        self.for_call(SignalType::JoinFinish, ctx).build(&self.clock)
    }

    pub fn offer(&self, ctx: &CallContext, sdp: &str, peer_id: &str) -> Envelope {
        self.for_call(SignalType::Offer, ctx).sdp(sdp).peer_id(peer_id).build(&self.clock)
    }

    pub fn grab(&self, ctx: &CallContext) -> Envelope {
        self.for_call(SignalType::Grab, ctx).build(&self.clock)
    }

    pub fn free(&self, ctx: &CallContext) -> Envelope {
        self.for_call(SignalType::Free, ctx).build(&self.clock)
    }

    pub fn mute_member(&self, ctx: &CallContext, target_id: &str, target_name: &str) -> Envelope {
        self.for_call(SignalType::GroupOpt, ctx)
            .to(target_id, target_name)
            .op(GroupOperation::Mute)
            .build(&self.clock)
    }

    pub fn unmute_member(&self, ctx: &CallContext, target_id: &str, target_name: &str) -> Envelope {
        self.for_call(SignalType::GroupOpt, ctx)
            .to(target_id, target_name)
            .op(GroupOperation::Unmute)
            .build(&self.clock)
    }

    pub fn invite(&self, ctx: &CallContext, member_ids: Vec<String>) -> Envelope {
        self.for_call(SignalType::GroupOpt, ctx)
            .members(member_ids)
            .op(GroupOperation::Add)
            .build(&self.clock)
    }

    pub fn kick(&self, ctx: &CallContext, member_ids: Vec<String>) -> Envelope {
        self.for_call(SignalType::GroupOpt, ctx)
            .msg_type(MessageKind::ToClient)
            .members(member_ids)
            .op(GroupOperation::Delete)
            .build(&self.clock)
    }

    pub fn query_members(&self, ctx: &CallContext) -> Envelope {
        self.for_call(SignalType::GroupOpt, ctx).op(GroupOperation::Query).build(&self.clock)
    }

    pub fn add_group(&self, ctx: &CallContext, member_ids: Vec<String>) -> Envelope {
        self.for_call(SignalType::GroupOpt, ctx)
            .members(member_ids)
            .op(GroupOperation::AddGroup)
            .build(&self.clock)
    }

    pub fn delete_group(&self, ctx: &CallContext, member_ids: Vec<String>) -> Envelope {
        self.for_call(SignalType::GroupOpt, ctx)
            .members(member_ids)
            .op(GroupOperation::DeleteGroup)
            .build(&self.clock)
    }

    /// Adds `target` to a fixed or temporary PTT group identified by room id.
    pub fn invite_ptt(&self, call_type: CallType, room_id: &str, target: &str) -> Envelope {
        self.ptt_membership(call_type, room_id, target, GroupOperation::Add)
    }

    pub fn kick_ptt(&self, call_type: CallType, room_id: &str, target: &str) -> Envelope {
        self.ptt_membership(call_type, room_id, target, GroupOperation::Delete)
    }

    fn ptt_membership(&self, call_type: CallType, room_id: &str, target: &str, op: GroupOperation) -> Envelope {
        let raw = match call_type {
            CallType::TempPtt => RawCallType::TempPtt,
            _ => RawCallType::Ptt,
        };
        self.builder(SignalType::GroupOpt)
            .raw_call_type(raw)
            .msg_type(MessageKind::ToClient)
            .members(vec![target.to_string()])
            .room_id(Some(room_id))
            .to(target, "")
            .op(op)
            .build(&self.clock)
    }

    pub fn monitor_voice(&self, op: MonitorOperation, target: &str) -> Envelope {
        self.builder(SignalType::Monitor)
            .msg_type(MessageKind::RelayToClient)
            .members(vec![target.to_string()])
            .to(target, "")
            .op(op)
            .build(&self.clock)
    }

    pub fn disconnect(&self) -> Envelope {
        self.builder(SignalType::Disconnect).build(&self.clock)
    }

    /// Remote control command for the terminal `dest_id`.
    pub fn control(&self, child: ChildMessageType, dest_id: &str, devid: &str) -> ControlMessage {
        let mut msg = ControlMessage::new(child, dest_id);
        msg.devid = devid.to_string();
        msg.src_id = self.identity.user_id.clone();
        msg.ts = self.clock.now_ms();
        msg
    }

    pub fn custom(&self, dest_id: &str, content: Value) -> CustomMessage {
        let mut msg = CustomMessage::new(dest_id, content);
        msg.src_id = self.identity.user_id.clone();
        msg.ts = self.clock.now_ms();
        msg
    }
}
