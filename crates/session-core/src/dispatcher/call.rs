//! Call setup and teardown signals

use tracing::{debug, error, info, warn};

use rdispatch_signal_core::{CallType, DecodedMessage, Envelope};

use crate::adapters::MediaCommand;
use crate::roster::{JoinOutcome, Member};
use crate::session::{ringing_key, CallSession};
use crate::state_table::{StateEvent, Topology};
use crate::types::{CallOperation, ErrorInfo, MemberStatus, SessionKey};

use super::{existing_room_key, room_key, DispatchContext};

/// Local call type of a frame, from its raw type and media flag.
fn local_call_type(envelope: &Envelope) -> Option<CallType> {
    envelope
        .call_type
        .and_then(|raw| CallType::from_raw(raw, envelope.audio_only))
}

/// Key of an outgoing call the server is answering about: the room if the
/// session already lives there, else its ringing key.
fn outgoing_key(ctx: &DispatchContext<'_>, envelope: &Envelope) -> Option<SessionKey> {
    if let Some(key) = room_key(ctx, envelope) {
        if ctx.store.contains(&key) {
            return Some(key);
        }
    }
    let call_type = local_call_type(envelope)?;
    let key = ringing_key(call_type, &envelope.from_user_id, &envelope.to_user_id);
    ctx.store.contains(&key).then_some(key)
}

pub(super) fn on_create_ack(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let envelope = &msg.envelope;
    if envelope.is_success() {
        debug!(room_id = %envelope.room_id, "create acknowledged");
        return;
    }

    let code = envelope.ack_code();
    error!(code = %code, "call creation failed: {}", code.message());
    let Some(key) = outgoing_key(ctx, envelope) else {
        warn!("create failure for unknown session");
        return;
    };
    ctx.drive(&key, StateEvent::CreateFailed, Some(ErrorInfo::from(&code)));
}

pub(super) fn on_new_peer(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    if msg.envelope.is_call_out() {
        call_out(ctx, &msg.envelope);
    } else {
        call_in(ctx, &msg.envelope);
    }
}

/// Our own call was set up; the server assigned its room.
fn call_out(ctx: &mut DispatchContext<'_>, envelope: &Envelope) {
    let Some(key) = outgoing_key(ctx, envelope) else {
        warn!(room_id = %envelope.room_id, "newpeer for unknown outgoing call");
        return;
    };

    if !envelope.is_success() {
        let code = envelope.ack_code();
        error!(session_key = %key, code = %code, "outgoing call refused: {}", code.message());
        ctx.drive(&key, StateEvent::CreateFailed, Some(ErrorInfo::from(&code)));
        return;
    }

    let Some(room_id) = ctx.encoder.assigned_room_id(envelope) else {
        warn!(session_key = %key, "newpeer without a room id");
        return;
    };
    ctx.store.with_session_mut(&key, |s| s.room_id = Some(room_id.to_string()));
    if let Some(new_key) = ctx.drive(&key, StateEvent::RoomAssigned, None) {
        info!(from = %key, to = %new_key, "outgoing call has its room");
    }
}

/// Someone is calling us.
fn call_in(ctx: &mut DispatchContext<'_>, envelope: &Envelope) {
    let Some(call_type) = local_call_type(envelope) else {
        warn!(call_type = ?envelope.call_type, audio_only = %envelope.audio_only, "incoming call of unknown type");
        return;
    };
    let Some(room_id) = ctx.encoder.assigned_room_id(envelope) else {
        warn!("incoming call without a room id");
        return;
    };
    let key = SessionKey::new(room_id);
    if ctx.store.contains(&key) {
        debug!(session_key = %key, "duplicate newpeer");
        return;
    }

    let mut session = CallSession::incoming(
        call_type,
        room_id,
        (envelope.from_user_id.as_str(), envelope.from_user_name.as_str()),
        (envelope.to_user_id.as_str(), envelope.to_user_name.as_str()),
    )
    .with_conference_record(envelope.conference_record);

    if call_type.is_conference() || call_type.is_ptt() {
        let identity = ctx.encoder.identity();
        session = session.with_members(vec![
            Member::new(envelope.from_user_id.as_str(), envelope.from_user_name.as_str(), MemberStatus::Joined)
                .with_host(true),
            Member::new(identity.user_id.as_str(), identity.user_name.as_str(), MemberStatus::Calling),
        ]);
    }

    info!(session_key = %key, call_type = %call_type, from = %envelope.from_user_id, "incoming call");
    let (key, _) = ctx.store.insert(session);
    ctx.drive(&key, StateEvent::CallOffered, None);
}

pub(super) fn on_offer_ack(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let envelope = &msg.envelope;
    if envelope.is_success() {
        debug!(room_id = %envelope.room_id, "offer accepted");
        return;
    }
    let Some(key) = existing_room_key(ctx, msg) else { return };
    let error = ErrorInfo::from(&envelope.ack_code());
    error!(session_key = %key, "media negotiation failed: {}", error);
    ctx.emit_operation(&key, CallOperation::SdpFailed, Some(error.clone()));
    ctx.drive(&key, StateEvent::NegotiationFailed, Some(error));
}

/// SDP answer for a PTT or broadcast sender.
pub(super) fn on_answer(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let envelope = &msg.envelope;
    let Some(key) = existing_room_key(ctx, msg) else { return };
    if !envelope.is_success() {
        warn!(session_key = %key, code = %envelope.ack_code(), "answer refused");
        return;
    }
    ctx.queue_media(MediaCommand::SetRemoteDescription {
        session_key: key.clone(),
        sdp: envelope.sdp.clone(),
    });
    ctx.drive(&key, StateEvent::AnswerConfirmed, None);
}

/// Remote streams are available in the room.
pub(super) fn on_publish(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let Some(key) = existing_room_key(ctx, msg) else { return };
    ctx.queue_media(MediaCommand::Subscribe {
        session_key: key.clone(),
        room_id: msg.envelope.room_id.clone(),
    });
}

pub(super) fn on_reject(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let Some(key) = existing_room_key(ctx, msg) else { return };
    let Some(call_type) = ctx.store.with_session(&key, |s| s.call_type) else { return };
    let member_id = msg.envelope.from_user_id.clone();

    if call_type.is_conference() {
        info!(session_key = %key, member = %member_id, "conference member refused");
        ctx.store.with_session_mut(&key, |s| s.roster.remove_members(&[member_id]));
        ctx.emit_roster(&key, CallOperation::MemberRefused);
    } else if call_type.is_group() {
        ctx.store.with_session_mut(&key, |s| s.roster.update_status(&member_id, MemberStatus::Rejected));
        ctx.emit_roster(&key, CallOperation::MemberRefused);
    } else {
        ctx.drive(&key, StateEvent::PeerRejected, None);
    }
}

pub(super) fn on_accept(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let envelope = &msg.envelope;
    let Some(key) = existing_room_key(ctx, msg) else { return };
    let Some(key) = ctx.drive(&key, StateEvent::PeerAccepted, None) else { return };

    let is_conference = ctx.store.with_session(&key, |s| s.call_type.is_conference()).unwrap_or(false);
    if !is_conference {
        return;
    }
    let outcome = ctx.store.with_session_mut(&key, |s| {
        s.roster
            .apply_join_state(&envelope.from_user_id, &envelope.from_user_name, MemberStatus::Joined)
    });
    match outcome {
        Some(JoinOutcome::Added) => ctx.emit_roster(&key, CallOperation::MemberAccepted),
        Some(JoinOutcome::Updated) => ctx.emit_roster(&key, CallOperation::MemberUpdated),
        _ => {}
    }
}

/// `leave` and `cancel`: the other party of a two-party call hung up.
pub(super) fn on_leave(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let Some(key) = existing_room_key(ctx, msg) else { return };
    let Some(call_type) = ctx.store.with_session(&key, |s| s.call_type) else { return };
    if !Topology::of(call_type).is_two_party() {
        debug!(session_key = %key, "member left group, waiting for joinstate");
        return;
    }
    ctx.drive(&key, StateEvent::PeerLeft, None);
}

pub(super) fn on_destroy(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let Some(key) = existing_room_key(ctx, msg) else { return };
    info!(session_key = %key, "room destroyed by peer");
    ctx.drive(&key, StateEvent::PeerDestroyed, None);
}
