//! Connection, presence, relayed message and monitor acknowledgements

use serde_json::Value;
use tracing::{debug, error, info, warn};

use rdispatch_signal_core::{ChildMessageType, DecodedMessage, MonitorOperation, NotifyType, OnlineState};

use crate::adapters::MediaCommand;
use crate::events::Event;
use crate::types::{CallOperation, MemberStatus, SessionKey};

use super::DispatchContext;

pub(super) fn on_connect_ack(_ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let envelope = &msg.envelope;
    if envelope.is_success() {
        info!(uid = %envelope.uid, "signaling session registered");
    } else {
        error!(code = %envelope.ack_code(), "signaling registration refused");
    }
}

pub(super) fn on_disconnect_ack(_ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    info!(code = ?msg.envelope.code, "signaling session closed by server");
}

fn monitor_key(ctx: &DispatchContext<'_>) -> SessionKey {
    SessionKey::new(ctx.store.monitor_room_id())
}

/// Marks a monitored terminal as gone, if it is in the monitoring room.
fn monitor_member_quit(ctx: &mut DispatchContext<'_>, member_id: &str) {
    let key = monitor_key(ctx);
    let updated = ctx
        .store
        .with_session_mut(&key, |s| {
            s.roster.contains(member_id) && s.roster.update_status(member_id, MemberStatus::Quit)
        })
        .unwrap_or(false);
    if updated {
        info!(session_key = %key, member = member_id, "monitored terminal quit");
        ctx.emit_roster(&key, CallOperation::MemberUpdated);
    }
}

pub(super) fn on_notify_web(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let envelope = &msg.envelope;
    match envelope.notify_type() {
        Some(NotifyType::OnlineState) => {
            let Some(state) = envelope.online_state else {
                debug!(uid = %envelope.uid, "online state notification without a state");
                return;
            };
            ctx.emit(Event::TerminalStatus { user_id: envelope.uid.clone(), state });
            if state == OnlineState::Offline {
                monitor_member_quit(ctx, &envelope.uid);
            }
        }
        Some(NotifyType::GroupActive) => {
            ctx.emit(Event::GroupActivity { room_id: envelope.room_id.clone() });
        }
        None => debug!(op_type = %envelope.op_type, "unknown notification"),
    }
}

/// Relayed `message`: stream start answers from monitored terminals are
/// consumed here, anything else goes to the host verbatim.
pub(super) fn on_message(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let control = msg.control();
    if control.child_msg_type == Some(ChildMessageType::StreamStartResponse) {
        if control.result.as_deref() != Some("0") {
            warn!(terminal = %control.src_id, result = ?control.result, "terminal refused to stream");
            monitor_member_quit(ctx, &control.src_id);
        }
        return;
    }
    let content = msg.payload.clone().unwrap_or(Value::Null);
    ctx.emit(Event::CustomMessage { content });
}

pub(super) fn on_monitor_ack(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let envelope = &msg.envelope;
    if !envelope.is_success() {
        warn!(code = %envelope.ack_code(), op_type = %envelope.op_type, "monitor voice request refused");
        return;
    }
    if envelope.monitor_operation() == Some(MonitorOperation::PublishVoice) {
        let key = monitor_key(ctx);
        ctx.queue_media(MediaCommand::SetLocalAudioMuted { session_key: key, muted: false });
    }
}
