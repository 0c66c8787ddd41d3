//! # Signaling Dispatcher
//!
//! Routes every decoded frame to its handler. The routing table is the
//! `match` in [`dispatch`], so adding a signal to [`SignalType`] does not
//! compile until it is routed here.
//!
//! Handlers never fail and never perform I/O: they mutate sessions through
//! the [`DispatchContext`], emit events, and queue frames and media commands
//! that the engine flushes afterwards. Frames about sessions that no longer
//! exist are logged and dropped.

mod call;
mod context;
mod group;
mod media;
mod notify;

pub use context::DispatchContext;
pub use media::dispatch_media;

use tracing::debug;

use rdispatch_signal_core::{DecodedMessage, Envelope, SignalType};

use crate::types::SessionKey;

pub type Handler = fn(&mut DispatchContext<'_>, &DecodedMessage);

/// Handler for a signal.
pub fn handler_for(signal: SignalType) -> Handler {
    match signal {
        SignalType::ConnectAck => notify::on_connect_ack,
        SignalType::DisconnectAck => notify::on_disconnect_ack,
        SignalType::CreateAck => call::on_create_ack,
        SignalType::NewPeer => call::on_new_peer,
        SignalType::OfferAck => call::on_offer_ack,
        SignalType::Answer => call::on_answer,
        SignalType::Publish => call::on_publish,
        SignalType::Reject => call::on_reject,
        SignalType::Accept => call::on_accept,
        SignalType::Leave | SignalType::Cancel => call::on_leave,
        SignalType::Destroy => call::on_destroy,
        SignalType::UpdateOpt => group::on_update_opt,
        SignalType::JoinState => group::on_join_state,
        SignalType::Unmute => group::on_grab_confirmed,
        SignalType::GrabAck => group::on_grab_refused,
        SignalType::Mute => group::on_free_confirmed,
        SignalType::FreeAck => group::on_free_refused,
        SignalType::NotifyWeb => notify::on_notify_web,
        SignalType::Message => notify::on_message,
        SignalType::MonitorAck => notify::on_monitor_ack,
        SignalType::Ring
        | SignalType::LeaveAck
        | SignalType::Connect
        | SignalType::Disconnect
        | SignalType::Create
        | SignalType::Offer
        | SignalType::JoinFinish
        | SignalType::Grab
        | SignalType::Free
        | SignalType::Monitor
        | SignalType::CallOpt
        | SignalType::GroupOpt => ignore,
    }
}

/// Route one decoded frame.
pub fn dispatch(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    debug!(signal = %msg.signal, room_id = %msg.envelope.room_id, "dispatching");
    handler_for(msg.signal)(ctx, msg);
}

fn ignore(_ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    debug!(signal = %msg.signal, "ignoring signal");
}

/// Inbound frames name their session by room id.
fn room_key(ctx: &DispatchContext<'_>, envelope: &Envelope) -> Option<SessionKey> {
    ctx.encoder.assigned_room_id(envelope).map(SessionKey::new)
}

/// Looks up the session a frame is about, logging when it is missing.
fn existing_room_key(ctx: &DispatchContext<'_>, msg: &DecodedMessage) -> Option<SessionKey> {
    let key = room_key(ctx, &msg.envelope)?;
    if ctx.store.contains(&key) {
        Some(key)
    } else {
        debug!(signal = %msg.signal, session_key = %key, "no session for frame");
        None
    }
}
