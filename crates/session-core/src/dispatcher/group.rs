//! Group roster and floor-control signals

use tracing::{debug, info, warn};

use rdispatch_signal_core::{DecodedMessage, GroupOperation};

use crate::adapters::MediaCommand;
use crate::floor::{self, FloorOutcome};
use crate::roster::JoinOutcome;
use crate::types::{CallOperation, MemberId, MemberStatus, SessionKey};

use super::{existing_room_key, DispatchContext};

/// Listing ids may carry a `_<suffix>`; the member id is the part before it.
fn member_ids(raw: &[String]) -> Vec<MemberId> {
    raw.iter()
        .map(|id| id.split('_').next().unwrap_or(id).to_string())
        .collect()
}

fn group_key(ctx: &DispatchContext<'_>, msg: &DecodedMessage) -> Option<SessionKey> {
    let key = existing_room_key(ctx, msg)?;
    let is_group = ctx.store.with_session(&key, |s| s.call_type.is_group())?;
    if is_group {
        Some(key)
    } else {
        debug!(signal = %msg.signal, session_key = %key, "group signal for two-party call");
        None
    }
}

pub(super) fn on_update_opt(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let envelope = &msg.envelope;
    let Some(operation) = envelope.group_operation() else {
        debug!(op_type = %envelope.op_type, "unknown updateopt type");
        return;
    };
    let Some(key) = existing_room_key(ctx, msg) else { return };

    match operation {
        GroupOperation::Query => {
            let total = member_ids(&envelope.total_member_list);
            let online = member_ids(&envelope.online_member_list);
            debug!(session_key = %key, total = total.len(), online = online.len(), "member listing");
            ctx.store.with_session_mut(&key, |s| s.roster.reconcile(&total, &online));
            ctx.emit_roster(&key, CallOperation::MemberUpdated);
        }
        GroupOperation::Delete => {
            info!(session_key = %key, members = ?envelope.member_list, "members removed by server");
            ctx.emit_operation(&key, CallOperation::MemberKicked, None);
        }
        GroupOperation::Mute | GroupOperation::Unmute => {
            let muted = operation == GroupOperation::Mute;
            let user_id = ctx.local_user_id().to_string();
            ctx.store.with_session_mut(&key, |s| s.roster.update_mute(&user_id, muted));
            ctx.emit_roster(&key, CallOperation::MemberUpdated);
            ctx.queue_media(MediaCommand::SetLocalAudioMuted { session_key: key, muted });
        }
        GroupOperation::Online | GroupOperation::Add => {
            info!(session_key = %key, %operation, members = ?envelope.member_list, "group update");
        }
        other => debug!(session_key = %key, operation = %other, "ignoring updateopt"),
    }
}

pub(super) fn on_join_state(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let envelope = &msg.envelope;
    let Some(key) = group_key(ctx, msg) else { return };
    let Some(status) = envelope.result.as_deref().and_then(MemberStatus::from_join_result) else {
        debug!(session_key = %key, result = ?envelope.result, "unknown join state");
        return;
    };

    let member_id = envelope.from_user_id.clone();
    let outcome = ctx.store.with_session_mut(&key, |s| {
        s.roster.apply_join_state(&member_id, &envelope.from_user_name, status)
    });
    match outcome {
        Some(JoinOutcome::Added) => ctx.emit_roster(&key, CallOperation::MemberAccepted),
        Some(JoinOutcome::Updated) => ctx.emit_roster(&key, CallOperation::MemberUpdated),
        _ => return,
    }

    if status == MemberStatus::Quit {
        info!(session_key = %key, member = %member_id, "member quit");
        ctx.store.with_session_mut(&key, |s| s.roster.remove_members(&[member_id]));
    }
}

/// `unmute`: the server gave the floor to `fromUserId`.
pub(super) fn on_grab_confirmed(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let Some(key) = group_key(ctx, msg) else { return };
    let requester = msg.envelope.from_user_id.clone();
    let Some(outcome) = ctx.store.with_session_mut(&key, |s| floor::confirm_grab(s, &requester)) else {
        return;
    };
    if outcome == FloorOutcome::Unchanged {
        return;
    }

    ctx.emit_roster(&key, CallOperation::MemberUpdated);
    ctx.emit_operation(&key, CallOperation::GrabSucceeded, None);
    if requester == ctx.local_user_id() {
        ctx.queue_media(MediaCommand::SetLocalAudioMuted { session_key: key, muted: false });
    }
}

/// `mute`: `fromUserId` released the floor.
pub(super) fn on_free_confirmed(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let Some(key) = group_key(ctx, msg) else { return };
    let releaser = msg.envelope.from_user_id.clone();
    let Some(outcome) = ctx.store.with_session_mut(&key, |s| floor::confirm_free(s, &releaser)) else {
        return;
    };
    if let FloorOutcome::Released { floor_freed: false, .. } = outcome {
        warn!(session_key = %key, releaser = %releaser, "release from a member not holding the floor");
    }

    ctx.emit_roster(&key, CallOperation::MemberUpdated);
    ctx.emit_operation(&key, CallOperation::FreeSucceeded, None);
    if releaser == ctx.local_user_id() {
        ctx.queue_media(MediaCommand::SetLocalAudioMuted { session_key: key, muted: true });
    }
}

/// `graback` only ever reports a refusal.
pub(super) fn on_grab_refused(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let Some(key) = group_key(ctx, msg) else { return };
    let error = floor::grab_refused(&msg.envelope.ack_code());
    warn!(session_key = %key, "grab refused: {}", error);
    ctx.emit_operation(&key, CallOperation::GrabFailed, Some(error));
}

/// `freeack` only ever reports a refusal.
pub(super) fn on_free_refused(ctx: &mut DispatchContext<'_>, msg: &DecodedMessage) {
    let Some(key) = group_key(ctx, msg) else { return };
    let error = floor::free_refused(&msg.envelope.ack_code());
    warn!(session_key = %key, "release refused: {}", error);
    ctx.emit_operation(&key, CallOperation::FreeFailed, Some(error));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_ids_strip_suffix() {
        let raw = vec!["1001_web".to_string(), "2002".to_string(), "3003_1_x".to_string()];
        assert_eq!(member_ids(&raw), vec!["1001", "2002", "3003"]);
    }
}
