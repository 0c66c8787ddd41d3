//! Media layer results re-entering the core

use tracing::{debug, warn};

use crate::adapters::MediaEvent;
use crate::events::Event;
use crate::roster::{JoinOutcome, Member};
use crate::state_table::{StateEvent, Topology};
use crate::types::{CallOperation, CallType, MemberStatus, ResultCode, SessionKey};

use super::DispatchContext;

/// Apply one media event to the session under `key`.
pub fn dispatch_media(ctx: &mut DispatchContext<'_>, key: &SessionKey, event: MediaEvent) {
    let Some(call_type) = ctx.store.with_session(key, |s| s.call_type) else {
        debug!(session_key = %key, ?event, "media event for unknown session");
        return;
    };
    let topology = Topology::of(call_type);

    match event {
        MediaEvent::Subscribed { member_id, subscription_id } => {
            match member_id {
                Some(id) if !topology.is_two_party() => {
                    ctx.store.with_session_mut(key, |s| s.roster.update_subscription_id(&id, subscription_id));
                    ctx.emit_roster(key, CallOperation::MemberUpdated);
                }
                _ => {
                    ctx.store.with_session_mut(key, |s| s.subscription_id = Some(subscription_id));
                }
            }
            ctx.drive(key, StateEvent::MediaSubscribed, None);
        }
        MediaEvent::SubscribeFailed { member_id } => match (topology.is_two_party(), member_id) {
            (true, _) => {
                ctx.drive(key, StateEvent::SubscribeFailed, Some(ResultCode::SubscribeFailed.into()));
            }
            (false, Some(id)) => {
                warn!(session_key = %key, member = %id, "member subscription failed");
                ctx.store.with_session_mut(key, |s| s.roster.update_status(&id, MemberStatus::Failed));
                ctx.emit_roster(key, CallOperation::SubscribeFailed);
            }
            (false, None) => {
                warn!(session_key = %key, "group subscription failed");
                ctx.emit_operation(key, CallOperation::SubscribeFailed, Some(ResultCode::SubscribeFailed.into()));
            }
        },
        MediaEvent::Joined => {
            if !call_type.is_conference() {
                return;
            }
            let identity = ctx.encoder.identity().clone();
            let outcome = ctx.store.with_session_mut(key, |s| {
                s.roster.apply_join_state(&identity.user_id, &identity.user_name, MemberStatus::Joined)
            });
            match outcome {
                Some(JoinOutcome::Added) => ctx.emit_roster(key, CallOperation::MemberAccepted),
                Some(JoinOutcome::Updated) => ctx.emit_roster(key, CallOperation::MemberUpdated),
                _ => {}
            }
        }
        MediaEvent::PeerLeft { member_id } => match (topology, member_id) {
            (Topology::Monitor, Some(id)) => {
                ctx.store.with_session_mut(key, |s| s.roster.update_status(&id, MemberStatus::Quit));
                ctx.emit_roster(key, CallOperation::MemberUpdated);
            }
            (Topology::Single | Topology::Supervisory, _) => {
                ctx.drive(key, StateEvent::PeerLeft, None);
            }
            _ => debug!(session_key = %key, "group peer left, waiting for joinstate"),
        },
        MediaEvent::StreamAdded { member_id } => {
            if call_type != CallType::VideoMonitor {
                return;
            }
            let updated = ctx
                .store
                .with_session_mut(key, |s| s.roster.update_status(&member_id, MemberStatus::Joined))
                .unwrap_or(false);
            if !updated {
                ctx.store.with_session_mut(key, |s| {
                    s.roster.add_member(Member::new(member_id.as_str(), "", MemberStatus::Joined))
                });
            }
            ctx.emit_roster(key, CallOperation::MemberUpdated);
        }
        MediaEvent::AudioLevel { member_id, speaking } => {
            let changed = ctx
                .store
                .with_session_mut(key, |s| {
                    s.roster.member(&member_id).map(|m| m.speaking != speaking).unwrap_or(false)
                        && s.roster.update_speaking(&member_id, speaking)
                })
                .unwrap_or(false);
            if changed {
                ctx.emit_roster(key, CallOperation::MemberUpdated);
            }
        }
        MediaEvent::VideoStats { member_id, stats } => match member_id {
            Some(id) if !topology.is_two_party() => {
                ctx.store.with_session_mut(key, |s| s.roster.update_video_stats(&id, stats));
                ctx.emit_roster(key, CallOperation::MemberUpdated);
            }
            _ => {
                ctx.store.with_session_mut(key, |s| s.video_stats = stats);
                ctx.emit(Event::VideoStats { session_key: key.clone(), member_id: None, stats });
            }
        },
        MediaEvent::RemoteMuteChanged { member_id, muted } => {
            ctx.store.with_session_mut(key, |s| s.roster.update_mute(&member_id, muted));
            ctx.emit_roster(key, CallOperation::MemberUpdated);
        }
    }
}
