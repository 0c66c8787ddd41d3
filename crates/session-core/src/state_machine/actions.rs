use tracing::{debug, info};

use crate::adapters::MediaCommand;
use crate::dispatcher::DispatchContext;
use crate::state_table::Action;
use crate::types::{CallType, SessionKey};

/// Execute an action from the state table.
///
/// `key` follows the session through a key migration. `RecordResult` is
/// applied by the executor and `DeleteSession` by the caller, so both are
/// no-ops here.
pub fn execute_action(action: &Action, ctx: &mut DispatchContext<'_>, key: &mut SessionKey) {
    debug!(session_key = %key, ?action, "executing action");
    let Some(session) = ctx.store.get(key) else {
        debug!(session_key = %key, ?action, "session gone, skipping action");
        return;
    };

    match action {
        Action::RecordResult(_) | Action::DeleteSession => {}
        Action::MigrateKey => {
            if let Some(new_key) = ctx.store.migrate_key(key) {
                *key = new_key;
            }
        }
        Action::RequestMedia => {
            let Some(room_id) = session.room_id.clone() else { return };
            let command = match session.call_type {
                CallType::Ptt | CallType::TempPtt | CallType::Broadcast => {
                    MediaCommand::Publish { session_key: key.clone(), room_id }
                }
                _ => MediaCommand::JoinRoom { session_key: key.clone(), room_id },
            };
            ctx.queue_media(command);
        }
        Action::QueueJoinFinish => {
            let envelope = ctx.encoder.join_finish(&session.context());
            ctx.queue_envelope(envelope);
        }
        Action::QueueMemberQuery => {
            if session.call_type.is_group() {
                let envelope = ctx.encoder.query_members(&session.context());
                ctx.queue_envelope(envelope);
            }
        }
        Action::ReleaseFloor => {
            if session.call_type.is_ptt() {
                info!(session_key = %key, "releasing floor");
                let envelope = ctx.encoder.free(&session.context());
                ctx.queue_envelope(envelope);
                ctx.store.with_session_mut(key, |s| s.floor_holder = None);
                ctx.queue_media(MediaCommand::CloseSend { session_key: key.clone() });
            }
        }
        Action::SendLeaveEcho => {
            let envelope = ctx.encoder.leave(&session.context());
            ctx.queue_envelope(envelope);
        }
        Action::LeaveMedia => {
            ctx.queue_media(MediaCommand::Leave { session_key: key.clone() });
        }
    }
}
