use crate::session::CallSession;
use crate::state_table::Guard;
use crate::types::Direction;

/// Check a single guard against the session
pub fn check_guard(guard: &Guard, session: &CallSession) -> bool {
    match guard {
        Guard::HasRoomId => session.room_id.as_deref().is_some_and(|id| !id.is_empty()),
        Guard::IsOutgoing => session.direction == Direction::Outgoing,
        Guard::IsIncoming => session.direction == Direction::Incoming,
    }
}

pub fn check_guards(guards: &[Guard], session: &CallSession) -> bool {
    guards.iter().all(|guard| check_guard(guard, session))
}
