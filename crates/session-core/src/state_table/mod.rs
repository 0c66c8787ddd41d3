//! # Call State Table
//!
//! The call state machine as data: one [`Transition`] per
//! `(Topology, CallState, StateEvent)` plus per-topology wildcard rows that
//! apply in any non-terminal state. Lookups try the exact row first.
//!
//! The table is built once into [`MASTER_TABLE`] from the modules under
//! `tables/`.

pub mod builder;
pub mod tables;
pub mod types;

pub use builder::StateTableBuilder;
pub use types::*;

pub use crate::types::CallState;

use std::sync::Arc;

use lazy_static::lazy_static;

lazy_static! {
    /// The master state table - single source of truth for all transitions
    pub static ref MASTER_TABLE: Arc<MasterStateTable> = Arc::new(build_master_table());
}

/// Build the complete master state table
pub fn build_master_table() -> MasterStateTable {
    let mut builder = StateTableBuilder::new();
    tables::add_common_transitions(&mut builder);
    tables::add_two_party_transitions(&mut builder);
    tables::add_group_transitions(&mut builder);
    tables::add_monitor_transitions(&mut builder);
    let table = builder.build();

    if let Err(errors) = table.validate() {
        tracing::error!("State table validation failed: {:?}", errors);
    }
    tracing::debug!("Built state table with {} transitions", table.transition_count());
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CallType;

    #[test]
    fn test_master_table_is_valid() {
        assert!(MASTER_TABLE.validate().is_ok());
        assert!(MASTER_TABLE.transition_count() > 20);
    }

    #[test]
    fn test_exact_row_wins_over_wildcard() {
        let table = &*MASTER_TABLE;
        let key = StateKey::new(Topology::Single, CallState::Ring, StateEvent::PeerAccepted);
        assert_eq!(table.get(&key).unwrap().next_state, Some(CallState::Talking));

        let key = StateKey::new(Topology::Single, CallState::Talking, StateEvent::PeerLeft);
        let transition = table.get(&key).unwrap();
        assert_eq!(transition.next_state, Some(CallState::Bye));
        assert!(transition.actions.contains(&Action::SendLeaveEcho));
    }

    #[test]
    fn test_group_ignores_member_level_events() {
        let table = &*MASTER_TABLE;
        for event in [StateEvent::PeerRejected, StateEvent::PeerLeft, StateEvent::SubscribeFailed] {
            let key = StateKey::new(Topology::Group, CallState::Talking, event);
            assert!(!table.has_transition(&key), "{:?}", event);
        }
    }

    #[test]
    fn test_validate_flags_terminal_row_without_delete() {
        let mut builder = StateTableBuilder::new();
        builder.add_state_change(Topology::Single, CallState::Idle, StateEvent::PeerLeft, CallState::Bye);
        let errors = builder.build().validate().unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_topology_of_call_types() {
        assert_eq!(Topology::of(CallType::Video), Topology::Single);
        assert_eq!(Topology::of(CallType::ForceMonitor), Topology::Supervisory);
        assert_eq!(Topology::of(CallType::Broadcast), Topology::Group);
        assert_eq!(Topology::of(CallType::VideoMonitor), Topology::Monitor);
    }
}
