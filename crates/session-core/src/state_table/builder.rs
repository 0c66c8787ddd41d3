use crate::types::CallState;

use super::types::{MasterStateTable, StateEvent, StateKey, Topology, Transition};

/// Assembles a [`MasterStateTable`] from the per-topology table modules.
#[derive(Debug, Default)]
pub struct StateTableBuilder {
    table: MasterStateTable,
}

impl StateTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transition(&mut self, topology: Topology, state: CallState, event: StateEvent, transition: Transition) {
        self.table.insert(StateKey::new(topology, state, event), transition);
    }

    /// Plain state change that only publishes `StateChanged`.
    pub fn add_state_change(&mut self, topology: Topology, from: CallState, event: StateEvent, to: CallState) {
        self.add_transition(topology, from, event, Transition::to_state(to));
    }

    /// Row that applies to any non-terminal state of `topology`.
    pub fn add_wildcard(&mut self, topology: Topology, event: StateEvent, transition: Transition) {
        self.table.insert_wildcard(topology, event, transition);
    }

    pub fn build(self) -> MasterStateTable {
        self.table
    }
}
