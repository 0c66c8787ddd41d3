mod common;
mod group;
mod monitor;
mod single;

pub use common::add_common_transitions;
pub use group::add_group_transitions;
pub use monitor::add_monitor_transitions;
pub use single::add_two_party_transitions;
