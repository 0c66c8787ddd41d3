pub mod actions;
pub mod executor;
pub mod guards;

pub use actions::execute_action;
pub use executor::{ProcessEventResult, StateMachine};
