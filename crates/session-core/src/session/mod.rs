pub mod call_session;
pub mod key;

pub use call_session::CallSession;
pub use key::{derive_session_key, ringing_key};
