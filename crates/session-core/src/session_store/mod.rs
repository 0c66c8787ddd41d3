//! Session storage

mod store;

pub use store::{SessionStore, SessionUpdate, StoreStats};
