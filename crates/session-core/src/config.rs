//! Engine configuration
//!
//! [`SessionConfig`] carries everything the engine needs to know about the
//! local user and the deployment it talks to. It can be built in code with
//! the `with_*` methods, parsed from JSON, or read from the environment.
//!
//! # Examples
//!
//! ```rust
//! use rdispatch_session_core::SessionConfig;
//!
//! let config = SessionConfig::new("1001", "Dispatcher")
//!     .with_monitor_room_id("999999101100")
//!     .with_clock_offset_ms(-250);
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.identity().user_id, "1001");
//! ```
//!
//! # Environment
//!
//! | Variable | Field |
//! |----------|-------|
//! | `RDISPATCH_USER_ID` | `user_id` |
//! | `RDISPATCH_USER_NAME` | `user_name` |
//! | `RDISPATCH_MONITOR_ROOM` | `monitor_room_id` |
//! | `RDISPATCH_CLOCK_OFFSET_MS` | `clock_offset_ms` |

use serde::{Deserialize, Serialize};

use rdispatch_signal_core::{LocalIdentity, ServerClock, PLACEHOLDER_ROOM_ID};

use crate::errors::{Result, SessionError};

/// Room id under which the video monitoring room is kept unless configured.
pub const DEFAULT_MONITOR_ROOM_ID: &str = "999999101100";

/// Default depth of the runtime command queue.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Configuration for a [`SessionEngine`](crate::SessionEngine)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Logged-in user id, used as `uid` and default sender
    pub user_id: String,
    /// Logged-in user display name
    pub user_name: String,
    /// Fixed key of the video monitoring room
    pub monitor_room_id: String,
    /// Room id sent before the server assigns one
    pub placeholder_room_id: String,
    /// Server clock minus local clock, in milliseconds
    pub clock_offset_ms: i64,
    /// Capacity of the runtime command channel
    pub channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            user_name: String::new(),
            monitor_room_id: DEFAULT_MONITOR_ROOM_ID.to_string(),
            placeholder_room_id: PLACEHOLDER_ROOM_ID.to_string(),
            clock_offset_ms: 0,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl SessionConfig {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            ..Default::default()
        }
    }

    pub fn with_monitor_room_id(mut self, room_id: impl Into<String>) -> Self {
        self.monitor_room_id = room_id.into();
        self
    }

    pub fn with_placeholder_room_id(mut self, room_id: impl Into<String>) -> Self {
        self.placeholder_room_id = room_id.into();
        self
    }

    pub fn with_clock_offset_ms(mut self, offset_ms: i64) -> Self {
        self.clock_offset_ms = offset_ms;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SessionConfig = serde_json::from_str(json)
            .map_err(|e| SessionError::config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from `RDISPATCH_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = SessionConfig::default();
        if let Ok(user_id) = std::env::var("RDISPATCH_USER_ID") {
            config.user_id = user_id;
        }
        if let Ok(user_name) = std::env::var("RDISPATCH_USER_NAME") {
            config.user_name = user_name;
        }
        if let Ok(room) = std::env::var("RDISPATCH_MONITOR_ROOM") {
            config.monitor_room_id = room;
        }
        if let Ok(offset) = std::env::var("RDISPATCH_CLOCK_OFFSET_MS") {
            config.clock_offset_ms = offset
                .parse()
                .map_err(|_| SessionError::config(format!("Invalid RDISPATCH_CLOCK_OFFSET_MS: {}", offset)))?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(SessionError::config("user_id must not be empty"));
        }
        if self.monitor_room_id.trim().is_empty() {
            return Err(SessionError::config("monitor_room_id must not be empty"));
        }
        if self.monitor_room_id == self.placeholder_room_id {
            return Err(SessionError::config("monitor_room_id must differ from the placeholder room id"));
        }
        if self.channel_capacity == 0 {
            return Err(SessionError::config("channel_capacity must be at least 1"));
        }
        Ok(())
    }

    pub fn identity(&self) -> LocalIdentity {
        LocalIdentity::new(self.user_id.clone(), self.user_name.clone())
    }

    pub fn clock(&self) -> ServerClock {
        ServerClock::new(self.clock_offset_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::new("1001", "Dispatcher");
        assert_eq!(config.monitor_room_id, "999999101100");
        assert_eq!(config.placeholder_room_id, "000000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_user_is_rejected() {
        assert!(SessionConfig::default().validate().is_err());
        assert!(SessionConfig::new("1001", "").with_channel_capacity(0).validate().is_err());
        assert!(SessionConfig::new("1001", "").with_monitor_room_id("000000").validate().is_err());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = SessionConfig::from_json_str(r#"{"user_id":"1001","clock_offset_ms":40}"#).unwrap();
        assert_eq!(config.user_id, "1001");
        assert_eq!(config.clock_offset_ms, 40);
        assert_eq!(config.monitor_room_id, DEFAULT_MONITOR_ROOM_ID);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        unsafe { std::env::set_var("RDISPATCH_USER_ID", "1009"); }
        unsafe { std::env::set_var("RDISPATCH_MONITOR_ROOM", "777"); }
        unsafe { std::env::set_var("RDISPATCH_CLOCK_OFFSET_MS", "-120"); }
        let config = SessionConfig::from_env();
        unsafe { std::env::remove_var("RDISPATCH_USER_ID"); }
        unsafe { std::env::remove_var("RDISPATCH_MONITOR_ROOM"); }
        unsafe { std::env::remove_var("RDISPATCH_CLOCK_OFFSET_MS"); }

        let config = config.unwrap();
        assert_eq!(config.user_id, "1009");
        assert_eq!(config.monitor_room_id, "777");
        assert_eq!(config.clock_offset_ms, -120);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_offset() {
        unsafe { std::env::set_var("RDISPATCH_USER_ID", "1009"); }
        unsafe { std::env::set_var("RDISPATCH_CLOCK_OFFSET_MS", "soon"); }
        let config = SessionConfig::from_env();
        unsafe { std::env::remove_var("RDISPATCH_USER_ID"); }
        unsafe { std::env::remove_var("RDISPATCH_CLOCK_OFFSET_MS"); }
        assert!(config.is_err());
    }
}
