//! Remote control and free-form messages

use serde_json::{Map, Value};
use tracing::debug;

use rdispatch_signal_core::ChildMessageType;

use crate::api::engine::SessionEngine;
use crate::errors::Result;
use crate::types::SessionKey;

impl SessionEngine {
    /// Send a control command to a terminal. `extra` fields are merged into
    /// the top level of the message.
    pub fn remote_control(
        &mut self,
        child: ChildMessageType,
        dest_id: &str,
        devid: &str,
        extra: Map<String, Value>,
    ) -> Result<()> {
        let mut message = self.encoder.control(child, dest_id, devid);
        message.extra = extra;
        debug!(dest = dest_id, child = %message.child_msg_type, "remote control");
        self.send(&message)
    }

    pub fn send_custom_message(&mut self, dest_id: &str, content: Value) -> Result<()> {
        self.send(&self.encoder.custom(dest_id, content))
    }

    /// Send `content` to every member of a session except ourselves.
    /// Returns how many messages were sent.
    pub fn send_custom_message_to_room(&mut self, key: &SessionKey, content: Value) -> Result<usize> {
        let session = self.require(key)?;
        let mut sent = 0;
        for member in session.members().filter(|m| m.id != self.config.user_id) {
            self.send(&self.encoder.custom(&member.id, content.clone()))?;
            sent += 1;
        }
        Ok(sent)
    }
}
