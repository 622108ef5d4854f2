use tandem_core::events::{ChatMessage, ServerEvent};
use tandem_core::room::ConnectionId;

use crate::room_manager::RoomSessionManager;

impl RoomSessionManager {
    /// Forward a chat line verbatim to the sender's room partner.
    /// Returns false when the sender is not in a room and nothing was sent.
    pub fn send_message(&self, sender: ConnectionId, message: ChatMessage) -> bool {
        let Some(room) = self
            .registry
            .session(sender)
            .and_then(|s| s.room.as_ref())
        else {
            tracing::debug!(connection_id = sender, "Message outside a room dropped");
            return false;
        };

        self.registry
            .broadcast_to_room_except(room, sender, &ServerEvent::Receive(message));
        true
    }
}
