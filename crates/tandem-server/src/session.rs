use tandem_core::room::{ConnectionId, RoomId};

/// Lifecycle of a single connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, not yet admitted to a room.
    #[default]
    Anonymous,
    /// Admitted to a room with a declared profile.
    Named,
    /// Transport link is gone.
    Disconnected,
}

/// Per-connection state. Only the room session manager writes the profile
/// and room fields; everything else reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: ConnectionId,
    pub username: Option<String>,
    pub room: Option<RoomId>,
    pub sex: Option<String>,
    pub lang: Option<String>,
    pub state: SessionState,
}

impl Session {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            username: None,
            room: None,
            sex: None,
            lang: None,
            state: SessionState::Anonymous,
        }
    }

    pub fn is_named(&self) -> bool {
        self.state == SessionState::Named
    }

    pub fn in_room(&self, room: &RoomId) -> bool {
        self.room.as_ref() == Some(room)
    }
}
