use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identity of a live client link, allocated by the server in connect order.
pub type ConnectionId = u64;

/// Upper bound (inclusive) for generated room ids.
pub const MAX_ROOM_ID: u32 = 1_000_000;

/// Maximum number of occupants a room admits.
pub const ROOM_CAPACITY: usize = 2;

/// Identifier of a chat room.
///
/// Clients usually send the id they parsed out of `/chat/{id}`, which may
/// arrive either as a string or as a bare number. Both forms are accepted and
/// normalised to the string form; the id is otherwise carried unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty id selects no particular room.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u32> for RoomId {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Unsigned(n) => Self(n.to_string()),
            Raw::Signed(n) => Self(n.to_string()),
        })
    }
}

/// Generate a random numeric room id in `0..=MAX_ROOM_ID`.
pub fn generate_room_id() -> RoomId {
    RoomId::from(rand::random_range(0..=MAX_ROOM_ID))
}
