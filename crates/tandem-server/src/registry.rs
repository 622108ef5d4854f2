use std::collections::BTreeMap;

use tokio::sync::mpsc;

use tandem_core::events::ServerEvent;
use tandem_core::room::{ConnectionId, RoomId};

use crate::session::{Session, SessionState};

/// Per-connection sender for outbound events. Bounded so a stalled client
/// cannot grow server memory; events that do not fit are dropped.
pub type EventSender = mpsc::Sender<ServerEvent>;

struct ConnectionEntry {
    session: Session,
    sender: EventSender,
}

/// Registry of every live connection and its session state.
///
/// Rooms are not stored: a room's roster is the set of sessions whose `room`
/// field holds that id, so an empty room simply has no entries. Iteration
/// follows connect order because ids are allocated monotonically.
pub struct ConnectionRegistry {
    connections: BTreeMap<ConnectionId, ConnectionEntry>,
    next_id: ConnectionId,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Register a new transport link as an anonymous session.
    pub fn connect(&mut self, sender: EventSender) -> ConnectionId {
        let id = self.next_id;
        self.next_id += 1;
        self.connections.insert(
            id,
            ConnectionEntry {
                session: Session::new(id),
                sender,
            },
        );
        id
    }

    /// Roster of a room, in connect order.
    ///
    /// An empty `room` matches every registered connection, named or not.
    /// Callers that mean a specific room must check for that first.
    pub fn occupants_of(&self, room: &RoomId) -> Vec<&Session> {
        self.connections
            .values()
            .map(|c| &c.session)
            .filter(|s| room.is_empty() || s.in_room(room))
            .collect()
    }

    /// Put a connection into a room's broadcast group.
    pub fn add(&mut self, id: ConnectionId, room: RoomId) -> bool {
        match self.connections.get_mut(&id) {
            Some(entry) => {
                entry.session.room = Some(room);
                true
            },
            None => false,
        }
    }

    /// Drop a connection entirely, returning its final session state.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Session> {
        self.connections.remove(&id).map(|entry| {
            let mut session = entry.session;
            session.state = SessionState::Disconnected;
            session
        })
    }

    pub fn session(&self, id: ConnectionId) -> Option<&Session> {
        self.connections.get(&id).map(|c| &c.session)
    }

    pub fn session_mut(&mut self, id: ConnectionId) -> Option<&mut Session> {
        self.connections.get_mut(&id).map(|c| &mut c.session)
    }

    /// Queue an event for a single connection.
    pub fn send_to(&self, id: ConnectionId, event: ServerEvent) {
        if let Some(entry) = self.connections.get(&id) {
            deliver(id, &entry.sender, event);
        }
    }

    /// Queue an event for every occupant of `room`.
    pub fn broadcast_to_room(&self, room: &RoomId, event: &ServerEvent) {
        self.broadcast_filtered(room, None, event);
    }

    /// Queue an event for every occupant of `room` except `exclude`.
    pub fn broadcast_to_room_except(
        &self,
        room: &RoomId,
        exclude: ConnectionId,
        event: &ServerEvent,
    ) {
        self.broadcast_filtered(room, Some(exclude), event);
    }

    fn broadcast_filtered(&self, room: &RoomId, exclude: Option<ConnectionId>, event: &ServerEvent) {
        if room.is_empty() {
            return;
        }
        for (&id, entry) in &self.connections {
            if Some(id) != exclude && entry.session.in_room(room) {
                deliver(id, &entry.sender, event.clone());
            }
        }
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Returns (non-empty rooms, connections that are in a room).
    pub fn stats(&self) -> (usize, usize) {
        let mut rooms: Vec<&RoomId> = self
            .connections
            .values()
            .filter_map(|c| c.session.room.as_ref())
            .collect();
        let occupants = rooms.len();
        rooms.sort();
        rooms.dedup();
        (rooms.len(), occupants)
    }
}

fn deliver(id: ConnectionId, sender: &EventSender, event: ServerEvent) {
    let name = event.name();
    if let Err(e) = sender.try_send(event) {
        tracing::debug!(
            connection_id = id, event = name, error = %e,
            "Dropping event for slow or closed connection"
        );
    }
}
