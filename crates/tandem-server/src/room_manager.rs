use tandem_core::events::{LoginMsg, ServerEvent, StartChatMsg, TooManyMsg};
use tandem_core::room::{ConnectionId, ROOM_CAPACITY, RoomId};

use crate::registry::{ConnectionRegistry, EventSender};
use crate::session::{Session, SessionState};

/// Result of a `login` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Admitted as the first occupant; waiting for a partner.
    Waiting,
    /// Admitted as the second occupant; `startChat` went to both.
    ChatStarted,
    /// Room already had two occupants; requester got `tooMany`.
    TooMany,
    /// Request was malformed or came from a connection that cannot log in.
    Ignored,
}

/// Owns the connection registry and runs the join protocol for two-person
/// rooms. Presence and message relay live in `presence` and `relay`.
#[derive(Default)]
pub struct RoomSessionManager {
    pub(crate) registry: ConnectionRegistry,
}

impl RoomSessionManager {
    pub fn new() -> Self {
        Self {
            registry: ConnectionRegistry::new(),
        }
    }

    /// Register a freshly accepted connection.
    pub fn connect(&mut self, sender: EventSender) -> ConnectionId {
        let id = self.registry.connect(sender);
        tracing::debug!(connection_id = id, "Connection registered");
        id
    }

    /// Admit `id` to the requested room, or reject it if the room is full.
    pub fn login(&mut self, id: ConnectionId, login: LoginMsg) -> LoginOutcome {
        let Some(room) = login.id.filter(|r| !r.is_empty()) else {
            tracing::debug!(connection_id = id, "Login without a room id ignored");
            return LoginOutcome::Ignored;
        };

        match self.registry.session(id) {
            Some(s) if s.state == SessionState::Anonymous => {},
            Some(_) => {
                tracing::debug!(connection_id = id, room = %room, "Repeated login ignored");
                return LoginOutcome::Ignored;
            },
            None => return LoginOutcome::Ignored,
        }

        // Capacity is checked before the joiner is counted.
        let existing: Vec<Session> = self
            .registry
            .occupants_of(&room)
            .into_iter()
            .cloned()
            .collect();
        if existing.len() >= ROOM_CAPACITY {
            self.registry
                .send_to(id, ServerEvent::TooMany(TooManyMsg::default()));
            tracing::info!(connection_id = id, room = %room, "Room full, login rejected");
            return LoginOutcome::TooMany;
        }

        let Some(session) = self.registry.session_mut(id) else {
            return LoginOutcome::Ignored;
        };
        session.username = login.user;
        session.sex = login.sex;
        session.lang = login.lang;
        session.state = SessionState::Named;
        let joiner = session.clone();

        self.registry.send_to(id, ServerEvent::Sex(joiner.sex.clone()));
        self.registry.send_to(id, ServerEvent::Lang(joiner.lang.clone()));
        self.registry.add(id, room.clone());

        tracing::info!(
            connection_id = id,
            room = %room,
            occupants = existing.len() + 1,
            "Joined room"
        );

        match existing.first() {
            Some(partner) if existing.len() == 1 => {
                let start = ServerEvent::StartChat(StartChatMsg {
                    boolean: true,
                    id: room.clone(),
                    users: vec![partner.username.clone(), joiner.username],
                    sexes: vec![partner.sex.clone(), joiner.sex],
                    langs: vec![partner.lang.clone(), joiner.lang],
                });
                self.registry.broadcast_to_room(&room, &start);
                tracing::info!(room = %room, "Chat started");
                LoginOutcome::ChatStarted
            },
            _ => LoginOutcome::Waiting,
        }
    }

    pub fn session(&self, id: ConnectionId) -> Option<&Session> {
        self.registry.session(id)
    }

    /// Roster of `room` in connect order.
    pub fn occupants_of(&self, room: &RoomId) -> Vec<&Session> {
        self.registry.occupants_of(room)
    }

    /// Returns (non-empty rooms, connections in a room, all connections).
    pub fn stats(&self) -> (usize, usize, usize) {
        let (rooms, occupants) = self.registry.stats();
        (rooms, occupants, self.registry.connection_count())
    }
}
