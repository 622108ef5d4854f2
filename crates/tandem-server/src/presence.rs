use tandem_core::events::{LeaveMsg, PeopleInChatMsg, ServerEvent, TooManyMsg};
use tandem_core::room::{ConnectionId, ROOM_CAPACITY, RoomId};

use crate::room_manager::RoomSessionManager;
use crate::session::Session;

impl RoomSessionManager {
    /// Answer a `load` request with the size of `room`.
    ///
    /// A full room is announced to everyone in it as well as to the
    /// requester, while a rejected `login` only tells the requester. Both
    /// behaviors are kept as clients rely on them. Returns the occupant count
    /// that was observed, or `None` if the request was ignored.
    pub fn query_room_size(&self, requester: ConnectionId, room: &RoomId) -> Option<usize> {
        if room.is_empty() {
            tracing::debug!(connection_id = requester, "Load without a room id ignored");
            return None;
        }

        let occupants = self.registry.occupants_of(room);
        let count = occupants.len();
        match occupants.as_slice() {
            [] => {
                self.registry
                    .send_to(requester, ServerEvent::PeopleInChat(PeopleInChatMsg::empty()));
            },
            [only] => {
                let summary = PeopleInChatMsg {
                    number: 1,
                    user: only.username.clone(),
                    sex: only.sex.clone(),
                    lang: only.lang.clone(),
                    id: Some(room.clone()),
                };
                self.registry
                    .send_to(requester, ServerEvent::PeopleInChat(summary));
            },
            _ => {
                debug_assert!(count >= ROOM_CAPACITY);
                let too_many = ServerEvent::TooMany(TooManyMsg::default());
                self.registry.broadcast_to_room(room, &too_many);
                if !occupants.iter().any(|s| s.id == requester) {
                    self.registry.send_to(requester, too_many);
                }
                tracing::debug!(connection_id = requester, room = %room, "Load on full room");
            },
        }
        Some(count)
    }

    /// Tear down a connection. If it was in a room, the other occupant is
    /// told who left. Safe to call for connections that never logged in.
    pub fn disconnect(&mut self, id: ConnectionId) -> Option<Session> {
        if let Some(session) = self.registry.session(id)
            && let Some(room) = session.room.clone()
        {
            let leave = ServerEvent::Leave(LeaveMsg {
                boolean: true,
                room: Some(room.clone()),
                user: session.username.clone(),
                sex: session.sex.clone(),
                lang: session.lang.clone(),
            });
            self.registry.broadcast_to_room_except(&room, id, &leave);
            tracing::info!(connection_id = id, room = %room, "Left room");
        }

        let session = self.registry.remove(id);
        if session.is_some() {
            tracing::debug!(connection_id = id, "Connection removed");
        }
        session
    }
}
