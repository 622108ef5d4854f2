//! Shared types for tandem: room ids, the client/server event vocabulary and
//! the wire codec used by the server and its clients.

pub mod events;
pub mod protocol;
pub mod room;
