use serde::{Deserialize, Serialize};

use crate::room::RoomId;

/// Events a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Ask how many people are in a room before logging in.
    #[serde(rename = "load")]
    Load(RoomId),
    #[serde(rename = "login")]
    Login(LoginMsg),
    #[serde(rename = "msg")]
    Msg(ChatMessage),
}

/// Events the server emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "peopleinchat")]
    PeopleInChat(PeopleInChatMsg),
    #[serde(rename = "tooMany")]
    TooMany(TooManyMsg),
    #[serde(rename = "startChat")]
    StartChat(StartChatMsg),
    #[serde(rename = "leave")]
    Leave(LeaveMsg),
    #[serde(rename = "receive")]
    Receive(ChatMessage),
    /// Echo of the sex tag the server stored for the requester.
    #[serde(rename = "sex")]
    Sex(Option<String>),
    /// Echo of the language tag the server stored for the requester.
    #[serde(rename = "lang")]
    Lang(Option<String>),
}

/// `login` payload. Any field may be missing on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginMsg {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RoomId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// Chat line relayed between the two occupants. Used unchanged for the
/// inbound `msg` and the outbound `receive` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

/// Room size summary answering `load`.
///
/// An empty room serializes as `{"number":0}`; a room with one occupant also
/// carries that occupant's profile and the queried id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeopleInChatMsg {
    pub number: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RoomId>,
}

impl PeopleInChatMsg {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooManyMsg {
    pub boolean: bool,
}

impl Default for TooManyMsg {
    fn default() -> Self {
        Self { boolean: true }
    }
}

/// Sent to both occupants once the second one is admitted. The arrays are
/// index-aligned: `[existing occupant, new occupant]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartChatMsg {
    pub boolean: bool,
    pub id: RoomId,
    pub users: Vec<Option<String>>,
    pub sexes: Vec<Option<String>>,
    pub langs: Vec<Option<String>>,
}

/// Tells the remaining occupant who left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveMsg {
    pub boolean: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl ServerEvent {
    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PeopleInChat(_) => "peopleinchat",
            Self::TooMany(_) => "tooMany",
            Self::StartChat(_) => "startChat",
            Self::Leave(_) => "leave",
            Self::Receive(_) => "receive",
            Self::Sex(_) => "sex",
            Self::Lang(_) => "lang",
        }
    }
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Load(_) => "load",
            Self::Login(_) => "login",
            Self::Msg(_) => "msg",
        }
    }
}
