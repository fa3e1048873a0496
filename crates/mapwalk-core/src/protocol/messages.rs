//! Message types for the mapwalk WebSocket protocol.
//!
//! # Message flow
//!
//! ```text
//! Client → Server:  Announcement     {"lat":..,"lng":..}            (on "Your ID")
//!                   MovementUpdate   {"id":..,"lat":..,"lng":..}    (every movement key)
//! Server → Client:  {"msgType": <kind>, "data": <payload>}          → ServerMessage
//! ```
//!
//! # Why two shapes?
//!
//! Outbound messages are bare objects because the server already knows which
//! connection they came from.  Inbound messages carry a `msgType` string
//! because one connection delivers five different kinds of event.
//!
//! # Kinds
//!
//! | `msgType`              | `data`                                 | Variant                               |
//! |------------------------|----------------------------------------|---------------------------------------|
//! | `"Your ID"`            | `"3"`                                  | [`ServerMessage::YourId`]             |
//! | `"Everyone"`           | `{"users":{"3":{"id":"3",...}}}`       | [`ServerMessage::Everyone`]           |
//! |                        | or `{"3":{"id":"3",...}}`              |                                       |
//! | `"User joined"`        | `"4"`                                  | [`ServerMessage::UserJoined`]         |
//! | `"User disconnected"`  | `"4"`                                  | [`ServerMessage::UserDisconnected`]   |
//! | `"Update coordinates"` | `{"id":"4","lat":..,"lng":..}`         | [`ServerMessage::UpdateCoordinates`]  |
//! | anything else          | anything                               | [`ServerMessage::Unknown`]            |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::geo::LatLng;
use crate::domain::markers::UserId;

/// `msgType` of the identity assignment.
pub const KIND_YOUR_ID: &str = "Your ID";
/// `msgType` of the full roster snapshot.
pub const KIND_EVERYONE: &str = "Everyone";
/// `msgType` of a join notification.
pub const KIND_USER_JOINED: &str = "User joined";
/// `msgType` of a leave notification.
pub const KIND_USER_DISCONNECTED: &str = "User disconnected";
/// `msgType` of a position broadcast.
pub const KIND_UPDATE_COORDINATES: &str = "Update coordinates";

/// One user's identifier and position, as the server reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPosition {
    pub id: UserId,
    pub lat: f64,
    pub lng: f64,
}

impl UserPosition {
    pub fn new(id: impl Into<UserId>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// Snapshot of every connected user.
///
/// Keys are the server's map keys; the client trusts the `id` inside each
/// entry, not the key.  Decodes from either `{"users": {..}}` or the bare
/// map; always encodes with the `users` wrapper.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RosterShape")]
pub struct Roster {
    pub users: BTreeMap<String, UserPosition>,
}

/// Accepted wire shapes of a roster.  The wrapped form is tried first.
#[derive(Deserialize)]
#[serde(untagged)]
enum RosterShape {
    Wrapped { users: BTreeMap<String, UserPosition> },
    Bare(BTreeMap<String, UserPosition>),
}

impl From<RosterShape> for Roster {
    fn from(shape: RosterShape) -> Self {
        match shape {
            RosterShape::Wrapped { users } | RosterShape::Bare(users) => Self { users },
        }
    }
}

impl Roster {
    /// Builds a roster keyed by each entry's own id.
    pub fn from_positions(positions: impl IntoIterator<Item = UserPosition>) -> Self {
        Self {
            users: positions
                .into_iter()
                .map(|p| (p.id.as_str().to_string(), p))
                .collect(),
        }
    }
}

/// Every message the server can send, decoded once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// The server assigned this connection an identifier.
    YourId(UserId),
    /// The full roster, sent right after `YourId`.
    Everyone(Roster),
    /// Another user connected.
    UserJoined(UserId),
    /// Another user left.
    UserDisconnected(UserId),
    /// Another user moved.
    UpdateCoordinates(UserPosition),
    /// A `msgType` this client does not understand (or none at all).
    Unknown(String),
}

impl ServerMessage {
    /// The `msgType` string of this message.
    pub fn kind(&self) -> &str {
        match self {
            ServerMessage::YourId(_) => KIND_YOUR_ID,
            ServerMessage::Everyone(_) => KIND_EVERYONE,
            ServerMessage::UserJoined(_) => KIND_USER_JOINED,
            ServerMessage::UserDisconnected(_) => KIND_USER_DISCONNECTED,
            ServerMessage::UpdateCoordinates(_) => KIND_UPDATE_COORDINATES,
            ServerMessage::Unknown(kind) => kind,
        }
    }
}

/// First message a client sends: where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Announcement {
    fn from(p: LatLng) -> Self {
        Self {
            lat: p.lat,
            lng: p.lng,
        }
    }
}

/// Sent on every movement key press.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementUpdate {
    pub id: UserId,
    pub lat: f64,
    pub lng: f64,
}

impl MovementUpdate {
    pub fn new(id: UserId, position: LatLng) -> Self {
        Self {
            id,
            lat: position.lat,
            lng: position.lng,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
