//! JSON codec for mapwalk protocol messages.
//!
//! Inbound wire format:
//! ```text
//! {"msgType": "<kind>", "data": <kind-specific payload>}
//! ```
//! Decoding happens in two stages: the envelope is parsed first, then the
//! `data` value is parsed according to `msgType`.  This keeps an unknown kind
//! (which is not an error) apart from a known kind with a broken payload
//! (which is).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::trace;

use crate::domain::geo::LatLng;
use crate::domain::markers::UserId;
use crate::protocol::messages::{
    Announcement, MovementUpdate, Roster, ServerMessage, UserPosition, KIND_EVERYONE,
    KIND_UPDATE_COORDINATES, KIND_USER_DISCONNECTED, KIND_USER_JOINED, KIND_YOUR_ID,
};

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The frame is not a JSON object with a usable envelope.
    #[error("invalid JSON envelope: {0}")]
    InvalidJson(String),

    /// The envelope named a known kind but its `data` did not match.
    #[error("malformed {kind:?} payload: {reason}")]
    MalformedPayload { kind: String, reason: String },

    /// A message could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(String),
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "msgType", default)]
    msg_type: Option<String>,
    #[serde(default)]
    data: Value,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    #[serde(rename = "msgType")]
    msg_type: &'a str,
    data: T,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes one inbound text frame.
///
/// A missing, empty, or unrecognised `msgType` yields
/// [`ServerMessage::Unknown`], not an error.
///
/// # Errors
///
/// - [`ProtocolError::InvalidJson`] if the frame is not a JSON object or
///   `msgType` is not a string.
/// - [`ProtocolError::MalformedPayload`] if a known kind carries the wrong
///   `data` shape.
///
/// # Examples
///
/// ```rust
/// use mapwalk_core::protocol::{decode_server_message, ServerMessage};
/// use mapwalk_core::UserId;
///
/// let msg = decode_server_message(r#"{"msgType":"Your ID","data":"1"}"#).unwrap();
/// assert_eq!(msg, ServerMessage::YourId(UserId::from("1")));
/// ```
pub fn decode_server_message(text: &str) -> Result<ServerMessage, ProtocolError> {
    let raw: RawEnvelope =
        serde_json::from_str(text).map_err(|e| ProtocolError::InvalidJson(e.to_string()))?;

    let kind = raw.msg_type.unwrap_or_default();
    let data = raw.data;

    let msg = match kind.as_str() {
        KIND_YOUR_ID => ServerMessage::YourId(payload(&kind, data)?),
        KIND_EVERYONE => ServerMessage::Everyone(payload::<Roster>(&kind, data)?),
        KIND_USER_JOINED => ServerMessage::UserJoined(payload(&kind, data)?),
        KIND_USER_DISCONNECTED => ServerMessage::UserDisconnected(payload(&kind, data)?),
        KIND_UPDATE_COORDINATES => {
            ServerMessage::UpdateCoordinates(payload::<UserPosition>(&kind, data)?)
        }
        _ => {
            trace!(kind = %kind, "unrecognised msgType");
            ServerMessage::Unknown(kind)
        }
    };

    Ok(msg)
}

/// Encodes a server message into its envelope form.
///
/// The client never sends these; this exists for tools and tests that play
/// the server's role.  `Unknown` kinds are encoded with `"data": null`.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode_server_message(msg: &ServerMessage) -> Result<String, ProtocolError> {
    let kind = msg.kind();
    match msg {
        ServerMessage::YourId(id)
        | ServerMessage::UserJoined(id)
        | ServerMessage::UserDisconnected(id) => to_json(&Envelope { msg_type: kind, data: id }),
        ServerMessage::Everyone(roster) => to_json(&Envelope {
            msg_type: kind,
            data: roster,
        }),
        ServerMessage::UpdateCoordinates(pos) => to_json(&Envelope {
            msg_type: kind,
            data: pos,
        }),
        ServerMessage::Unknown(_) => to_json(&Envelope {
            msg_type: kind,
            data: Value::Null,
        }),
    }
}

/// Encodes the `{lat, lng}` announcement sent after identity assignment.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode_announcement(position: LatLng) -> Result<String, ProtocolError> {
    to_json(&Announcement::from(position))
}

/// Encodes the `{id, lat, lng}` update sent on every movement key.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode_movement(id: &UserId, position: LatLng) -> Result<String, ProtocolError> {
    to_json(&MovementUpdate::new(id.clone(), position))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn payload<T: for<'de> Deserialize<'de>>(kind: &str, data: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|e| ProtocolError::MalformedPayload {
        kind: kind.to_string(),
        reason: e.to_string(),
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(value).map_err(|e| ProtocolError::Encode(e.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_your_id() {
        let msg = decode_server_message(r#"{"msgType":"Your ID","data":"1"}"#).unwrap();
        assert_eq!(msg, ServerMessage::YourId(UserId::from("1")));
    }

    #[test]
    fn test_decode_everyone_uses_users_wrapper() {
        // Arrange
        let json = r#"{"msgType":"Everyone","data":{"users":{
            "1":{"id":"1","lat":0,"lng":0},
            "2":{"id":"2","lat":1.5,"lng":-2}}}}"#;

        // Act
        let msg = decode_server_message(json).unwrap();

        // Assert
        match msg {
            ServerMessage::Everyone(roster) => {
                assert_eq!(roster.users.len(), 2);
                assert_eq!(roster.users["2"], UserPosition::new("2", 1.5, -2.0));
            }
            other => panic!("expected Everyone, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_everyone_accepts_bare_map() {
        // Arrange: the roster map without the `users` wrapper
        let json = r#"{"msgType":"Everyone","data":{
            "A":{"id":"A","lat":1,"lng":2},
            "B":{"id":"B","lat":3,"lng":4}}}"#;

        // Act
        let msg = decode_server_message(json).unwrap();

        // Assert
        let expected = Roster::from_positions([
            UserPosition::new("A", 1.0, 2.0),
            UserPosition::new("B", 3.0, 4.0),
        ]);
        assert_eq!(msg, ServerMessage::Everyone(expected));
    }

    #[test]
    fn test_decode_everyone_with_empty_map_is_empty_roster() {
        let msg = decode_server_message(r#"{"msgType":"Everyone","data":{}}"#).unwrap();
        assert_eq!(msg, ServerMessage::Everyone(Roster::default()));

        let msg = decode_server_message(r#"{"msgType":"Everyone","data":{"users":{}}}"#).unwrap();
        assert_eq!(msg, ServerMessage::Everyone(Roster::default()));
    }

    #[test]
    fn test_decode_everyone_with_non_roster_object_is_malformed() {
        // Arrange: neither a `users` wrapper nor a map of positions
        let result = decode_server_message(r#"{"msgType":"Everyone","data":{"count":2}}"#);

        // Assert
        assert!(matches!(
            result,
            Err(ProtocolError::MalformedPayload { ref kind, .. }) if kind == "Everyone"
        ));
    }

    #[test]
    fn test_decode_update_coordinates() {
        let msg = decode_server_message(
            r#"{"msgType":"Update coordinates","data":{"id":"1","lat":42.388282,"lng":-71.153968}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            ServerMessage::UpdateCoordinates(UserPosition::new("1", 42.388282, -71.153968))
        );
    }

    #[test]
    fn test_decode_unknown_kind_is_not_an_error() {
        let msg = decode_server_message(r#"{"msgType":"Chat","data":{"text":"hi"}}"#).unwrap();
        assert_eq!(msg, ServerMessage::Unknown("Chat".to_string()));
    }

    #[test]
    fn test_decode_missing_kind_is_unknown() {
        let msg = decode_server_message(r#"{"data":"1"}"#).unwrap();
        assert_eq!(msg, ServerMessage::Unknown(String::new()));
    }

    #[test]
    fn test_decode_known_kind_with_wrong_payload_is_malformed() {
        // Arrange: "Your ID" must carry a string, not a number
        let result = decode_server_message(r#"{"msgType":"Your ID","data":7}"#);

        // Assert
        assert!(matches!(
            result,
            Err(ProtocolError::MalformedPayload { ref kind, .. }) if kind == "Your ID"
        ));
    }

    #[test]
    fn test_decode_update_missing_lat_is_malformed() {
        let result = decode_server_message(
            r#"{"msgType":"Update coordinates","data":{"id":"1","lng":2}}"#,
        );
        assert!(matches!(result, Err(ProtocolError::MalformedPayload { .. })));
    }

    #[test]
    fn test_decode_non_object_is_invalid_json() {
        assert!(matches!(
            decode_server_message("close"),
            Err(ProtocolError::InvalidJson(_))
        ));
        assert!(matches!(
            decode_server_message("42"),
            Err(ProtocolError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_encode_your_id_matches_server_wire_format() {
        let json = encode_server_message(&ServerMessage::YourId(UserId::from("1"))).unwrap();
        assert_eq!(json, r#"{"msgType":"Your ID","data":"1"}"#);
    }

    #[test]
    fn test_encode_user_disconnected_matches_server_wire_format() {
        let json =
            encode_server_message(&ServerMessage::UserDisconnected(UserId::from("2"))).unwrap();
        assert_eq!(json, r#"{"msgType":"User disconnected","data":"2"}"#);
    }

    #[test]
    fn test_encode_unknown_has_null_data() {
        let json = encode_server_message(&ServerMessage::Unknown("Ping".into())).unwrap();
        assert_eq!(json, r#"{"msgType":"Ping","data":null}"#);
    }

    #[test]
    fn test_encode_announcement() {
        let json = encode_announcement(LatLng::new(42.5, -71.25)).unwrap();
        assert_eq!(json, r#"{"lat":42.5,"lng":-71.25}"#);
    }

    #[test]
    fn test_encode_movement() {
        let json = encode_movement(&UserId::from("3"), LatLng::new(42.5, -71.25)).unwrap();
        assert_eq!(json, r#"{"id":"3","lat":42.5,"lng":-71.25}"#);
    }
}
