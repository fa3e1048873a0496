//! # mapwalk-core
//!
//! Shared library for mapwalk containing the JSON protocol codec, coordinate
//! arithmetic, marker bookkeeping, and the movement key table.
//!
//! This crate has zero dependencies on sockets, async runtimes, or map
//! widgets.  Everything here is plain data and pure functions, which is what
//! makes the client's behaviour testable without a server or a screen.
//!
//! # Architecture overview (for beginners)
//!
//! mapwalk is a small multi-user map: every connected user is a marker, and
//! the local user walks their own marker around with the W/A/S/D keys.  A
//! server (not part of this workspace) relays positions between users.
//!
//! This crate (`mapwalk-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – How messages travel over the WebSocket.  Inbound frames
//!   are JSON envelopes (`{"msgType": ..., "data": ...}`) decoded once into
//!   the typed [`ServerMessage`] enum; outbound frames are small JSON objects.
//!
//! - **`domain`** – Coordinates ([`LatLng`], [`LocalPosition`]) and the
//!   marker table that tracks which users have a marker on the map.
//!
//! - **`keymap`** – Which keys move the local user and by how much.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `mapwalk_core::LatLng` instead of `mapwalk_core::domain::geo::LatLng`.
pub use domain::geo::{LatLng, LocalPosition, StepDelta};
pub use domain::markers::{MarkerSlot, MarkerTable, UserId};
pub use keymap::{KeyInput, MoveKey};
pub use protocol::codec::{
    decode_server_message, encode_announcement, encode_movement, encode_server_message,
    ProtocolError,
};
pub use protocol::messages::ServerMessage;
