//! Application layer for the client.
//!
//! # What use cases does the client have?
//!
//! - **`session_client`** – Owns the session: reacts to the connection
//!   opening and closing, and turns each inbound [`ServerMessage`] into marker
//!   mutations on the map.
//!
//! - **`input_controller`** – Turns a movement key into a new local
//!   coordinate, moves the local marker, recenters the map, and sends the
//!   update to the server.
//!
//! Both use cases work against the [`map_view::MapView`] trait; concrete
//! views live in the infrastructure layer.
//!
//! [`ServerMessage`]: mapwalk_core::ServerMessage

pub mod input_controller;
pub mod map_view;
pub mod session;
pub mod session_client;
