//! mapwalk-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the client do? (for beginners)
//!
//! Every connected user is a marker on a shared map.  The client:
//!
//! 1. Opens a WebSocket to the relay server and renders the map around a
//!    random starting point.
//! 2. Learns its own identifier (`"Your ID"`) and announces where it starts.
//! 3. Draws everyone else from the roster (`"Everyone"`), plus its own marker
//!    with a distinct icon.
//! 4. Keeps the map in sync as users join, move, and leave.
//! 5. Moves its own marker on W/A/S/D and tells the server about each step.
//!
//! # Layers
//!
//! ```text
//! application/     SessionClient, input handling, the MapView trait
//! infrastructure/  WebSocket task, stdin keys, concrete map views, config file
//! ```
//!
//! The application layer never touches a socket or a widget directly; it
//! talks to the [`application::map_view::MapView`] and
//! [`application::session_client::Outbound`] traits, which the
//! infrastructure layer implements.

/// Application layer: session state, message dispatch, movement keys.
pub mod application;

/// Infrastructure layer: network, keyboard, map views, configuration.
pub mod infrastructure;
