//! Infrastructure layer for the client.
//!
//! Contains the adapters that touch the outside world: the WebSocket
//! connection, the terminal, the map widget, and the configuration file.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `mapwalk_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`network`** – Opens the single WebSocket connection to the relay
//!   server, forwards inbound text frames as [`network::NetworkEvent`]s, and
//!   implements the application's `Outbound` trait over a channel.
//!   A `RecordingOutbound` is provided for tests.
//!
//! - **`keyboard`** – Reads key presses from stdin on a blocking thread and
//!   forwards them as `KeyInput`s.
//!
//! - **`map_view`** – Concrete `MapView` implementations: a headless
//!   `ConsoleMapView` that logs every operation, and a `RecordingMapView` for
//!   tests.
//!
//! - **`storage`** – TOML configuration file.

pub mod keyboard;
pub mod map_view;
pub mod network;
pub mod storage;
