//! Use case: run one session against the relay server.
//!
//! # Lifecycle
//!
//! ```text
//!  Connecting ──on_open──▶ Open ──on_close──▶ Closed (terminal)
//! ```
//!
//! `on_open` renders the map around the reference point and picks a random
//! starting coordinate near it.  While the session is open, each inbound
//! text frame is decoded once into a [`ServerMessage`] and dispatched to
//! exactly one handler.  Once closed, frames and keys are refused.
//!
//! # Failure isolation
//!
//! [`SessionClient::on_text`] returns an error for a frame it could not
//! process, but never leaves the session in a half-updated phase: the host
//! logs the error and carries on with the next frame.

use mapwalk_core::domain::geo::random_start;
use mapwalk_core::protocol::messages::{Roster, UserPosition};
use mapwalk_core::{
    decode_server_message, encode_announcement, KeyInput, LatLng, MarkerSlot, ProtocolError,
    ServerMessage, UserId,
};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::input_controller::{handle_key, KeyOutcome};
use crate::application::map_view::{MapView, MarkerHandle, ViewError};
use crate::application::session::{ConnectionPhase, SessionSettings, SessionState};

// ── Outbound channel ──────────────────────────────────────────────────────────

/// Error returned when a frame cannot be handed to the connection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The connection has gone away.
    #[error("connection is closed")]
    Closed,
}

/// Fire-and-forget text sender for the active connection.
///
/// Implementations queue the frame and return immediately; there is no
/// acknowledgement and no timeout.
pub trait Outbound {
    fn send_text(&mut self, text: String) -> Result<(), SendError>;
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Error type for session processing.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The frame could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The map view refused an operation.
    #[error("map view error: {0}")]
    View(#[from] ViewError),

    /// A frame could not be sent.
    #[error("send error: {0}")]
    Send(#[from] SendError),

    /// A frame arrived while the session was not open.
    #[error("session is not open (phase {0:?})")]
    NotOpen(ConnectionPhase),

    /// A lifecycle event arrived in the wrong phase.
    #[error("cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        from: ConnectionPhase,
        to: ConnectionPhase,
    },
}

// ── SessionClient ─────────────────────────────────────────────────────────────

/// Owns the session state, the map view, and the outbound sender.
pub struct SessionClient<V, O> {
    state: SessionState,
    settings: SessionSettings,
    view: V,
    outbound: O,
}

impl<V: MapView, O: Outbound> SessionClient<V, O> {
    pub fn new(settings: SessionSettings, view: V, outbound: O) -> Self {
        Self {
            state: SessionState::new(),
            settings,
            view,
            outbound,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn outbound(&self) -> &O {
        &self.outbound
    }

    pub fn outbound_mut(&mut self) -> &mut O {
        &mut self.outbound
    }

    pub fn is_closed(&self) -> bool {
        self.state.phase() == ConnectionPhase::Closed
    }

    /// Handles the connection opening.
    ///
    /// Renders the map centered on the reference point and places the local
    /// user at a random coordinate within the configured jitter.  Returns
    /// that starting coordinate.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidTransition`] unless the session is still
    ///   connecting.
    /// - [`SessionError::View`] if the map cannot be rendered; the session
    ///   stays in `Connecting`.
    pub fn on_open<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<LatLng, SessionError> {
        let phase = self.state.phase();
        if phase != ConnectionPhase::Connecting {
            return Err(SessionError::InvalidTransition {
                from: phase,
                to: ConnectionPhase::Open,
            });
        }

        let handle = self.view.render(
            &self.settings.container,
            self.settings.reference,
            self.settings.zoom,
            self.settings.mode,
        )?;
        let start = random_start(self.settings.reference, self.settings.start_jitter, rng);
        self.state.mark_open(handle, start);

        info!(%start, zoom = self.settings.zoom, mode = %self.settings.mode, "session open");
        Ok(start)
    }

    /// Handles the connection closing.  There is no recovery.
    pub fn on_close(&mut self) {
        if self.is_closed() {
            return;
        }
        self.state.mark_closed();
        info!("connection closed; session ended");
    }

    /// Decodes and dispatches one inbound text frame.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotOpen`] if the session is not open.
    /// - [`SessionError::Protocol`] if the frame is malformed.
    /// - [`SessionError::View`] / [`SessionError::Send`] if the handler for
    ///   that message could not finish.
    pub fn on_text(&mut self, text: &str) -> Result<(), SessionError> {
        if !self.state.is_open() {
            return Err(SessionError::NotOpen(self.state.phase()));
        }
        let msg = decode_server_message(text)?;
        self.handle_message(msg)
    }

    /// Dispatches one decoded message to its handler.
    ///
    /// # Errors
    ///
    /// See [`on_text`](Self::on_text).
    pub fn handle_message(&mut self, msg: ServerMessage) -> Result<(), SessionError> {
        if !self.state.is_open() {
            return Err(SessionError::NotOpen(self.state.phase()));
        }
        debug!(kind = msg.kind(), "dispatching");

        match msg {
            ServerMessage::YourId(id) => self.on_your_id(id),
            ServerMessage::Everyone(roster) => self.on_everyone(roster),
            ServerMessage::UserJoined(id) => self.on_user_joined(id),
            ServerMessage::UserDisconnected(id) => self.on_user_disconnected(&id),
            ServerMessage::UpdateCoordinates(update) => self.on_update_coordinates(update),
            ServerMessage::Unknown(kind) => {
                debug!(kind = %kind, "ignoring unknown message kind");
                Ok(())
            }
        }
    }

    /// Applies one key event.  See [`handle_key`].
    pub fn on_key(&mut self, input: KeyInput) -> KeyOutcome {
        handle_key(input, &mut self.state, &mut self.view, &mut self.outbound)
    }

    // ── Handlers ──────────────────────────────────────────────────────────────

    fn on_your_id(&mut self, id: UserId) -> Result<(), SessionError> {
        if self.state.assign_local_id(id.clone()) {
            info!(id = %id, "identifier assigned");
        } else if self.state.local_id() != Some(&id) {
            warn!(
                kept = ?self.state.local_id(),
                offered = %id,
                "identifier already assigned; keeping the first"
            );
        }

        let Some(position) = self.state.local_position() else {
            warn!("no local position to announce");
            return Ok(());
        };
        let frame = encode_announcement(position)?;
        self.outbound.send_text(frame)?;
        debug!(%position, "announced starting position");
        Ok(())
    }

    fn on_everyone(&mut self, roster: Roster) -> Result<(), SessionError> {
        let Some(view) = self.state.view() else {
            return Err(ViewError::NotRendered.into());
        };
        let local_id = self.state.local_id().cloned();

        let mut failed = 0usize;
        for entry in roster.users.into_values() {
            if local_id.as_ref() == Some(&entry.id) {
                continue;
            }
            match self.view.create_marker(view, entry.position(), None) {
                Ok(marker) => self.bind_marker(entry.id, marker),
                Err(e) => {
                    warn!(id = %entry.id, error = %e, "failed to place roster marker");
                    failed += 1;
                }
            }
        }

        match (local_id, self.state.local_position()) {
            (Some(id), Some(position)) => {
                let icon = Some(self.settings.local_icon.clone());
                let marker = self.view.create_marker(view, position, icon)?;
                self.bind_marker(id, marker);
            }
            (None, _) => warn!("roster arrived before identifier; local marker not placed"),
            (Some(_), None) => warn!("no local position; local marker not placed"),
        }

        info!(
            markers = self.state.markers().materialized_count(),
            failed, "roster applied"
        );
        Ok(())
    }

    /// Resets `id` to a placeholder.
    ///
    /// Deliberately stricter than a bare slot reset: a marker already on the
    /// map for `id` is taken off the map as well, so the next position
    /// update cannot leave an orphaned second marker behind.
    fn on_user_joined(&mut self, id: UserId) -> Result<(), SessionError> {
        debug!(id = %id, "user joined");
        if let Some(displaced) = self.state.markers_mut().mark_placeholder(id.clone()) {
            warn!(
                id = %id,
                "join for a user already on the map; removing the old marker and resetting to placeholder"
            );
            self.view.remove_from_view(displaced)?;
        }
        Ok(())
    }

    fn on_user_disconnected(&mut self, id: &UserId) -> Result<(), SessionError> {
        match self.state.markers_mut().remove_materialized(id.as_str()) {
            Some(marker) => {
                debug!(id = %id, "user disconnected");
                self.view.remove_from_view(marker)?;
            }
            None => debug!(id = %id, "disconnect for a user with no marker"),
        }
        Ok(())
    }

    fn on_update_coordinates(&mut self, update: UserPosition) -> Result<(), SessionError> {
        let position = update.position();
        match self.state.markers().slot(update.id.as_str()) {
            MarkerSlot::Materialized(marker) => {
                self.view.set_position(marker, position)?;
            }
            MarkerSlot::Placeholder | MarkerSlot::Absent => {
                let view = self.state.view().ok_or(ViewError::NotRendered)?;
                let marker = self.view.create_marker(view, position, None)?;
                self.bind_marker(update.id, marker);
            }
        }
        Ok(())
    }

    /// Stores `marker` for `id`, taking any marker it replaces off the map.
    fn bind_marker(&mut self, id: UserId, marker: MarkerHandle) {
        if let Some(previous) = self.state.markers_mut().materialize(id, marker) {
            if let Err(e) = self.view.remove_from_view(previous) {
                warn!(error = %e, "failed to remove replaced marker");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
