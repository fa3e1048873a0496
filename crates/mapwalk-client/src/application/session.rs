//! Per-connection session state.
//!
//! There is exactly one [`SessionState`] per process.  It is owned by the
//! [`SessionClient`](super::session_client::SessionClient) and lent by
//! `&mut` to the input controller, so nothing here needs a lock.
//!
//! Mutators that drive the lifecycle are `pub(crate)`: only the application
//! layer may move the session between phases.

use mapwalk_core::{LatLng, LocalPosition, MarkerTable, UserId};

use crate::application::map_view::{MapMode, MarkerHandle, MarkerIcon, ViewHandle};
use mapwalk_core::domain::geo::{DEFAULT_REFERENCE, DEFAULT_START_JITTER_DEG};

/// Where the connection is in its (one-way) lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionPhase {
    #[default]
    Connecting,
    Open,
    /// Terminal.  Nothing is processed after this.
    Closed,
}

/// Everything the client knows about the current session.
#[derive(Debug, Default)]
pub struct SessionState {
    phase: ConnectionPhase,
    local_id: Option<UserId>,
    local_position: Option<LocalPosition>,
    view: Option<ViewHandle>,
    markers: MarkerTable<MarkerHandle>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == ConnectionPhase::Open
    }

    /// The identifier the server gave us, once it has.
    pub fn local_id(&self) -> Option<&UserId> {
        self.local_id.as_ref()
    }

    /// The local user's current coordinate, once the connection has opened.
    pub fn local_position(&self) -> Option<LatLng> {
        self.local_position.as_ref().map(LocalPosition::current)
    }

    /// The random anchor the local user started from.
    pub fn start_position(&self) -> Option<LatLng> {
        self.local_position.as_ref().map(LocalPosition::anchor)
    }

    pub fn view(&self) -> Option<ViewHandle> {
        self.view
    }

    pub fn markers(&self) -> &MarkerTable<MarkerHandle> {
        &self.markers
    }

    /// Assigns the local identifier if none is set yet.
    ///
    /// Returns `true` if `id` was taken, `false` if an identifier was
    /// already assigned (the first assignment wins).
    pub fn assign_local_id(&mut self, id: UserId) -> bool {
        if self.local_id.is_some() {
            return false;
        }
        self.local_id = Some(id);
        true
    }

    /// Moves to `Open` with a rendered view and a starting coordinate.
    pub(crate) fn mark_open(&mut self, view: ViewHandle, start: LatLng) {
        self.phase = ConnectionPhase::Open;
        self.view = Some(view);
        self.local_position = Some(LocalPosition::new(start));
    }

    pub(crate) fn mark_closed(&mut self) {
        self.phase = ConnectionPhase::Closed;
    }

    pub(crate) fn local_position_mut(&mut self) -> Option<&mut LocalPosition> {
        self.local_position.as_mut()
    }

    pub(crate) fn markers_mut(&mut self) -> &mut MarkerTable<MarkerHandle> {
        &mut self.markers
    }
}

/// How the session renders the map and picks its starting point.
///
/// Built from the configuration file; see
/// [`ClientConfig::to_settings`](crate::infrastructure::storage::config::ClientConfig::to_settings).
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Name of the element the map is rendered into.
    pub container: String,
    /// Centre of the random start area.
    pub reference: LatLng,
    /// Maximum start offset from `reference`, in degrees, on each axis.
    pub start_jitter: f64,
    pub zoom: u8,
    pub mode: MapMode,
    /// Icon for the local user's marker.
    pub local_icon: MarkerIcon,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            container: "map".to_string(),
            reference: DEFAULT_REFERENCE,
            start_jitter: DEFAULT_START_JITTER_DEG,
            zoom: 13,
            mode: MapMode::Hybrid,
            local_icon: MarkerIcon::default(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
