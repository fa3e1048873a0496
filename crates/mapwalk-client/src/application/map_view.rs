//! The map widget, seen from the application layer.
//!
//! The client never draws anything itself.  It asks a [`MapView`] to render
//! a map, place markers, move them, and recenter.  Each concrete widget
//! (a headless console view, a recording view for tests, a real GUI map)
//! implements this trait in the infrastructure layer.
//!
//! Handles are opaque numbers minted by the view.  The application stores
//! them in the session's marker table and hands them back on later calls.

use std::fmt;

use mapwalk_core::LatLng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies a rendered map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewHandle(pub u64);

/// Identifies a marker placed on a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// Base layer of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    Roadmap,
    Satellite,
    #[default]
    Hybrid,
    Terrain,
}

impl fmt::Display for MapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MapMode::Roadmap => "roadmap",
            MapMode::Satellite => "satellite",
            MapMode::Hybrid => "hybrid",
            MapMode::Terrain => "terrain",
        };
        f.write_str(name)
    }
}

/// A custom marker image, scaled to `width` × `height` pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerIcon {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self {
            url: "images/hibiscus.png".to_string(),
            width: 30,
            height: 30,
        }
    }
}

/// Error type for map view operations.
#[derive(Debug, Error)]
pub enum ViewError {
    /// A marker operation was attempted before `render`.
    #[error("map has not been rendered")]
    NotRendered,
    /// The view does not know this view handle.
    #[error("unknown view {0:?}")]
    UnknownView(ViewHandle),
    /// The view does not know this marker handle (already removed?).
    #[error("unknown marker {0:?}")]
    UnknownMarker(MarkerHandle),
    /// The underlying widget failed.
    #[error("platform error: {0}")]
    Platform(String),
}

/// Capability interface of a map widget.
///
/// Methods take `&mut self`: the whole client runs on one thread and each
/// event is handled to completion, so the view is never shared.
#[cfg_attr(test, mockall::automock)]
pub trait MapView {
    /// Renders a map into `container`, centered at `center`.
    fn render(
        &mut self,
        container: &str,
        center: LatLng,
        zoom: u8,
        mode: MapMode,
    ) -> Result<ViewHandle, ViewError>;

    /// Places a marker on `view`, optionally with a custom icon.
    fn create_marker(
        &mut self,
        view: ViewHandle,
        position: LatLng,
        icon: Option<MarkerIcon>,
    ) -> Result<MarkerHandle, ViewError>;

    /// Moves an existing marker.
    fn set_position(&mut self, marker: MarkerHandle, position: LatLng) -> Result<(), ViewError>;

    /// Takes a marker off the map.  The handle is dead afterwards.
    fn remove_from_view(&mut self, marker: MarkerHandle) -> Result<(), ViewError>;

    /// Recenters `view` on `position`.
    fn pan_to(&mut self, view: ViewHandle, position: LatLng) -> Result<(), ViewError>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
