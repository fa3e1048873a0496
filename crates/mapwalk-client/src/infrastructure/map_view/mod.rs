//! Concrete map views.
//!
//! - [`console::ConsoleMapView`] – headless view for the terminal binary.
//!   Every operation is logged through `tracing`.
//! - [`mock::RecordingMapView`] – records each call for test assertions and
//!   can be told to fail.
//!
//! Both keep their markers in a [`MarkerLayer`], which enforces the same
//! handle rules a real widget would: markers need a rendered map, and a
//! removed handle is dead.

pub mod console;
pub mod mock;

use std::collections::BTreeMap;

use mapwalk_core::LatLng;

use crate::application::map_view::{MapMode, MarkerHandle, MarkerIcon, ViewError, ViewHandle};

/// A marker as the view currently shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarker {
    pub position: LatLng,
    pub icon: Option<MarkerIcon>,
}

/// The rendered map's current framing.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFrame {
    pub handle: ViewHandle,
    pub container: String,
    pub center: LatLng,
    pub zoom: u8,
    pub mode: MapMode,
}

/// In-memory map state shared by the concrete views.
#[derive(Debug, Default)]
pub struct MarkerLayer {
    next_handle: u64,
    frame: Option<MapFrame>,
    markers: BTreeMap<MarkerHandle, PlacedMarker>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    pub fn frame(&self) -> Option<&MapFrame> {
        self.frame.as_ref()
    }

    /// Markers currently on the map.
    pub fn markers(&self) -> &BTreeMap<MarkerHandle, PlacedMarker> {
        &self.markers
    }

    pub fn marker(&self, handle: MarkerHandle) -> Option<&PlacedMarker> {
        self.markers.get(&handle)
    }

    /// Renders (or re-renders) the map.  Existing markers are cleared.
    pub fn render(
        &mut self,
        container: &str,
        center: LatLng,
        zoom: u8,
        mode: MapMode,
    ) -> ViewHandle {
        let handle = ViewHandle(self.mint());
        self.markers.clear();
        self.frame = Some(MapFrame {
            handle,
            container: container.to_string(),
            center,
            zoom,
            mode,
        });
        handle
    }

    pub fn create_marker(
        &mut self,
        view: ViewHandle,
        position: LatLng,
        icon: Option<MarkerIcon>,
    ) -> Result<MarkerHandle, ViewError> {
        self.check_view(view)?;
        let handle = MarkerHandle(self.mint());
        self.markers.insert(handle, PlacedMarker { position, icon });
        Ok(handle)
    }

    pub fn set_position(&mut self, marker: MarkerHandle, position: LatLng) -> Result<(), ViewError> {
        let placed = self
            .markers
            .get_mut(&marker)
            .ok_or(ViewError::UnknownMarker(marker))?;
        placed.position = position;
        Ok(())
    }

    pub fn remove(&mut self, marker: MarkerHandle) -> Result<(), ViewError> {
        self.markers
            .remove(&marker)
            .map(|_| ())
            .ok_or(ViewError::UnknownMarker(marker))
    }

    pub fn pan_to(&mut self, view: ViewHandle, position: LatLng) -> Result<(), ViewError> {
        self.check_view(view)?;
        if let Some(frame) = self.frame.as_mut() {
            frame.center = position;
        }
        Ok(())
    }

    fn check_view(&self, view: ViewHandle) -> Result<(), ViewError> {
        match &self.frame {
            None => Err(ViewError::NotRendered),
            Some(frame) if frame.handle != view => Err(ViewError::UnknownView(view)),
            Some(_) => Ok(()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const HERE: LatLng = LatLng::new(42.0, -71.0);

    #[test]
    fn test_marker_before_render_is_rejected() {
        let mut layer = MarkerLayer::new();

        let result = layer.create_marker(ViewHandle(1), HERE, None);

        assert!(matches!(result, Err(ViewError::NotRendered)));
    }

    #[test]
    fn test_marker_on_stale_view_is_rejected() {
        let mut layer = MarkerLayer::new();
        let first = layer.render("map", HERE, 13, MapMode::Hybrid);
        layer.render("map", HERE, 13, MapMode::Hybrid);

        let result = layer.create_marker(first, HERE, None);

        assert!(matches!(result, Err(ViewError::UnknownView(v)) if v == first));
    }

    #[test]
    fn test_create_move_remove_marker() {
        // Arrange
        let mut layer = MarkerLayer::new();
        let view = layer.render("map", HERE, 13, MapMode::Hybrid);
        let moved = LatLng::new(1.0, 2.0);

        // Act
        let marker = layer.create_marker(view, HERE, None).unwrap();
        layer.set_position(marker, moved).unwrap();
        let placed = layer.marker(marker).cloned();
        layer.remove(marker).unwrap();

        // Assert
        assert_eq!(placed.map(|m| m.position), Some(moved));
        assert!(layer.markers().is_empty());
        assert!(matches!(
            layer.remove(marker),
            Err(ViewError::UnknownMarker(m)) if m == marker
        ));
    }

    #[test]
    fn test_pan_moves_frame_center() {
        let mut layer = MarkerLayer::new();
        let view = layer.render("map", HERE, 13, MapMode::Hybrid);

        layer.pan_to(view, LatLng::new(5.0, 6.0)).unwrap();

        assert_eq!(layer.frame().unwrap().center, LatLng::new(5.0, 6.0));
    }

    #[test]
    fn test_handles_are_never_reused() {
        let mut layer = MarkerLayer::new();
        let view = layer.render("map", HERE, 13, MapMode::Hybrid);

        let a = layer.create_marker(view, HERE, None).unwrap();
        layer.remove(a).unwrap();
        let b = layer.create_marker(view, HERE, None).unwrap();

        assert_ne!(a, b);
    }
}
