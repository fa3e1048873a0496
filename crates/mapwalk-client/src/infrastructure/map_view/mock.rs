//! Recording map view for testing.
//!
//! `RecordingMapView` keeps real marker bookkeeping (through
//! [`MarkerLayer`]) and also appends every call to `calls`, so a test can
//! assert both on the final state of the map and on the exact sequence of
//! operations that produced it.
//!
//! # `should_fail` flag
//!
//! Set `should_fail = true` to make every method return
//! [`ViewError::Platform`] without touching the map.

use mapwalk_core::LatLng;

use crate::application::map_view::{
    MapMode, MapView, MarkerHandle, MarkerIcon, ViewError, ViewHandle,
};
use crate::infrastructure::map_view::{MarkerLayer, PlacedMarker};

/// One recorded [`MapView`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    Render {
        container: String,
        center: LatLng,
        zoom: u8,
        mode: MapMode,
    },
    CreateMarker {
        view: ViewHandle,
        position: LatLng,
        icon: Option<MarkerIcon>,
    },
    SetPosition {
        marker: MarkerHandle,
        position: LatLng,
    },
    RemoveFromView {
        marker: MarkerHandle,
    },
    PanTo {
        view: ViewHandle,
        position: LatLng,
    },
}

/// A map view that records every call.
#[derive(Debug, Default)]
pub struct RecordingMapView {
    /// Every call, in order, including failed ones.
    pub calls: Vec<ViewCall>,
    /// When `true`, every method returns an error.
    pub should_fail: bool,
    layer: MarkerLayer,
}

impl RecordingMapView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(&self) -> &MarkerLayer {
        &self.layer
    }

    /// Markers currently on the map, in creation order.
    pub fn live_markers(&self) -> Vec<(MarkerHandle, PlacedMarker)> {
        self.layer
            .markers()
            .iter()
            .map(|(handle, placed)| (*handle, placed.clone()))
            .collect()
    }

    /// Live markers at exactly `position`.
    pub fn markers_at(&self, position: LatLng) -> Vec<MarkerHandle> {
        self.layer
            .markers()
            .iter()
            .filter(|(_, placed)| placed.position == position)
            .map(|(handle, _)| *handle)
            .collect()
    }

    /// Number of recorded calls matching `pred`.
    pub fn count_calls(&self, pred: impl Fn(&ViewCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    fn fail_if_requested(&self) -> Result<(), ViewError> {
        if self.should_fail {
            return Err(ViewError::Platform("mock failure".into()));
        }
        Ok(())
    }
}

impl MapView for RecordingMapView {
    fn render(
        &mut self,
        container: &str,
        center: LatLng,
        zoom: u8,
        mode: MapMode,
    ) -> Result<ViewHandle, ViewError> {
        self.calls.push(ViewCall::Render {
            container: container.to_string(),
            center,
            zoom,
            mode,
        });
        self.fail_if_requested()?;
        Ok(self.layer.render(container, center, zoom, mode))
    }

    fn create_marker(
        &mut self,
        view: ViewHandle,
        position: LatLng,
        icon: Option<MarkerIcon>,
    ) -> Result<MarkerHandle, ViewError> {
        self.calls.push(ViewCall::CreateMarker {
            view,
            position,
            icon: icon.clone(),
        });
        self.fail_if_requested()?;
        self.layer.create_marker(view, position, icon)
    }

    fn set_position(&mut self, marker: MarkerHandle, position: LatLng) -> Result<(), ViewError> {
        self.calls.push(ViewCall::SetPosition { marker, position });
        self.fail_if_requested()?;
        self.layer.set_position(marker, position)
    }

    fn remove_from_view(&mut self, marker: MarkerHandle) -> Result<(), ViewError> {
        self.calls.push(ViewCall::RemoveFromView { marker });
        self.fail_if_requested()?;
        self.layer.remove(marker)
    }

    fn pan_to(&mut self, view: ViewHandle, position: LatLng) -> Result<(), ViewError> {
        self.calls.push(ViewCall::PanTo { view, position });
        self.fail_if_requested()?;
        self.layer.pan_to(view, position)
    }
}
