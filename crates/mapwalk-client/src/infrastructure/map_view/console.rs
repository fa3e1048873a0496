//! Headless map view for the terminal.
//!
//! There is no widget to draw on, so each operation is written to the log:
//! render and marker lifecycle at `info`, moves and pans at `debug`.  The
//! marker bookkeeping is real, which means handle misuse is reported exactly
//! as a graphical view would report it.

use mapwalk_core::LatLng;
use tracing::{debug, info};

use crate::application::map_view::{
    MapMode, MapView, MarkerHandle, MarkerIcon, ViewError, ViewHandle,
};
use crate::infrastructure::map_view::MarkerLayer;

/// A [`MapView`] that logs instead of drawing.
#[derive(Debug, Default)]
pub struct ConsoleMapView {
    layer: MarkerLayer,
}

impl ConsoleMapView {
    pub fn new() -> Self {
        Self::default()
    }

    /// The map state as it would be displayed.
    pub fn layer(&self) -> &MarkerLayer {
        &self.layer
    }
}

impl MapView for ConsoleMapView {
    fn render(
        &mut self,
        container: &str,
        center: LatLng,
        zoom: u8,
        mode: MapMode,
    ) -> Result<ViewHandle, ViewError> {
        let handle = self.layer.render(container, center, zoom, mode);
        info!(container, %center, zoom, %mode, "map rendered");
        Ok(handle)
    }

    fn create_marker(
        &mut self,
        view: ViewHandle,
        position: LatLng,
        icon: Option<MarkerIcon>,
    ) -> Result<MarkerHandle, ViewError> {
        let icon_url = icon.as_ref().map(|i| i.url.clone());
        let marker = self.layer.create_marker(view, position, icon)?;
        info!(
            marker = marker.0,
            %position,
            icon = icon_url.as_deref().unwrap_or("default"),
            on_map = self.layer.markers().len(),
            "marker placed"
        );
        Ok(marker)
    }

    fn set_position(&mut self, marker: MarkerHandle, position: LatLng) -> Result<(), ViewError> {
        self.layer.set_position(marker, position)?;
        debug!(marker = marker.0, %position, "marker moved");
        Ok(())
    }

    fn remove_from_view(&mut self, marker: MarkerHandle) -> Result<(), ViewError> {
        self.layer.remove(marker)?;
        info!(
            marker = marker.0,
            on_map = self.layer.markers().len(),
            "marker removed"
        );
        Ok(())
    }

    fn pan_to(&mut self, view: ViewHandle, position: LatLng) -> Result<(), ViewError> {
        self.layer.pan_to(view, position)?;
        debug!(%position, "map recentered");
        Ok(())
    }
}
