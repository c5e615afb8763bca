//! Map surface: owns the viewport and the single mutable marker.
//!
//! The surface is a leaf. It knows nothing about geocoding or the host; the
//! coordinator instructs it via position/zoom intents and it never dispatches
//! work of its own.

use crate::types::{Coordinate, Marker};

/// Viewport configuration supplied once at mount.
#[derive(Debug, Clone)]
pub struct MapConfig {
    pub center: Coordinate,
    pub zoom: u8,
    /// Pixel height of the host container. Zero means the container is not
    /// attached yet and the mount is deferred.
    pub height_px: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: Coordinate::new(0.0, 0.0),
            zoom: 2,
            height_px: 400,
        }
    }
}

/// Outcome of a marker placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerPlacement {
    Created,
    Moved,
}

#[derive(Debug, Clone)]
struct Viewport {
    center: Coordinate,
    zoom: u8,
    height_px: u32,
}

/// A pannable/zoomable map with at most one marker.
#[derive(Debug, Default)]
pub struct MapSurface {
    viewport: Option<Viewport>,
    marker: Option<Marker>,
    size_revalidation_armed: bool,
}

impl MapSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize the viewport. Initializes exactly once: a surface that is
    /// already mounted ignores further mounts, so re-renders cannot reset the
    /// viewport or tear down interaction state. A zero height means the host
    /// container is not attached yet; the mount no-ops and the surface stays
    /// uninitialized until a later mount supplies a real height.
    pub fn mount(&mut self, config: &MapConfig) {
        if self.viewport.is_some() {
            tracing::debug!("map already mounted, ignoring re-mount");
            return;
        }
        if config.height_px == 0 {
            tracing::debug!("map container not attached yet, deferring mount");
            return;
        }
        self.viewport = Some(Viewport {
            center: config.center,
            zoom: config.zoom,
            height_px: config.height_px,
        });
        // Layout reflow after the initial paint can leave the viewport with a
        // stale pixel size; a one-shot revalidation shortly after mount
        // corrects it.
        self.size_revalidation_armed = true;
        tracing::info!(
            "map mounted at {} zoom {}",
            config.center,
            config.zoom
        );
    }

    pub fn is_mounted(&self) -> bool {
        self.viewport.is_some()
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    pub fn center(&self) -> Option<Coordinate> {
        self.viewport.as_ref().map(|v| v.center)
    }

    pub fn zoom(&self) -> Option<u8> {
        self.viewport.as_ref().map(|v| v.zoom)
    }

    pub fn height_px(&self) -> Option<u32> {
        self.viewport.as_ref().map(|v| v.height_px)
    }

    /// Create the marker on first use, reposition it in place thereafter.
    pub fn place_marker(&mut self, coordinate: Coordinate) -> MarkerPlacement {
        match self.marker.as_mut() {
            Some(marker) => {
                marker.coordinate = coordinate;
                MarkerPlacement::Moved
            }
            None => {
                self.marker = Some(Marker::at(coordinate));
                MarkerPlacement::Created
            }
        }
    }

    /// Re-center the viewport at the current zoom.
    pub fn recenter(&mut self, coordinate: Coordinate) {
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.center = coordinate;
        }
    }

    /// One-shot pixel-size correction after mount. Returns true if the height
    /// was applied; once disarmed, later calls are ignored.
    pub fn revalidate_size(&mut self, height_px: u32) -> bool {
        if !self.size_revalidation_armed {
            return false;
        }
        let Some(viewport) = self.viewport.as_mut() else {
            return false;
        };
        viewport.height_px = height_px;
        self.size_revalidation_armed = false;
        true
    }

    /// Destroy the map instance and release interaction state. Safe to call
    /// multiple times.
    pub fn teardown(&mut self) {
        self.viewport = None;
        self.marker = None;
        self.size_revalidation_armed = false;
    }

    /// Simulates the marker being lost across a re-render boundary.
    #[cfg(test)]
    pub(crate) fn clear_marker(&mut self) {
        self.marker = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted() -> MapSurface {
        let mut surface = MapSurface::new();
        surface.mount(&MapConfig::default());
        surface
    }

    #[test]
    fn test_mount_initializes_viewport_once() {
        let mut surface = MapSurface::new();
        surface.mount(&MapConfig {
            center: Coordinate::new(40.0, -3.0),
            zoom: 6,
            height_px: 400,
        });
        assert!(surface.is_mounted());

        // A second mount must not reset the viewport
        surface.recenter(Coordinate::new(51.5, -0.12));
        surface.mount(&MapConfig::default());
        assert_eq!(surface.center(), Some(Coordinate::new(51.5, -0.12)));
        assert_eq!(surface.zoom(), Some(6));
    }

    #[test]
    fn test_mount_defers_when_container_not_attached() {
        let mut surface = MapSurface::new();
        surface.mount(&MapConfig {
            height_px: 0,
            ..MapConfig::default()
        });
        assert!(!surface.is_mounted());

        // Next render cycle resupplies a container
        surface.mount(&MapConfig::default());
        assert!(surface.is_mounted());
    }

    #[test]
    fn test_marker_created_then_moved_in_place() {
        let mut surface = mounted();
        assert_eq!(
            surface.place_marker(Coordinate::new(1.0, 1.0)),
            MarkerPlacement::Created
        );
        assert_eq!(
            surface.place_marker(Coordinate::new(2.0, 2.0)),
            MarkerPlacement::Moved
        );
        let marker = surface.marker().unwrap();
        assert_eq!(marker.coordinate, Coordinate::new(2.0, 2.0));
        assert!(marker.draggable);
    }

    #[test]
    fn test_recenter_keeps_zoom() {
        let mut surface = mounted();
        surface.recenter(Coordinate::new(40.0, -3.0));
        assert_eq!(surface.center(), Some(Coordinate::new(40.0, -3.0)));
        assert_eq!(surface.zoom(), Some(2));
    }

    #[test]
    fn test_size_revalidation_is_one_shot() {
        let mut surface = mounted();
        assert!(surface.revalidate_size(512));
        assert_eq!(surface.height_px(), Some(512));
        assert!(!surface.revalidate_size(768));
        assert_eq!(surface.height_px(), Some(512));
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut surface = mounted();
        surface.place_marker(Coordinate::new(1.0, 1.0));
        surface.teardown();
        assert!(!surface.is_mounted());
        assert!(surface.marker().is_none());
        surface.teardown();
        assert!(!surface.is_mounted());
    }

    #[test]
    fn test_unmounted_surface_ignores_size_revalidation() {
        let mut surface = MapSurface::new();
        assert!(!surface.revalidate_size(300));
    }
}
