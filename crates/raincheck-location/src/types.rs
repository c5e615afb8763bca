use serde::{Deserialize, Serialize};

/// Geographic coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Canonical key for equality comparison. Two coordinates are the same
    /// location iff their keys match.
    pub fn key(&self) -> CoordKey {
        CoordKey(format!("{:.6},{:.6}", self.lat, self.lng))
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

/// Fixed 6-decimal string key for a coordinate.
///
/// Rounding to 6 decimals (~0.1 m) collapses float noise so that repeated
/// events for the same spot compare equal regardless of source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoordKey(String);

impl CoordKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CoordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The single map marker. At most one exists per surface; once created it is
/// repositioned in place rather than recreated.
#[derive(Debug, Clone, Copy)]
pub struct Marker {
    pub coordinate: Coordinate,
    pub draggable: bool,
}

impl Marker {
    pub(crate) fn at(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            draggable: true,
        }
    }
}

/// Where a coordinate event came from. Determines whether the event is
/// re-emitted upward and whether a reverse-geocode lookup is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    /// Tap/click on the map surface
    Pointer,
    /// Marker drag-end
    Drag,
    /// Device geolocation fix
    Device,
    /// Externally supplied position (host prop, search result)
    External,
}

impl EventSource {
    /// User-initiated sources emit the coordinate upward and schedule reverse
    /// geocoding; external updates do neither, so a host-driven position can
    /// never echo back as a fresh selection.
    pub fn is_user_initiated(&self) -> bool {
        !matches!(self, EventSource::External)
    }

    /// Drag-end keeps the viewport where the user left it.
    pub fn recenters(&self) -> bool {
        !matches!(self, EventSource::Drag)
    }
}

/// A reverse-geocode lookup to be dispatched by the service layer.
///
/// Tagged with the canonical key so the response can be discarded if the
/// location has moved on by the time it arrives.
#[derive(Debug, Clone)]
pub struct GeocodeRequest {
    pub coordinate: Coordinate,
    pub key: CoordKey,
}

/// Human-readable place information for a coordinate. Transient, not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalityInfo {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
    pub locality: Option<String>,
}

/// Device geolocation errors
#[derive(Debug, thiserror::Error)]
pub enum GeolocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Geolocation is not supported on this device")]
    Unsupported,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Place-name search errors
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Search service returned status {0}")]
    Status(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_fixed_six_decimals() {
        let c = Coordinate::new(40.0, -3.0);
        assert_eq!(c.key().as_str(), "40.000000,-3.000000");
    }

    #[test]
    fn test_keys_collapse_sub_micro_degree_noise() {
        let a = Coordinate::new(51.5000001, -0.1200004);
        let b = Coordinate::new(51.5, -0.12);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_distinct_locations_have_distinct_keys() {
        let a = Coordinate::new(51.5, -0.12);
        let b = Coordinate::new(51.5, -0.13);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_marker_is_draggable_once_created() {
        let m = Marker::at(Coordinate::new(1.0, 2.0));
        assert!(m.draggable);
    }

    #[test]
    fn test_external_source_is_not_user_initiated() {
        assert!(EventSource::Pointer.is_user_initiated());
        assert!(EventSource::Drag.is_user_initiated());
        assert!(EventSource::Device.is_user_initiated());
        assert!(!EventSource::External.is_user_initiated());
    }

    #[test]
    fn test_only_drag_skips_recenter() {
        assert!(EventSource::Pointer.recenters());
        assert!(!EventSource::Drag.recenters());
        assert!(EventSource::Device.recenters());
        assert!(EventSource::External.recenters());
    }
}
