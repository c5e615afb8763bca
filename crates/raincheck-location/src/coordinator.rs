//! Location coordinator: the single source of truth for "is this coordinate
//! new".
//!
//! All location sources (pointer, drag, device fix, external position) funnel
//! through [`Coordinator::handle_event`]. The coordinator de-duplicates by
//! canonical key, drives the map surface, and decides whether the event is
//! re-emitted upward and whether a reverse-geocode lookup is scheduled.
//!
//! The state machine has two states keyed by the last observed key and marker
//! existence: Empty (no key, no marker) and Located. The key is recorded
//! synchronously before any returned lookup can be dispatched, so a second
//! event for the same coordinate arriving while the first lookup is still in
//! flight is treated as a duplicate.

use crate::map::{MapConfig, MapSurface, MarkerPlacement};
use crate::search::PlaceCandidate;
use crate::types::{CoordKey, Coordinate, EventSource, GeocodeRequest, LocalityInfo};

/// Upward callbacks exposed by the core to the host view.
///
/// At most one observer is subscribed; replacing it swaps the cell, and the
/// cell is read only at dispatch time so the host always sees its latest
/// callbacks.
pub trait LocationObserver {
    /// A user-initiated source settled on a new location.
    fn on_location_selected(&mut self, coordinate: Coordinate);

    /// The marker came into existence (or was torn down with the map).
    fn on_marker_exists(&mut self, exists: bool);

    /// Reverse geocoding (or a search candidate) produced a place label.
    fn on_locality_resolved(&mut self, info: LocalityInfo);
}

/// Mediates between the map surface and the host view.
#[derive(Default)]
pub struct Coordinator {
    surface: MapSurface,
    last_observed: Option<CoordKey>,
    observer: Option<Box<dyn LocationObserver>>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount the owned map surface. Delegates the once-only semantics to the
    /// surface itself.
    pub fn mount(&mut self, config: &MapConfig) {
        self.surface.mount(config);
    }

    /// Subscribe the host's callbacks, replacing any previous subscriber.
    pub fn set_observer(&mut self, observer: Box<dyn LocationObserver>) {
        self.observer = Some(observer);
    }

    pub fn surface(&self) -> &MapSurface {
        &self.surface
    }

    pub fn last_observed_key(&self) -> Option<&CoordKey> {
        self.last_observed.as_ref()
    }

    /// Process a coordinate event from any source.
    ///
    /// Returns a [`GeocodeRequest`] when the caller should schedule a reverse
    /// geocode lookup: only for user-initiated sources at a genuinely new
    /// location. The caller hands the request to the service layer; the
    /// coordinator itself never blocks.
    pub fn handle_event(
        &mut self,
        source: EventSource,
        coordinate: Coordinate,
    ) -> Option<GeocodeRequest> {
        if !self.surface.is_mounted() {
            tracing::debug!("ignoring {source:?} event at {coordinate}: map not mounted");
            return None;
        }

        let key = coordinate.key();
        if self.last_observed.as_ref() == Some(&key) {
            if self.surface.marker().is_none() {
                // Marker lost across a re-render boundary; restore it without
                // treating this as a new user action.
                self.surface.place_marker(coordinate);
                self.notify_marker_exists(true);
            }
            tracing::debug!("ignoring duplicate {source:?} event for {key}");
            return None;
        }

        // Record the key before anything asynchronous can be dispatched so a
        // rapid second event at the same spot collapses into this one.
        self.last_observed = Some(key.clone());

        if self.surface.place_marker(coordinate) == MarkerPlacement::Created {
            self.notify_marker_exists(true);
        }
        if source.recenters() {
            self.surface.recenter(coordinate);
        }

        if source.is_user_initiated() {
            tracing::info!("location selected at {coordinate} via {source:?}");
            self.notify_location_selected(coordinate);
            Some(GeocodeRequest { coordinate, key })
        } else {
            tracing::debug!("external position applied at {coordinate}, no echo");
            None
        }
    }

    /// Externally-controlled position pushed down by the host. `None` leaves
    /// the marker where it is; `Some` routes through the external path, which
    /// never emits a selection and never geocodes.
    pub fn set_external_position(&mut self, position: Option<Coordinate>) {
        if let Some(coordinate) = position {
            self.handle_event(EventSource::External, coordinate);
        }
    }

    /// Apply the top candidate of a place-name search. The search response
    /// already carries an address breakdown, so the position is applied as an
    /// external update (no reverse-geocode round trip) and the candidate's own
    /// locality is published directly.
    pub fn apply_search_candidate(&mut self, candidate: &PlaceCandidate) {
        let coordinate = Coordinate::new(candidate.lat, candidate.lng);
        self.handle_event(EventSource::External, coordinate);
        self.notify_locality_resolved(candidate.locality_info());
    }

    /// Deliver the result of an asynchronous reverse-geocode lookup.
    ///
    /// A response whose key no longer matches the last observed key was
    /// superseded while in flight and is discarded. A matching response
    /// re-asserts the marker (a concurrent update may have removed it during
    /// the round trip) and publishes the locality. Never triggers another
    /// lookup.
    pub fn deliver_locality(&mut self, key: &CoordKey, info: Option<LocalityInfo>) {
        if self.last_observed.as_ref() != Some(key) {
            tracing::debug!("discarding stale reverse-geocode result for {key}");
            return;
        }

        let Some(info) = info else {
            // Lookup failed; the UI simply shows no locality text.
            return;
        };

        if self.surface.marker().is_none() {
            self.surface.place_marker(Coordinate::new(info.lat, info.lng));
            self.notify_marker_exists(true);
        }

        self.notify_locality_resolved(info);
    }

    /// One-shot viewport size correction, forwarded from the service layer.
    pub fn revalidate_size(&mut self, height_px: u32) {
        if self.surface.revalidate_size(height_px) {
            tracing::debug!("viewport size revalidated to {height_px}px");
        }
    }

    /// Tear down the owned surface. The marker shares the map's lifetime, so
    /// the host is told it no longer exists. Safe to call multiple times.
    pub fn teardown(&mut self) {
        let had_marker = self.surface.marker().is_some();
        self.surface.teardown();
        self.last_observed = None;
        if had_marker {
            self.notify_marker_exists(false);
        }
    }

    fn notify_location_selected(&mut self, coordinate: Coordinate) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_location_selected(coordinate);
        }
    }

    fn notify_marker_exists(&mut self, exists: bool) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_marker_exists(exists);
        }
    }

    fn notify_locality_resolved(&mut self, info: LocalityInfo) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_locality_resolved(info);
        }
    }
}
