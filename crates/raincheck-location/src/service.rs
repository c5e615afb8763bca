//! Async plumbing between the single-threaded coordinator owner and the
//! network collaborators.
//!
//! All network work runs on the tokio runtime; results are sent back over a
//! `std::sync::mpsc` channel that the owner drains on its own thread and
//! feeds into the coordinator. The coordinator itself never suspends.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::device::GeolocationProvider;
use crate::geocode::ReverseGeocoder;
use crate::search::{PlaceCandidate, PlaceSearch};
use crate::types::{CoordKey, Coordinate, GeocodeRequest, GeolocationError, LocalityInfo, SearchError};

/// Delay before the one-shot viewport size revalidation after mount.
pub const SIZE_REVALIDATE_DELAY: Duration = Duration::from_millis(100);

/// Messages sent from async operations back to the owning thread
#[derive(Debug)]
pub enum ServiceMessage {
    /// A reverse-geocode lookup finished. Carries the request's key so stale
    /// results can be discarded by the coordinator.
    LocalityResolved(CoordKey, Option<LocalityInfo>),
    /// A device geolocation request finished.
    DeviceFix(Result<Coordinate, GeolocationError>),
    /// A place-name search finished.
    SearchDone(Result<Vec<PlaceCandidate>, SearchError>),
    /// Time to run the post-mount viewport size correction.
    SizeRevalidate(u32),
}

/// Dispatch a reverse-geocode lookup for a coordinator-issued request.
/// Sends `LocalityResolved` on the channel when complete.
pub fn request_reverse_geocode(
    runtime: &Handle,
    tx: &Sender<ServiceMessage>,
    geocoder: Arc<ReverseGeocoder>,
    request: GeocodeRequest,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let info = geocoder.resolve(request.coordinate).await;
        let _ = tx.send(ServiceMessage::LocalityResolved(request.key, info));
    });
}

/// Request a single device location fix. A host without the capability passes
/// `None` and receives an immediate `Unsupported` error.
pub fn request_device_fix(
    runtime: &Handle,
    tx: &Sender<ServiceMessage>,
    provider: Option<Arc<dyn GeolocationProvider>>,
) {
    let tx = tx.clone();
    let Some(provider) = provider else {
        let _ = tx.send(ServiceMessage::DeviceFix(Err(GeolocationError::Unsupported)));
        return;
    };
    runtime.spawn(async move {
        let result = provider.current_position().await;
        match &result {
            Ok(fix) => tracing::info!("Got device fix: {}, {}", fix.lat, fix.lng),
            Err(e) => tracing::warn!("Device geolocation failed: {}", e),
        }
        let _ = tx.send(ServiceMessage::DeviceFix(result));
    });
}

/// Run a place-name search. Sends `SearchDone` on the channel when complete.
pub fn request_search(
    runtime: &Handle,
    tx: &Sender<ServiceMessage>,
    search: Arc<PlaceSearch>,
    query: &str,
) {
    let tx = tx.clone();
    let query = query.to_string();
    runtime.spawn(async move {
        let result = search.search(&query).await;
        let _ = tx.send(ServiceMessage::SearchDone(result));
    });
}

/// Schedule the one-shot post-mount size correction after a fixed short delay.
pub fn schedule_size_revalidation(runtime: &Handle, tx: &Sender<ServiceMessage>, height_px: u32) {
    let tx = tx.clone();
    runtime.spawn(async move {
        tokio::time::sleep(SIZE_REVALIDATE_DELAY).await;
        let _ = tx.send(ServiceMessage::SizeRevalidate(height_px));
    });
}
