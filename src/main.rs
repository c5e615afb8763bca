use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::Result;
use raincheck_core::error::{AppError, NetworkError, ReqwestErrorExt};
use raincheck_location::{
    request_device_fix, request_reverse_geocode, schedule_size_revalidation, Coordinate,
    Coordinator, EventSource, GeolocationError, LocalityInfo, LocationObserver, MapConfig,
    ReverseGeocoder, SearchError, ServiceMessage,
};

/// Prints the core's upward callbacks, standing in for a host view.
struct LogObserver;

impl LocationObserver for LogObserver {
    fn on_location_selected(&mut self, coordinate: Coordinate) {
        println!("Location selected: {}", coordinate);
    }

    fn on_marker_exists(&mut self, exists: bool) {
        println!("Marker exists: {}", exists);
    }

    fn on_locality_resolved(&mut self, info: LocalityInfo) {
        match info.locality {
            Some(locality) => println!("Resolved locality: {}", locality),
            None => println!("No locality for this point"),
        }
    }
}

/// Map search failures into the app error hierarchy at the binary boundary.
fn search_app_error(err: SearchError) -> AppError {
    match err {
        SearchError::Network(e) => AppError::Network(e.into_network_error()),
        SearchError::Status(status) => AppError::Network(NetworkError::ServerError {
            status,
            message: "place search failed".into(),
        }),
    }
}

/// Map geolocation failures into the app error hierarchy at the binary boundary.
fn geolocation_app_error(err: GeolocationError) -> AppError {
    AppError::Service(err.to_string())
}

fn main() -> Result<()> {
    // Initialize core
    raincheck_core::init()?;
    let (config, _validation) = raincheck_core::Config::load_validated()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let (tx, rx) = mpsc::channel();

    let mut coordinator = Coordinator::new();
    coordinator.mount(&MapConfig {
        center: Coordinate::new(config.map.center_lat, config.map.center_lng),
        zoom: config.map.zoom,
        height_px: config.map.height_px,
    });
    coordinator.set_observer(Box::new(LogObserver));
    schedule_size_revalidation(runtime.handle(), &tx, config.map.height_px);

    let geocoder = Arc::new(ReverseGeocoder::with_base_url(&config.geocoding.endpoint)?);

    tracing::info!("Raincheck demo started");
    println!("Raincheck - pick a point, get a place");

    // Simulate a tap on the map
    if let Some(request) =
        coordinator.handle_event(EventSource::Pointer, Coordinate::new(40.416775, -3.70379))
    {
        request_reverse_geocode(runtime.handle(), &tx, geocoder.clone(), request);
    }

    // No fix source in the demo host: produces an immediate capability notice
    request_device_fix(runtime.handle(), &tx, None);

    // Drain service messages until the tap's lookup resolves or times out
    while let Ok(message) = rx.recv_timeout(Duration::from_secs(15)) {
        match message {
            ServiceMessage::LocalityResolved(key, info) => {
                coordinator.deliver_locality(&key, info);
                break;
            }
            ServiceMessage::SizeRevalidate(height_px) => coordinator.revalidate_size(height_px),
            ServiceMessage::DeviceFix(Ok(fix)) => {
                if let Some(request) = coordinator.handle_event(EventSource::Device, fix) {
                    request_reverse_geocode(runtime.handle(), &tx, geocoder.clone(), request);
                }
            }
            ServiceMessage::DeviceFix(Err(e)) => {
                println!("{}", geolocation_app_error(e).user_message());
            }
            ServiceMessage::SearchDone(Ok(candidates)) => {
                if let Some(candidate) = candidates.first() {
                    coordinator.apply_search_candidate(candidate);
                }
            }
            ServiceMessage::SearchDone(Err(e)) => {
                println!("{}", search_app_error(e).user_message());
            }
        }
    }

    coordinator.teardown();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_server_error_maps_to_5xx_message() {
        let err = search_app_error(SearchError::Status(503));
        assert!(matches!(
            err,
            AppError::Network(NetworkError::ServerError { status: 503, .. })
        ));
        assert_eq!(
            err.user_message(),
            "The server is experiencing issues. Please try again later."
        );
    }

    #[test]
    fn test_search_client_error_maps_to_retry_message() {
        let err = search_app_error(SearchError::Status(404));
        assert_eq!(err.user_message(), "The request failed. Please try again.");
    }

    #[test]
    fn test_geolocation_failure_maps_to_service_error() {
        let err = geolocation_app_error(GeolocationError::Unsupported);
        assert!(matches!(err, AppError::Service(_)));
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    }
}
