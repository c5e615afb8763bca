//! Location selection for Raincheck
//!
//! Owns the interactive map surface, the single location marker, and the
//! coordination between the asynchronous location sources (pointer, device
//! geolocation, place-name search) and reverse geocoding.

pub mod coordinator;
pub mod device;
pub mod geocode;
pub mod map;
pub mod search;
pub mod service;
pub mod types;

pub use coordinator::{Coordinator, LocationObserver};
pub use device::{GeolocationProvider, UnsupportedGeolocation};
pub use geocode::ReverseGeocoder;
pub use map::{MapConfig, MapSurface, MarkerPlacement};
pub use search::{PlaceCandidate, PlaceSearch};
pub use service::{
    request_device_fix, request_reverse_geocode, request_search, schedule_size_revalidation,
    ServiceMessage, SIZE_REVALIDATE_DELAY,
};
pub use types::*;
