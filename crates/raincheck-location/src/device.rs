//! Device geolocation capability.
//!
//! The capability is explicitly optional: hosts that have a fix source
//! implement [`GeolocationProvider`]; hosts that do not pass `None` to the
//! service layer and get an immediate `Unsupported` notice, with no retry.

use crate::types::{Coordinate, GeolocationError};
use async_trait::async_trait;

/// A source of single-shot device location fixes.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError>;
}

/// Stand-in for hosts without any fix source.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedGeolocation;

#[async_trait]
impl GeolocationProvider for UnsupportedGeolocation {
    async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}
