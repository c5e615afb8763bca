//! Reverse geocoding: convert coordinates to human-readable place names.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.
//!
//! Failures are non-fatal by design: every error path resolves to `None` and
//! the UI simply shows no locality text.

use crate::types::{Coordinate, LocalityInfo};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "raincheck/0.1.0 (https://github.com/raincheck)";

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
    display_name: Option<String>,
}

/// Address breakdown shared by the reverse and search endpoints.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    #[serde(rename = "state_district")]
    state_district: Option<String>,
    state: Option<String>,
    county: Option<String>,
    country: Option<String>,
}

/// Derive a short place label from an address breakdown.
///
/// Settlement tiers first (city > town > village > municipality), suffixed
/// with the administrative region, else the country; an address with no
/// settlement falls through to region, then country.
pub(crate) fn derive_locality(addr: &NominatimAddress) -> Option<String> {
    let settlement = addr
        .city
        .clone()
        .or_else(|| addr.town.clone())
        .or_else(|| addr.village.clone())
        .or_else(|| addr.municipality.clone());

    let region = addr
        .state
        .clone()
        .or_else(|| addr.state_district.clone())
        .or_else(|| addr.county.clone());

    match (settlement, region, addr.country.clone()) {
        (Some(s), Some(r), _) if r != s => Some(format!("{}, {}", s, r)),
        (Some(s), _, Some(c)) if c != s => Some(format!("{}, {}", s, c)),
        (Some(s), _, _) => Some(s),
        (None, Some(r), _) => Some(r),
        (None, None, Some(c)) => Some(c),
        (None, None, None) => None,
    }
}

/// Place lookup by coordinate against a Nominatim-compatible service.
#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: Client,
    base_url: String,
}

impl ReverseGeocoder {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_base_url(NOMINATIM_URL)
    }

    /// Build a geocoder against a custom service endpoint (also used to point
    /// tests at a mock server).
    pub fn with_base_url(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a coordinate to place information. One lookup per call.
    ///
    /// Returns `None` on any failure (network, bad status, malformed body);
    /// nothing is surfaced to the user.
    pub async fn resolve(&self, coordinate: Coordinate) -> Option<LocalityInfo> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1&layer=address&zoom=10",
            self.base_url, coordinate.lat, coordinate.lng
        );

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return None;
        }

        let body: NominatimResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                return None;
            }
        };

        let display_name = body.display_name.clone().unwrap_or_default();

        // No usable address block: fall back to the raw display name
        let locality = body
            .address
            .as_ref()
            .and_then(derive_locality)
            .or_else(|| (!display_name.is_empty()).then(|| display_name.clone()));

        if let Some(name) = locality.as_deref() {
            tracing::info!("Reverse geocoded {} to: {}", coordinate, name);
        }

        Some(LocalityInfo {
            lat: coordinate.lat,
            lng: coordinate.lng,
            display_name,
            locality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(
        city: Option<&str>,
        town: Option<&str>,
        state: Option<&str>,
        country: Option<&str>,
    ) -> NominatimAddress {
        NominatimAddress {
            city: city.map(String::from),
            town: town.map(String::from),
            village: None,
            municipality: None,
            state_district: None,
            state: state.map(String::from),
            county: None,
            country: country.map(String::from),
        }
    }

    #[test]
    fn test_settlement_with_region() {
        let addr = address(Some("London"), None, Some("England"), Some("United Kingdom"));
        assert_eq!(derive_locality(&addr).as_deref(), Some("London, England"));
    }

    #[test]
    fn test_town_used_when_no_city() {
        let addr = address(None, Some("Whitby"), Some("England"), None);
        assert_eq!(derive_locality(&addr).as_deref(), Some("Whitby, England"));
    }

    #[test]
    fn test_settlement_falls_back_to_country_suffix() {
        let addr = address(Some("Reykjavik"), None, None, Some("Iceland"));
        assert_eq!(
            derive_locality(&addr).as_deref(),
            Some("Reykjavik, Iceland")
        );
    }

    #[test]
    fn test_country_only() {
        let addr = address(None, None, None, Some("France"));
        assert_eq!(derive_locality(&addr).as_deref(), Some("France"));
    }

    #[test]
    fn test_region_only() {
        let addr = address(None, None, Some("Bavaria"), None);
        assert_eq!(derive_locality(&addr).as_deref(), Some("Bavaria"));
    }

    #[test]
    fn test_empty_address_yields_none() {
        let addr = address(None, None, None, None);
        assert_eq!(derive_locality(&addr), None);
    }

    #[test]
    fn test_no_duplicate_when_settlement_equals_region() {
        // City-states report the same name at both tiers
        let addr = address(Some("Singapore"), None, Some("Singapore"), Some("Singapore"));
        assert_eq!(derive_locality(&addr).as_deref(), Some("Singapore"));
    }

    #[test]
    fn test_response_parses_without_address_block() {
        let body: NominatimResponse = serde_json::from_str(
            r#"{"display_name": "Somewhere remote", "licence": "ODbL"}"#,
        )
        .unwrap();
        assert!(body.address.is_none());
        assert_eq!(body.display_name.as_deref(), Some("Somewhere remote"));
    }
}
