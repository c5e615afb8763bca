//! Forward place-name search: free-text query to ranked coordinate candidates.
//!
//! Unlike reverse geocoding, transport failures here are typed so the host
//! can show an alert; an empty candidate list is the "not found" signal.

use crate::geocode::{derive_locality, NominatimAddress};
use crate::types::{LocalityInfo, SearchError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = "raincheck/0.1.0 (https://github.com/raincheck)";
const MAX_CANDIDATES: u8 = 5;

/// Nominatim reports coordinates as strings on the search endpoint.
#[derive(Debug, Deserialize)]
struct SearchRow {
    lat: String,
    lon: String,
    display_name: Option<String>,
    address: Option<NominatimAddress>,
}

/// A ranked search result with its address breakdown already reduced to a
/// locality, so selecting it needs no reverse-geocode round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCandidate {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
    pub locality: Option<String>,
}

impl PlaceCandidate {
    pub fn locality_info(&self) -> LocalityInfo {
        LocalityInfo {
            lat: self.lat,
            lng: self.lng,
            display_name: self.display_name.clone(),
            locality: self.locality.clone(),
        }
    }
}

/// Free-text place search against a Nominatim-compatible service.
#[derive(Debug, Clone)]
pub struct PlaceSearch {
    client: Client,
    base_url: String,
}

impl PlaceSearch {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_base_url(NOMINATIM_URL)
    }

    /// Build a search client against a custom service endpoint (also used to
    /// point tests at a mock server).
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

    /// Search for places matching `query`, best match first.
    ///
    /// An empty or whitespace-only query is a no-op: no call is issued and an
    /// empty list is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] when the request cannot be sent or the service
    /// answers with a non-success status.
    pub async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/search?q={}&format=json&addressdetails=1&limit={}",
            self.base_url,
            urlencoding::encode(query),
            MAX_CANDIDATES
        );

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(SearchError::Status(response.status().as_u16()));
        }

        let rows: Vec<SearchRow> = response.json().await?;

        let candidates = rows
            .into_iter()
            .filter_map(|row| {
                let lat = row.lat.parse::<f64>().ok();
                let lng = row.lon.parse::<f64>().ok();
                match (lat, lng) {
                    (Some(lat), Some(lng)) => Some(PlaceCandidate {
                        lat,
                        lng,
                        display_name: row.display_name.unwrap_or_default(),
                        locality: row.address.as_ref().and_then(derive_locality),
                    }),
                    _ => {
                        tracing::warn!(
                            "Dropping search candidate with unparseable coordinates: {:?}/{:?}",
                            row.lat,
                            row.lon
                        );
                        None
                    }
                }
            })
            .collect();

        Ok(candidates)
    }
}
