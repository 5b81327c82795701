//! Place services answered from a TOML fixture file.
//!
//! Used by the `place-picker` binary to drive a session without a network
//! backend. Example fixture:
//!
//! ```toml
//! [search]
//! mode = "enabled"   # enabled | missing-key | quota-exceeded | request-denied | request-failed
//! limit = 5
//!
//! [device]
//! latitude = 35.6595
//! longitude = 139.7005
//!
//! [[places]]
//! place_id = "life-dogenzaka"
//! name = "Life Dogenzaka"
//! address = "2-1 Dogenzaka, Shibuya, Japan"
//! website = "https://www.lifecorp.jp/"
//! latitude = 35.6580
//! longitude = 139.6982
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use super::PlaceServices;
use crate::error::{GeocodeError, PlacesError};
use crate::projection::parse_city_area;
use crate::{
    ApiStatus, AreaResolution, Coordinates, LocationCapture, PinOnlyReason, PlaceDetails,
    PlaceSuggestion,
};

const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Errors loading a fixture file.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fixture file {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// How the fixture search backend behaves.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    #[default]
    Enabled,
    MissingKey,
    QuotaExceeded,
    RequestDenied,
    RequestFailed,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchFixture {
    pub mode: SearchMode,
    pub limit: usize,
}

impl Default for SearchFixture {
    fn default() -> Self {
        Self {
            mode: SearchMode::Enabled,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Simulated device location. A missing `[device]` table means no fix.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeviceFixture {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub denied: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FixturePlace {
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl FixturePlace {
    fn haystack(&self) -> String {
        format!(
            "{} {}",
            self.name.to_lowercase(),
            self.address.as_deref().unwrap_or_default().to_lowercase()
        )
    }

    fn suggestion(&self) -> PlaceSuggestion {
        PlaceSuggestion {
            place_id: self.place_id.clone(),
            primary_text: self.name.clone(),
            secondary_text: self.address.clone(),
        }
    }
}

/// Root of a fixture file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Fixture {
    pub search: SearchFixture,
    pub device: Option<DeviceFixture>,
    pub places: Vec<FixturePlace>,
}

/// [`PlaceServices`] backed by a [`Fixture`].
#[derive(Debug, Clone)]
pub struct FixtureServices {
    fixture: Fixture,
}

impl FixtureServices {
    pub fn new(fixture: Fixture) -> Self {
        Self { fixture }
    }

    /// Loads and parses a fixture file.
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let content = fs::read_to_string(path).map_err(|e| FixtureError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content, path)
    }

    fn from_toml(content: &str, path: &Path) -> Result<Self, FixtureError> {
        let fixture: Fixture = toml::from_str(content).map_err(|e| FixtureError::ParseError {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        Ok(Self::new(fixture))
    }

    fn search_failure(&self) -> Option<PlacesError> {
        match self.fixture.search.mode {
            SearchMode::Enabled | SearchMode::MissingKey => None,
            SearchMode::QuotaExceeded => Some(PlacesError::QuotaExceeded),
            SearchMode::RequestDenied => Some(PlacesError::RequestDenied),
            SearchMode::RequestFailed => {
                Some(PlacesError::RequestFailed("fixture backend offline".to_string()))
            }
        }
    }

    fn nearest(&self, point: &Coordinates) -> Option<&FixturePlace> {
        self.fixture
            .places
            .iter()
            .filter_map(|p| {
                Coordinates::new(p.latitude, p.longitude)
                    .ok()
                    .map(|c| (c.distance_rank(point), p))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p)
    }

    fn area_near(&self, point: &Coordinates) -> Result<AreaResolution, GeocodeError> {
        let place = self
            .nearest(point)
            .ok_or_else(|| GeocodeError::NoResult(point.to_string()))?;
        let address = place
            .address
            .as_deref()
            .ok_or_else(|| GeocodeError::NoResult(point.to_string()))?;
        let city_area =
            parse_city_area(address).ok_or_else(|| GeocodeError::NoResult(point.to_string()))?;
        Ok(AreaResolution {
            city_area,
            address_line: Some(address.to_string()),
        })
    }
}

#[async_trait]
impl PlaceServices for FixtureServices {
    async fn capture_current_location(&self) -> LocationCapture {
        let Some(device) = &self.fixture.device else {
            return LocationCapture::Error {
                message: "Current location is unavailable.".to_string(),
            };
        };
        if device.denied {
            return LocationCapture::Denied {
                message: "Location permission was denied.".to_string(),
            };
        }
        let coordinates = match Coordinates::new(device.latitude, device.longitude) {
            Ok(c) => c,
            Err(e) => {
                return LocationCapture::Error {
                    message: e.to_string(),
                }
            }
        };
        let (city_area, address_line) = match self.area_near(&coordinates) {
            Ok(area) => (area.city_area, area.address_line),
            Err(_) => (String::new(), None),
        };
        LocationCapture::Granted {
            coordinates,
            city_area,
            address_line,
        }
    }

    async fn reverse_geocode_to_area(
        &self,
        coordinates: Coordinates,
    ) -> Result<AreaResolution, GeocodeError> {
        self.area_near(&coordinates)
    }

    async fn search_places(&self, query: &str) -> Result<Vec<PlaceSuggestion>, PlacesError> {
        if let Some(err) = self.search_failure() {
            return Err(err);
        }
        let tokens: Vec<String> = query
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .fixture
            .places
            .iter()
            .filter(|p| {
                let haystack = p.haystack();
                tokens.iter().all(|t| haystack.contains(t.as_str()))
            })
            .take(self.fixture.search.limit)
            .map(FixturePlace::suggestion)
            .collect())
    }

    async fn get_place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        if let Some(err) = self.search_failure() {
            return Err(err);
        }
        self.fixture
            .places
            .iter()
            .find(|p| p.place_id == place_id)
            .map(|p| PlaceDetails {
                place_id: p.place_id.clone(),
                name: Some(p.name.clone()),
                address: p.address.clone(),
                website_uri: p.website.clone(),
                latitude: p.latitude,
                longitude: p.longitude,
            })
            .ok_or_else(|| PlacesError::RequestFailed(format!("unknown place id {place_id}")))
    }

    fn initial_places_api_status(&self) -> ApiStatus {
        match self.fixture.search.mode {
            SearchMode::MissingKey => ApiStatus::PinOnly(PinOnlyReason::MissingKey),
            _ => ApiStatus::SearchEnabled,
        }
    }
}
