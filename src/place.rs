//! Place value types shared by the session store, the picker facade and the
//! collaborator services.
//!
//! [`Coordinates`] can only be built through [`Coordinates::new`] (or serde,
//! which goes through the same check), so a session never holds an invalid
//! point.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoordinateError;

/// A validated (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

/// Unchecked wire form of [`Coordinates`].
#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Coordinates::new(raw.latitude, raw.longitude)
    }
}

impl Coordinates {
    /// Tokyo Station. Used when no configured or stored point is available.
    pub const DEFAULT_ORIGIN: Coordinates = Coordinates {
        latitude: 35.681236,
        longitude: 139.767125,
    };

    /// Builds a point, rejecting non-finite values and out-of-range degrees.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Squared planar distance in degrees. Only meaningful for ranking
    /// nearby candidates against each other.
    pub fn distance_rank(&self, other: &Coordinates) -> f64 {
        let dlat = self.latitude - other.latitude;
        let dlng = self.longitude - other.longitude;
        dlat * dlat + dlng * dlng
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// Capability of the place search backend for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "kebab-case")]
pub enum ApiStatus {
    /// Text search and place details are available.
    SearchEnabled,
    /// Search is unavailable; the user can only drop a pin manually.
    PinOnly(PinOnlyReason),
}

impl ApiStatus {
    pub fn is_search_enabled(self) -> bool {
        matches!(self, ApiStatus::SearchEnabled)
    }

    /// Banner text shown while search is unavailable.
    pub fn banner(self) -> Option<&'static str> {
        match self {
            ApiStatus::SearchEnabled => None,
            ApiStatus::PinOnly(PinOnlyReason::MissingKey) => {
                Some("Place search is not configured. Move the pin to choose a location.")
            }
            ApiStatus::PinOnly(PinOnlyReason::QuotaExceeded) => {
                Some("Place search limit reached. Move the pin to choose a location.")
            }
            ApiStatus::PinOnly(PinOnlyReason::RequestDenied) => {
                Some("Place search is unavailable. Move the pin to choose a location.")
            }
        }
    }
}

/// Why a session is in pin-only mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PinOnlyReason {
    /// No API key was configured (from the capability probe).
    MissingKey,
    /// The search backend reported quota exhaustion.
    QuotaExceeded,
    /// The search backend refused the request (key restrictions, billing).
    RequestDenied,
}

impl fmt::Display for PinOnlyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PinOnlyReason::MissingKey => "missing-key",
            PinOnlyReason::QuotaExceeded => "quota-exceeded",
            PinOnlyReason::RequestDenied => "request-denied",
        };
        write!(f, "{}", s)
    }
}

/// A previously stored place, supplied when the picker reopens an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSelection {
    pub coordinates: Coordinates,
    #[serde(default)]
    pub city_area: Option<String>,
    #[serde(default)]
    pub address_line: Option<String>,
    #[serde(default)]
    pub suggested_store_name: Option<String>,
}

impl PlaceSelection {
    /// Returns `true` when area or address is absent or blank.
    pub fn needs_address_resolution(&self) -> bool {
        is_blank(self.city_area.as_deref()) || is_blank(self.address_line.as_deref())
    }
}

/// What the picker hands back on confirm.
///
/// `city_area` is never blank: an unresolved area is replaced by the caller's
/// fallback label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedSelection {
    pub coordinates: Coordinates,
    pub city_area: String,
    pub address_line: Option<String>,
    pub suggested_store_name: Option<String>,
}

/// One search candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub place_id: String,
    pub primary_text: String,
    #[serde(default)]
    pub secondary_text: Option<String>,
}

impl PlaceSuggestion {
    /// Label used for the query text and as the fallback store name.
    pub fn display_text(&self) -> &str {
        &self.primary_text
    }
}

/// Full details for a place, as returned by the details lookup.
///
/// Coordinates are raw here; the store validates them before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub place_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub website_uri: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl PlaceDetails {
    pub fn coordinates(&self) -> Result<Coordinates, CoordinateError> {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Result of a reverse geocode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaResolution {
    pub city_area: String,
    #[serde(default)]
    pub address_line: Option<String>,
}

/// Outcome of a device location capture. Never an `Err`: denial and failure
/// are ordinary outcomes that carry a user-facing message.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationCapture {
    Granted {
        coordinates: Coordinates,
        city_area: String,
        address_line: Option<String>,
    },
    Denied {
        message: String,
    },
    Error {
        message: String,
    },
}

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}

/// Trims a value and maps blank strings to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
