//! Error types for the place collaborators.
//!
//! None of these ever escape a session store operation; the store turns them
//! into per-channel messages and, for capability errors, a pin-only downgrade.

use thiserror::Error;

use crate::PinOnlyReason;

/// Classified failure from place search or place details.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlacesError {
    /// The backend quota is exhausted.
    #[error("Place search quota exceeded. Move the pin to choose a location.")]
    QuotaExceeded,

    /// The backend refused the request.
    #[error("Place search request was denied. Move the pin to choose a location.")]
    RequestDenied,

    /// Any other failure, including network errors.
    #[error("Place search failed: {0}")]
    RequestFailed(String),
}

impl PlacesError {
    /// The pin-only reason this error forces, if it is a capability error.
    ///
    /// `RequestFailed` is transient and never downgrades the session.
    pub fn capability_downgrade(&self) -> Option<PinOnlyReason> {
        match self {
            PlacesError::QuotaExceeded => Some(PinOnlyReason::QuotaExceeded),
            PlacesError::RequestDenied => Some(PinOnlyReason::RequestDenied),
            PlacesError::RequestFailed(_) => None,
        }
    }
}

/// Reverse geocoding failure. Always treated as a best-effort degradation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeocodeError {
    /// No address is known near the point.
    #[error("No address found near {0}")]
    NoResult(String),

    /// The geocoder could not be reached or failed.
    #[error("Reverse geocoding failed: {0}")]
    Failed(String),
}

/// Rejected coordinate values.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum CoordinateError {
    #[error("latitude out of range: {0}")]
    Latitude(f64),

    #[error("longitude out of range: {0}")]
    Longitude(f64),
}
