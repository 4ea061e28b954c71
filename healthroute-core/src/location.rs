//! Geographic positions used by plans and requests.
//!
//! [`Location`] is the resolved form the engine works with: both coordinates
//! are always present. [`LocationInput`] is the request-side form, which may
//! carry only an address; addresses must be geocoded by the service layer
//! before a request enters the engine.

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

use crate::RequestValidationError;

/// Coordinates closer than this (in degrees) describe the same place.
const SAME_PLACE_TOLERANCE_DEG: f64 = 1e-6;

/// A resolved latitude/longitude pair with an optional display name.
///
/// # Examples
///
/// ```
/// use healthroute_core::Location;
///
/// let station = Location::named(47.2173, -1.5416, "Commerce");
/// let nearby = Location::new(47.2184, -1.5536);
/// let km = station.distance_km(&nearby);
/// assert!(km > 0.8 && km < 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Human-readable label, e.g. a stop or parking name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Location {
    /// Construct an unnamed location.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            name: None,
        }
    }

    /// Construct a named location.
    #[must_use]
    pub fn named(lat: f64, lon: f64, name: impl Into<String>) -> Self {
        Self {
            lat,
            lon,
            name: Some(name.into()),
        }
    }

    /// Return the location as a `geo` point (`x` = longitude, `y` = latitude).
    #[must_use]
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    /// Great-circle distance to `other` in kilometres.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        Haversine.distance(self.point(), other.point()) / 1000.0
    }

    /// Whether both locations denote the same coordinates, ignoring names.
    #[must_use]
    pub fn same_place(&self, other: &Self) -> bool {
        (self.lat - other.lat).abs() <= SAME_PLACE_TOLERANCE_DEG
            && (self.lon - other.lon).abs() <= SAME_PLACE_TOLERANCE_DEG
    }

    /// Whether the coordinates are finite and within WGS84 bounds.
    #[must_use]
    pub fn has_valid_coordinates(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Display label: the name when present, otherwise the coordinates.
    #[must_use]
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{:.5},{:.5}", self.lat, self.lon))
    }
}

/// Request-side location: coordinates, an address, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationInput {
    /// Latitude in decimal degrees.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude in decimal degrees.
    #[serde(default)]
    pub lon: Option<f64>,
    /// Free-form postal address awaiting geocoding.
    #[serde(default)]
    pub address: Option<String>,
    /// Optional display name carried through to the plan.
    #[serde(default)]
    pub name: Option<String>,
}

impl LocationInput {
    /// Build an input from coordinates.
    #[must_use]
    pub const fn coordinates(lat: f64, lon: f64) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
            address: None,
            name: None,
        }
    }

    /// Resolve into a [`Location`].
    ///
    /// # Errors
    ///
    /// Returns [`RequestValidationError`] when only one coordinate is present,
    /// when only an address is present (geocoding happens upstream), when
    /// nothing is present, or when coordinates are out of range.
    pub fn resolve(&self, field: &'static str) -> Result<Location, RequestValidationError> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                let location = Location {
                    lat,
                    lon,
                    name: self.name.clone().or_else(|| self.address.clone()),
                };
                if location.has_valid_coordinates() {
                    Ok(location)
                } else {
                    Err(RequestValidationError::CoordinatesOutOfRange { field })
                }
            }
            (Some(_), None) | (None, Some(_)) => {
                Err(RequestValidationError::PartialCoordinates { field })
            }
            (None, None) if self.address.is_some() => {
                Err(RequestValidationError::UnresolvedAddress { field })
            }
            (None, None) => Err(RequestValidationError::MissingLocation { field }),
        }
    }
}
