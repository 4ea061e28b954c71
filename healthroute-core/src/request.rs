//! Trip requests and their validation.
//!
//! [`PlanRequestInput`] mirrors the wire form accepted from callers. It is
//! turned into a validated [`PlanRequest`] by [`PlanRequestInput::into_request`],
//! which resolves locations and the departure time.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Location, LocationInput};

/// Errors raised while validating a trip request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestValidationError {
    /// Neither coordinates nor an address were supplied.
    #[error("{field} is required")]
    MissingLocation {
        /// `"origin"` or `"destination"`.
        field: &'static str,
    },
    /// Only one of latitude and longitude was supplied.
    #[error("{field} must provide both lat and lon")]
    PartialCoordinates {
        /// `"origin"` or `"destination"`.
        field: &'static str,
    },
    /// Only an address was supplied; it must be geocoded first.
    #[error("{field} address must be geocoded to coordinates before planning")]
    UnresolvedAddress {
        /// `"origin"` or `"destination"`.
        field: &'static str,
    },
    /// Coordinates fall outside WGS84 bounds.
    #[error("{field} coordinates are out of range")]
    CoordinatesOutOfRange {
        /// `"origin"` or `"destination"`.
        field: &'static str,
    },
    /// A numeric field is below its lower bound or not finite.
    #[error("{field} must be {bound}, got {value}")]
    OutOfBounds {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable bound, e.g. `"greater than 0"`.
        bound: &'static str,
        /// Value supplied by the caller.
        value: f64,
    },
    /// The departure time could not be parsed.
    #[error("invalid departure_time {value:?}: {message}")]
    InvalidDepartureTime {
        /// Raw value supplied by the caller.
        value: String,
        /// Parser message.
        message: String,
    },
}

/// Minutes of activity the traveller wants to gain.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityGoals {
    /// Target walking minutes.
    #[serde(default)]
    pub walk_minutes: f64,
    /// Target cycling minutes.
    #[serde(default)]
    pub bike_minutes: f64,
}

impl ActivityGoals {
    /// Goals with a walking target only.
    #[must_use]
    pub const fn walking(walk_minutes: f64) -> Self {
        Self {
            walk_minutes,
            bike_minutes: 0.0,
        }
    }

    /// Goals with both targets.
    #[must_use]
    pub const fn new(walk_minutes: f64, bike_minutes: f64) -> Self {
        Self {
            walk_minutes,
            bike_minutes,
        }
    }

    /// Whether a cycling target is set.
    #[must_use]
    pub fn wants_bike(&self) -> bool {
        self.bike_minutes > 0.0
    }
}

/// Hard limits on acceptable candidates. Absent limits do not constrain.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TripConstraints {
    /// Maximum total itinerary duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_total_time_minutes: Option<f64>,
    /// Maximum extra distance over the baseline.
    #[serde(
        default,
        alias = "max_detour_distance_km",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_detour_km: Option<f64>,
    /// Maximum extra duration over the baseline, as a percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_detour_percent: Option<f64>,
}

impl TripConstraints {
    /// Whether no limit is set.
    #[must_use]
    pub const fn is_unconstrained(&self) -> bool {
        self.max_total_time_minutes.is_none()
            && self.max_detour_km.is_none()
            && self.max_detour_percent.is_none()
    }
}

/// Comfort preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Penalise plans that include stairs.
    #[serde(default)]
    pub avoid_stairs: bool,
    /// Favour bike-parking waypoints.
    #[serde(default)]
    pub prefer_bike_parkings: bool,
}

/// Correlation identifier forwarded to every collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Wrap an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A validated trip request.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    /// Trip start.
    pub origin: Location,
    /// Trip end.
    pub destination: Location,
    /// When the traveller leaves.
    pub departure: Timestamp,
    /// Activity targets.
    pub goals: ActivityGoals,
    /// Hard limits.
    pub constraints: TripConstraints,
    /// Comfort preferences.
    pub preferences: Preferences,
    /// Correlation identifier.
    pub request_id: RequestId,
}

impl PlanRequest {
    /// Build a request with default constraints and preferences.
    #[must_use]
    pub fn new(
        origin: Location,
        destination: Location,
        departure: Timestamp,
        goals: ActivityGoals,
        request_id: RequestId,
    ) -> Self {
        Self {
            origin,
            destination,
            departure,
            goals,
            constraints: TripConstraints::default(),
            preferences: Preferences::default(),
            request_id,
        }
    }

    /// Replace the constraints.
    #[must_use]
    pub const fn with_constraints(mut self, constraints: TripConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Replace the preferences.
    #[must_use]
    pub const fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Check coordinates, goals and constraints.
    ///
    /// # Errors
    ///
    /// Returns the first [`RequestValidationError`] found.
    pub fn validate(&self) -> Result<(), RequestValidationError> {
        if !self.origin.has_valid_coordinates() {
            return Err(RequestValidationError::CoordinatesOutOfRange { field: "origin" });
        }
        if !self.destination.has_valid_coordinates() {
            return Err(RequestValidationError::CoordinatesOutOfRange {
                field: "destination",
            });
        }
        positive("walk_minutes", self.goals.walk_minutes)?;
        check(
            "bike_minutes",
            self.goals.bike_minutes,
            "zero or greater",
            |v| v >= 0.0,
        )?;
        let limits = [
            ("max_total_time_minutes", self.constraints.max_total_time_minutes),
            ("max_detour_km", self.constraints.max_detour_km),
            ("max_detour_percent", self.constraints.max_detour_percent),
        ];
        for (field, value) in limits
            .into_iter()
            .filter_map(|(field, limit)| limit.map(|value| (field, value)))
        {
            positive(field, value)?;
        }
        if let Some(percent) = self.constraints.max_detour_percent {
            check("max_detour_percent", percent, "at most 100", |v| v <= 100.0)?;
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), RequestValidationError> {
    check(field, value, "greater than 0", |v| v > 0.0)
}

fn check(
    field: &'static str,
    value: f64,
    bound: &'static str,
    holds: impl Fn(f64) -> bool,
) -> Result<(), RequestValidationError> {
    if value.is_finite() && holds(value) {
        Ok(())
    } else {
        Err(RequestValidationError::OutOfBounds {
            field,
            bound,
            value,
        })
    }
}

fn default_departure() -> String {
    "now".to_owned()
}

/// The wire form of a trip request.
///
/// # Examples
///
/// ```
/// use healthroute_core::{PlanRequestInput, RequestId};
/// use jiff::Timestamp;
///
/// let input: PlanRequestInput = serde_json::from_str(
///     r#"{
///         "origin": {"lat": 47.2184, "lon": -1.5536},
///         "destination": {"lat": 47.2065, "lon": -1.5394},
///         "goals": {"walk_minutes": 20}
///     }"#,
/// )?;
/// let request = input.into_request(Timestamp::UNIX_EPOCH, RequestId::new("r-1"))?;
/// assert_eq!(request.departure, Timestamp::UNIX_EPOCH);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequestInput {
    /// Trip start.
    pub origin: LocationInput,
    /// Trip end.
    pub destination: LocationInput,
    /// RFC 3339 timestamp or `"now"`.
    #[serde(default = "default_departure")]
    pub departure_time: String,
    /// Activity targets.
    #[serde(default)]
    pub goals: ActivityGoals,
    /// Hard limits.
    #[serde(default)]
    pub constraints: TripConstraints,
    /// Comfort preferences.
    #[serde(default)]
    pub preferences: Preferences,
}

impl PlanRequestInput {
    /// Resolve and validate the input.
    ///
    /// `now` is used when `departure_time` is `"now"`, which keeps the engine
    /// free of wall-clock reads.
    ///
    /// # Errors
    ///
    /// Returns [`RequestValidationError`] when a location cannot be resolved,
    /// the departure time does not parse, or a numeric field is negative.
    pub fn into_request(
        self,
        now: Timestamp,
        request_id: RequestId,
    ) -> Result<PlanRequest, RequestValidationError> {
        let origin = self.origin.resolve("origin")?;
        let destination = self.destination.resolve("destination")?;
        let departure = parse_departure(&self.departure_time, now)?;
        let request = PlanRequest {
            origin,
            destination,
            departure,
            goals: self.goals,
            constraints: self.constraints,
            preferences: self.preferences,
            request_id,
        };
        request.validate()?;
        Ok(request)
    }
}

fn parse_departure(raw: &str, now: Timestamp) -> Result<Timestamp, RequestValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("now") {
        return Ok(now);
    }
    trimmed
        .parse::<Timestamp>()
        .map_err(|err| RequestValidationError::InvalidDepartureTime {
            value: raw.to_owned(),
            message: err.to_string(),
        })
}
