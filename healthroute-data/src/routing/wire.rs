//! Routing service response types.
//!
//! Both routing endpoints answer with a [`RouteResponse`]: overall totals
//! plus the ordered segments. A service that only publishes totals may omit
//! `segments`; the client then synthesises a single segment between the
//! requested endpoints.

use healthroute_core::{Location, TransitStop, TravelMode};
use serde::Deserialize;

/// Body of `GET /route` and `GET /route/circular`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RouteResponse {
    /// Total distance in kilometres.
    pub distance_km: f64,
    /// Total duration in minutes.
    pub duration_minutes: f64,
    /// Encoded polyline for the whole route.
    #[serde(default)]
    pub geometry: Option<String>,
    /// Segments in travel order.
    #[serde(default)]
    pub segments: Vec<SegmentDto>,
}

/// One leg as published by the routing service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SegmentDto {
    /// Service mode name, e.g. `"WALK"` or `"BUS"`.
    pub mode: String,
    /// Where the leg starts.
    pub from: Location,
    /// Where the leg ends.
    pub to: Location,
    /// Duration in minutes.
    pub duration_minutes: f64,
    /// Distance in kilometres.
    pub distance_km: f64,
    /// Encoded polyline for the leg.
    #[serde(default)]
    pub geometry: Option<String>,
    /// Departure as minutes after the requested departure time.
    #[serde(default)]
    pub departs_at_minutes: Option<f64>,
    /// Transit line identifier.
    #[serde(default)]
    pub line: Option<String>,
    /// Downstream stops of a transit leg, ending at the alighting stop.
    #[serde(default)]
    pub stops: Vec<StopDto>,
    /// Whether the leg includes stairs.
    #[serde(default)]
    pub stairs: bool,
}

/// A downstream stop of a transit leg.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StopDto {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Stop name.
    #[serde(default)]
    pub name: Option<String>,
    /// Minutes after departure from the boarding stop.
    #[serde(default)]
    pub offset_minutes: Option<f64>,
    /// Kilometres from the boarding stop.
    #[serde(default)]
    pub offset_km: Option<f64>,
}

impl From<StopDto> for TransitStop {
    fn from(stop: StopDto) -> Self {
        Self {
            location: Location {
                lat: stop.lat,
                lon: stop.lon,
                name: stop.name,
            },
            offset_minutes: stop.offset_minutes,
            offset_km: stop.offset_km,
        }
    }
}

/// Normalise a service mode name.
///
/// Vehicle kinds (`BUS`, `TRAM`, ...) all map to [`TravelMode::Transit`].
/// Matching ignores ASCII case.
#[must_use]
pub fn parse_mode(raw: &str) -> Option<TravelMode> {
    let upper = raw.trim().to_ascii_uppercase();
    match upper.as_str() {
        "WALK" | "FOOT" | "WALKING" => Some(TravelMode::Walk),
        "BIKE" | "BICYCLE" | "CYCLING" => Some(TravelMode::Bike),
        "WAIT" | "WAITING" => Some(TravelMode::Wait),
        "TRANSIT" | "BUS" | "BUSWAY" | "TRAM" | "SUBWAY" | "METRO" | "RAIL" | "TRAIN"
        | "FERRY" | "NAVIBUS" => Some(TravelMode::Transit),
        _ => None,
    }
}
