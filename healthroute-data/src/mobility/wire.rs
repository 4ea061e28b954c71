//! Mobility service response types.

use healthroute_core::{BikeParking, Location, TransitStopInfo};
use serde::Deserialize;

/// One entry of `GET /bike-parkings/nearby`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParkingDto {
    /// Service identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Total spaces.
    #[serde(default)]
    pub capacity: u32,
    /// Free spaces; the service omits it when it only knows the capacity.
    #[serde(default)]
    pub available: Option<u32>,
    /// Distance from the search point.
    #[serde(default)]
    pub distance_meters: Option<f64>,
    /// `"open"` or `"closed"`.
    #[serde(default)]
    pub status: Option<String>,
}

impl ParkingDto {
    /// Whether the service reports the parking as closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("closed"))
    }
}

impl From<ParkingDto> for BikeParking {
    fn from(dto: ParkingDto) -> Self {
        let name = dto.name.unwrap_or_else(|| dto.id.clone());
        Self {
            location: Location::named(dto.lat, dto.lon, name.clone()),
            available: dto.available.unwrap_or(dto.capacity),
            capacity: dto.capacity,
            id: dto.id,
            name,
        }
    }
}

/// One entry of `GET /stops/nearby`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NearbyStopDto {
    /// Service identifier.
    pub id: String,
    /// Stop name.
    #[serde(default)]
    pub name: Option<String>,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Lines serving the stop.
    #[serde(default)]
    pub lines: Vec<String>,
}

impl From<NearbyStopDto> for TransitStopInfo {
    fn from(dto: NearbyStopDto) -> Self {
        Self {
            id: dto.id,
            location: Location {
                lat: dto.lat,
                lon: dto.lon,
                name: dto.name,
            },
            lines: dto.lines,
        }
    }
}
