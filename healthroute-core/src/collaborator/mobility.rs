use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::UpstreamError;
use crate::{Location, RequestId};

/// A bike parking with live availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BikeParking {
    /// Service identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Where the parking is.
    pub location: Location,
    /// Total spaces.
    pub capacity: u32,
    /// Free spaces at query time.
    pub available: u32,
}

/// A transit stop near a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitStopInfo {
    /// Service identifier.
    pub id: String,
    /// Where the stop is.
    pub location: Location,
    /// Lines serving the stop.
    #[serde(default)]
    pub lines: Vec<String>,
}

/// Looks up shared-mobility and transit infrastructure.
#[async_trait]
pub trait MobilityClient: Send + Sync {
    /// Parkings within `radius_meters` of `at` with at least `min_available`
    /// free spaces, nearest first.
    async fn nearby_parkings(
        &self,
        at: &Location,
        radius_meters: u32,
        min_available: u32,
        request_id: &RequestId,
    ) -> Result<Vec<BikeParking>, UpstreamError>;

    /// Transit stops within `radius_meters` of `at`, nearest first.
    async fn nearby_stops(
        &self,
        at: &Location,
        radius_meters: u32,
        request_id: &RequestId,
    ) -> Result<Vec<TransitStopInfo>, UpstreamError>;
}
