use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::UpstreamError;
use crate::{Location, RequestId, RoutePlan};

/// Routing profile requested from the routing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingProfile {
    /// Pedestrian routing.
    Walk,
    /// Cycle routing.
    Bike,
    /// Public transport routing, including access walks and waits.
    Transit,
}

impl RoutingProfile {
    /// Wire name of the profile.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Bike => "bike",
            Self::Transit => "transit",
        }
    }
}

/// Computes itineraries between places.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use healthroute_core::{
///     Location, RequestId, RoutePlan, RouteSegment, RoutingClient, RoutingProfile,
///     TravelMode, UpstreamError,
/// };
/// use jiff::Timestamp;
///
/// struct Straight;
///
/// #[async_trait]
/// impl RoutingClient for Straight {
///     async fn route(
///         &self,
///         _profile: RoutingProfile,
///         from: &Location,
///         to: &Location,
///         _departure: Timestamp,
///         _request_id: &RequestId,
///     ) -> Result<RoutePlan, UpstreamError> {
///         let km = from.distance_km(to);
///         Ok(RoutePlan::new(vec![RouteSegment::new(
///             TravelMode::Walk,
///             from.clone(),
///             to.clone(),
///             km * 12.0,
///             km,
///         )]))
///     }
///
///     async fn circular_route(
///         &self,
///         _center: &Location,
///         _radius_km: f64,
///         _profile: RoutingProfile,
///         _request_id: &RequestId,
///     ) -> Result<RoutePlan, UpstreamError> {
///         Err(UpstreamError::NoRoute)
///     }
/// }
/// ```
#[async_trait]
pub trait RoutingClient: Send + Sync {
    /// Route from `from` to `to` leaving at `departure`.
    async fn route(
        &self,
        profile: RoutingProfile,
        from: &Location,
        to: &Location,
        departure: Timestamp,
        request_id: &RequestId,
    ) -> Result<RoutePlan, UpstreamError>;

    /// A round trip starting and ending at `center` reaching out roughly
    /// `radius_km`.
    async fn circular_route(
        &self,
        center: &Location,
        radius_km: f64,
        profile: RoutingProfile,
        request_id: &RequestId,
    ) -> Result<RoutePlan, UpstreamError>;
}
